//! 搜索查询语言的词法分析器
//!
//! ## 扫描流程图
//!
//! ```text
//! scan()
//!   └─ 在每个位置调用 scan_term()，第一个匹配的规则生效
//!        ├─ 连续空白                   → Whitespace
//!        ├─ "//"（启用注释时）         → Comment
//!        ├─ "("  → balanced_pattern()  → 模式字面值，如 (a|b)
//!        │         否则                → OpeningParen
//!        ├─ ")"                        → ClosingParen
//!        ├─ field()  如 -repo:         → Field、分隔符、filter_value()
//!        │                                 ├─ call()        contains(...)
//!        │                                 ├─ quoted()      "a b"
//!        │                                 └─ balanced_literal()
//!        ├─ keyword()  and / or / not  → Keyword
//!        ├─ quoted()                   → 带引号的模式
//!        └─ balanced_pattern()         → 模式字面值
//! ```
//!
//! 所有扫描函数都接收起始位置并返回结束位置，不修改扫描器状态，
//! 因此任何规则都可以先尝试、失败后丢弃。`balanced_literal()` 依赖这一点：
//! 它先扫描候选区间，一旦区间会吞掉关键字或字段就放弃。
//!
//! 所有位置都是字符偏移量，而不是字节偏移量。

use crate::token::{KeywordKind, LiteralKind, PatternType, Token, TokenKind};
use log::debug;
use serde::Serialize;
use thiserror::Error;

pub const NO_FILTER_OR_KEYWORD: &str = "no recognized filter or keyword";
pub const NO_UNBALANCED_PARENTHESES: &str = "no unbalanced parentheses";
pub const NO_UNTERMINATED_QUOTES: &str = "no unterminated quotes";

/// 词法错误，`expected` 描述扫描器在位置 `at` 期望看到的内容
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("expected {expected} at offset {at}")]
pub struct ScanError {
    pub expected: String,
    pub at: usize,
}

impl ScanError {
    fn new(expected: &str, at: usize) -> Self {
        Self {
            expected: expected.to_string(),
            at,
        }
    }
}

/// 把 `input` 扫描为token序列，各token的区间恰好覆盖整个输入
pub fn scan(
    input: &str,
    interpret_comments: bool,
    pattern_type: PatternType,
) -> Result<Vec<Token>, ScanError> {
    let result = Scanner::new(input, interpret_comments, pattern_type).scan();
    match &result {
        Ok(tokens) => debug!("scanned {:?} into {} tokens", input, tokens.len()),
        Err(e) => debug!("failed to scan {:?}: {}", input, e),
    }
    result
}

/// `balanced_literal()` 在哪些位置检查内嵌的关键字或字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookahead {
    /// 开头、每个 `(` 之后、括号内空白之后
    Everywhere,
    /// 同上，但不检查开头（过滤器的值）
    AfterStart,
    /// 不检查（函数调用形式的值）
    Never,
}

pub struct Scanner {
    input: Vec<char>,
    interpret_comments: bool,
    pattern_type: PatternType,
}

impl Scanner {
    pub fn new(input: &str, interpret_comments: bool, pattern_type: PatternType) -> Self {
        Scanner {
            input: input.chars().collect(),
            interpret_comments,
            pattern_type,
        }
    }

    pub fn scan(&self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        let mut position = 0;
        while position < self.input.len() {
            let term = self.scan_term(position)?;
            position = term.last().map_or(position + 1, |t| t.range.end);
            tokens.extend(term);
        }
        Ok(tokens)
    }

    fn peek(&self, position: usize) -> Option<char> {
        self.input.get(position).copied()
    }

    fn starts_with(&self, position: usize, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(position + i) == Some(c))
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    /// 值和模式之后必须是空白、右括号或输入结尾
    fn is_boundary(&self, position: usize) -> bool {
        match self.peek(position) {
            None => true,
            Some(c) => c.is_whitespace() || c == ')',
        }
    }

    fn is_keyword_boundary(&self, position: usize) -> bool {
        match self.peek(position) {
            None => true,
            Some(c) => c.is_whitespace() || c == '(' || c == ')',
        }
    }

    /// 扫描从 `start` 开始的token，至少返回一个
    fn scan_term(&self, start: usize) -> Result<Vec<Token>, ScanError> {
        let Some(c) = self.peek(start) else {
            return Ok(Vec::new());
        };

        if c.is_whitespace() {
            return Ok(vec![self.whitespace(start)]);
        }
        if self.interpret_comments && self.starts_with(start, "//") {
            return Ok(vec![self.comment(start)]);
        }
        if c == '(' {
            // 只有当括号内容无法作为单个模式读取时，才把它当作分组
            let token = self
                .balanced_pattern(start)
                .unwrap_or_else(|_| Token::new(TokenKind::OpeningParen, start, start + 1));
            return Ok(vec![token]);
        }
        if c == ')' {
            return Ok(vec![Token::new(TokenKind::ClosingParen, start, start + 1)]);
        }
        if let Some(colon) = self.field(start) {
            return self.filter(start, colon);
        }
        if let Some(token) = self.keyword(start) {
            return Ok(vec![token]);
        }
        if is_quote(c) {
            let (value, end) = self.quoted(start)?;
            if self.is_boundary(end) {
                let kind = TokenKind::Literal {
                    value,
                    quoted: true,
                    kind: LiteralKind::Pattern(self.pattern_type),
                };
                return Ok(vec![Token::new(kind, start, end)]);
            }
        }
        Ok(vec![self.balanced_pattern(start)?])
    }

    fn whitespace(&self, start: usize) -> Token {
        let mut end = start;
        while self.peek(end).is_some_and(char::is_whitespace) {
            end += 1;
        }
        Token::new(TokenKind::Whitespace, start, end)
    }

    fn comment(&self, start: usize) -> Token {
        let mut end = start;
        while self.peek(end).is_some_and(|c| c != '\n') {
            end += 1;
        }
        let value = self.text(start, end);
        Token::new(TokenKind::Comment { value }, start, end)
    }

    /// 匹配 `-?[A-Za-z][A-Za-z0-9_]*:`，返回冒号的位置
    fn field(&self, start: usize) -> Option<usize> {
        let mut position = start;
        if self.peek(position) == Some('-') {
            position += 1;
        }
        if !self.peek(position).is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        while self
            .peek(position)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            position += 1;
        }
        if self.peek(position) != Some(':') {
            return None;
        }
        // scheme://host 是URL，不是过滤器
        if self.starts_with(position + 1, "//") {
            return None;
        }
        // 结构化模式中的 :[hole]
        if self.pattern_type == PatternType::Structural && self.peek(position + 1) == Some('[') {
            return None;
        }
        Some(position)
    }

    /// 把 `field:value` 扫描为字段、分隔符和可选的值
    fn filter(&self, start: usize, colon: usize) -> Result<Vec<Token>, ScanError> {
        let field = self.text(start, colon);
        let negated = field.starts_with('-');
        let mut tokens = vec![
            Token::new(
                TokenKind::Field {
                    value: field.clone(),
                    negated,
                },
                start,
                colon,
            ),
            Token::new(
                TokenKind::Literal {
                    value: ":".to_string(),
                    quoted: false,
                    kind: LiteralKind::Separator,
                },
                colon,
                colon + 1,
            ),
        ];

        let value_start = colon + 1;
        if !self.is_boundary(value_start) {
            tokens.push(self.filter_value(field, value_start)?);
        }
        Ok(tokens)
    }

    fn filter_value(&self, field: String, start: usize) -> Result<Token, ScanError> {
        if let Some(call_end) = self.call(start) {
            if self.is_boundary(call_end) {
                let kind = TokenKind::Literal {
                    value: self.text(start, call_end),
                    quoted: false,
                    kind: LiteralKind::Predicate(field),
                };
                return Ok(Token::new(kind, start, call_end));
            }
            // 调用后还有其他字符：整体作为普通值，参数不再按查询语法检查
            let end = self.balanced_literal(call_end, Lookahead::Never)?;
            let kind = TokenKind::Literal {
                value: self.text(start, end),
                quoted: false,
                kind: LiteralKind::BalancedValue(field),
            };
            return Ok(Token::new(kind, start, end));
        }

        if self.peek(start).is_some_and(is_quote) {
            let (value, end) = self.quoted(start)?;
            if self.is_boundary(end) {
                let kind = TokenKind::Literal {
                    value,
                    quoted: true,
                    kind: LiteralKind::QuotedValue(field),
                };
                return Ok(Token::new(kind, start, end));
            }
        }

        let end = self.balanced_literal(start, Lookahead::AfterStart)?;
        let kind = TokenKind::Literal {
            value: self.text(start, end),
            quoted: false,
            kind: LiteralKind::BalancedValue(field),
        };
        Ok(Token::new(kind, start, end))
    }

    /// 匹配 `name(.name)*(...)`，返回右括号之后的位置。
    ///
    /// 括号内的引号串整体跳过，其中的括号不参与配对；没有闭合的引号按普通字符处理。
    fn call(&self, start: usize) -> Option<usize> {
        let mut position = self.identifier(start)?;
        while self.peek(position) == Some('.') {
            position = self.identifier(position + 1)?;
        }
        if self.peek(position) != Some('(') {
            return None;
        }

        let mut depth = 0usize;
        loop {
            match self.peek(position)? {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(position + 1);
                    }
                }
                '\\' => position += 1,
                c if is_quote(c) => {
                    if let Ok((_, end)) = self.quoted(position) {
                        position = end;
                        continue;
                    }
                }
                _ => {}
            }
            position += 1;
        }
    }

    fn identifier(&self, start: usize) -> Option<usize> {
        if !self
            .peek(start)
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            return None;
        }
        let mut position = start + 1;
        while self
            .peek(position)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            position += 1;
        }
        Some(position)
    }

    /// 返回从 `start` 开始的字母单词的结束位置
    fn word_end(&self, start: usize) -> usize {
        let mut position = start;
        while self.peek(position).is_some_and(|c| c.is_ascii_alphabetic()) {
            position += 1;
        }
        position
    }

    fn keyword(&self, start: usize) -> Option<Token> {
        let end = self.word_end(start);
        if end == start || !self.is_keyword_boundary(end) {
            return None;
        }
        let value = self.text(start, end);
        let kind = KeywordKind::from_lowercase(&value)?;
        Some(Token::new(TokenKind::Keyword { value, kind }, start, end))
    }

    /// `position` 处是否以关键字（任意大小写）或字段开头
    fn starts_filter_or_keyword(&self, position: usize) -> bool {
        if self.field(position).is_some() {
            return true;
        }
        let end = self.word_end(position);
        end > position
            && self.is_keyword_boundary(end)
            && KeywordKind::from_any_case(&self.text(position, end)).is_some()
    }

    /// 扫描括号必须配对的无引号值，返回结束位置。
    ///
    /// 括号外的空白结束该值；没有可配对的右括号也结束该值，因为它可能属于外层分组。
    /// `lookahead` 决定在开头、每个 `(` 之后以及括号内空白之后是否检查：
    /// 这些位置出现关键字或字段，说明这段文本是查询语法而不是单个值。
    fn balanced_literal(&self, start: usize, lookahead: Lookahead) -> Result<usize, ScanError> {
        let inspect = |position: usize| lookahead != Lookahead::Never && self.starts_filter_or_keyword(position);
        if lookahead == Lookahead::Everywhere && self.starts_filter_or_keyword(start) {
            return Err(ScanError::new(NO_FILTER_OR_KEYWORD, start));
        }

        let mut depth = 0usize;
        let mut position = start;
        while let Some(c) = self.peek(position) {
            match c {
                '(' => {
                    depth += 1;
                    position += 1;
                    if inspect(position) {
                        return Err(ScanError::new(NO_FILTER_OR_KEYWORD, position));
                    }
                }
                ')' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    position += 1;
                }
                c if c.is_whitespace() => {
                    if depth == 0 {
                        break;
                    }
                    position += 1;
                    if inspect(position) {
                        return Err(ScanError::new(NO_FILTER_OR_KEYWORD, position));
                    }
                }
                // 转义字符不算作括号或分隔符
                '\\' => position = (position + 2).min(self.input.len()),
                _ => position += 1,
            }
        }

        if depth > 0 {
            return Err(ScanError::new(NO_UNBALANCED_PARENTHESES, position));
        }
        Ok(position)
    }

    fn balanced_pattern(&self, start: usize) -> Result<Token, ScanError> {
        let end = self.balanced_literal(start, Lookahead::Everywhere)?;
        let kind = TokenKind::Literal {
            value: self.text(start, end),
            quoted: false,
            kind: LiteralKind::Pattern(self.pattern_type),
        };
        Ok(Token::new(kind, start, end))
    }

    /// 从开引号开始扫描引号串，返回反转义后的内容和闭引号之后的位置。
    ///
    /// 只反转义 `\<delimiter>` 和 `\\`，其余转义原样保留，正则表达式不受影响。
    fn quoted(&self, start: usize) -> Result<(String, usize), ScanError> {
        let delimiter = self.input[start];
        let mut value = String::new();
        let mut position = start + 1;
        while let Some(c) = self.peek(position) {
            if c == '\\' {
                match self.peek(position + 1) {
                    Some(next) if next == delimiter || next == '\\' => value.push(next),
                    Some(next) => {
                        value.push('\\');
                        value.push(next);
                    }
                    None => {
                        value.push('\\');
                        position += 1;
                        continue;
                    }
                }
                position += 2;
                continue;
            }
            if c == delimiter {
                return Ok((value, position + 1));
            }
            value.push(c);
            position += 1;
        }
        Err(ScanError::new(NO_UNTERMINATED_QUOTES, position))
    }
}

pub fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 把token渲染为 `kind(value)@start..end`，便于断言
    fn describe(token: &Token) -> String {
        let r = token.range;
        match &token.kind {
            TokenKind::Whitespace => format!("ws@{}..{}", r.start, r.end),
            TokenKind::OpeningParen => format!("(@{}..{}", r.start, r.end),
            TokenKind::ClosingParen => format!(")@{}..{}", r.start, r.end),
            TokenKind::Keyword { value, .. } => format!("keyword({})@{}..{}", value, r.start, r.end),
            TokenKind::Comment { value } => format!("comment({})@{}..{}", value, r.start, r.end),
            TokenKind::Field { value, .. } => format!("field({})@{}..{}", value, r.start, r.end),
            TokenKind::Literal { value, quoted, kind } => {
                let q = if *quoted { "quoted " } else { "" };
                format!("{}{}({})@{}..{}", q, kind, value, r.start, r.end)
            }
        }
    }

    fn scan_described(input: &str, comments: bool, pattern_type: PatternType) -> Vec<String> {
        scan(input, comments, pattern_type)
            .unwrap()
            .iter()
            .map(describe)
            .collect()
    }

    fn scan_literal(input: &str) -> Vec<String> {
        scan_described(input, false, PatternType::Literal)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(scan("", false, PatternType::Literal), Ok(vec![]));
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(scan_literal("  "), vec!["ws@0..2"]);
    }

    #[test]
    fn test_single_pattern() {
        let tokens = scan("a", false, PatternType::Literal).unwrap();
        assert_eq!(
            tokens,
            vec![Token::new(
                TokenKind::Literal {
                    value: "a".into(),
                    quoted: false,
                    kind: LiteralKind::Pattern(PatternType::Literal),
                },
                0,
                1
            )]
        );
    }

    #[test]
    fn test_filter() {
        assert_eq!(
            scan_literal("f:b"),
            vec!["field(f)@0..1", "separator(:)@1..2", "f-balanced-literal(b)@2..3"]
        );
    }

    #[test]
    fn test_negated_filter() {
        let tokens = scan("-f:b", false, PatternType::Literal).unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Field {
                value: "-f".into(),
                negated: true
            }
        );
        assert_eq!(
            tokens.iter().map(describe).collect::<Vec<_>>(),
            vec!["field(-f)@0..2", "separator(:)@2..3", "-f-balanced-literal(b)@3..4"]
        );
    }

    #[test]
    fn test_filter_without_value() {
        assert_eq!(
            scan_literal("repo: foo"),
            vec!["field(repo)@0..4", "separator(:)@4..5", "ws@5..6", "pattern-literal(foo)@6..9"]
        );
    }

    #[test]
    fn test_uppercase_keyword_is_rejected() {
        let error = scan("repo:foo AND bar", false, PatternType::Literal).unwrap_err();
        assert_eq!(error.expected, NO_FILTER_OR_KEYWORD);
        assert_eq!(error.at, 9);
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            scan("foo(", false, PatternType::Literal),
            Err(ScanError::new(NO_UNBALANCED_PARENTHESES, 4))
        );
    }

    #[test]
    fn test_keywords_and_groups() {
        assert_eq!(
            scan_literal("(foo and bar) or baz"),
            vec![
                "(@0..1",
                "pattern-literal(foo)@1..4",
                "ws@4..5",
                "keyword(and)@5..8",
                "ws@8..9",
                "pattern-literal(bar)@9..12",
                ")@12..13",
                "ws@13..14",
                "keyword(or)@14..16",
                "ws@16..17",
                "pattern-literal(baz)@17..20",
            ]
        );
    }

    #[test]
    fn test_group_with_filter_is_not_a_pattern() {
        assert_eq!(
            scan_literal("(repo:foo bar)"),
            vec![
                "(@0..1",
                "field(repo)@1..5",
                "separator(:)@5..6",
                "repo-balanced-literal(foo)@6..9",
                "ws@9..10",
                "pattern-literal(bar)@10..13",
                ")@13..14",
            ]
        );
    }

    #[test]
    fn test_balanced_parentheses_stay_in_pattern() {
        assert_eq!(
            scan_described("((a|b)|c)", false, PatternType::Regexp),
            vec!["pattern-regexp(((a|b)|c))@0..9"]
        );
        assert_eq!(
            scan_literal("myFunction(arg1, arg2)"),
            vec!["pattern-literal(myFunction(arg1, arg2))@0..22"]
        );
        assert_eq!(
            scan_literal("foo(...) bar"),
            vec!["pattern-literal(foo(...))@0..8", "ws@8..9", "pattern-literal(bar)@9..12"]
        );
    }

    #[test]
    fn test_closing_paren_ends_pattern() {
        assert_eq!(
            scan_literal("(foo or bar)"),
            vec![
                "(@0..1",
                "pattern-literal(foo)@1..4",
                "ws@4..5",
                "keyword(or)@5..7",
                "ws@7..8",
                "pattern-literal(bar)@8..11",
                ")@11..12",
            ]
        );
    }

    #[test]
    fn test_embedded_keyword_inside_parens_is_an_error() {
        let error = scan("foo(a or b)", false, PatternType::Literal).unwrap_err();
        assert_eq!(error, ScanError::new(NO_FILTER_OR_KEYWORD, 6));
    }

    #[test]
    fn test_keyword_prefix_is_a_pattern() {
        assert_eq!(scan_literal("android"), vec!["pattern-literal(android)@0..7"]);
        assert_eq!(scan_literal("order"), vec!["pattern-literal(order)@0..5"]);
    }

    #[test]
    fn test_predicate_value() {
        assert_eq!(
            scan_literal("repo:contains(file:README.md)"),
            vec![
                "field(repo)@0..4",
                "separator(:)@4..5",
                "repo-predicate(contains(file:README.md))@5..29",
            ]
        );
        assert_eq!(
            scan_literal("repo:contains.file(go.mod) x"),
            vec![
                "field(repo)@0..4",
                "separator(:)@4..5",
                "repo-predicate(contains.file(go.mod))@5..26",
                "ws@26..27",
                "pattern-literal(x)@27..28",
            ]
        );
    }

    #[test]
    fn test_quoted_filter_value() {
        assert_eq!(
            scan_literal(r#"file:"a b""#),
            vec!["field(file)@0..4", "separator(:)@4..5", "quoted file-quoted-literal(a b)@5..10"]
        );
    }

    #[test]
    fn test_quoted_pattern_in_regexp_mode() {
        assert_eq!(
            scan_described(r#""foo \"bar\"" baz"#, false, PatternType::Regexp),
            vec![
                r#"quoted pattern-regexp(foo "bar")@0..13"#,
                "ws@13..14",
                "pattern-regexp(baz)@14..17",
            ]
        );
    }

    #[test]
    fn test_quoted_pattern_in_literal_mode() {
        assert_eq!(
            scan_literal(r#""foo bar""#),
            vec![r#"quoted pattern-literal(foo bar)@0..9"#]
        );
        // 闭合引号后不是边界，回退为普通模式
        assert_eq!(scan_literal(r#"""""#), vec![r#"pattern-literal(""")@0..3"#]);
    }

    #[test]
    fn test_call_followed_by_text_is_a_plain_value() {
        assert_eq!(
            scan_literal("repo:contains(file:a)x"),
            vec![
                "field(repo)@0..4",
                "separator(:)@4..5",
                "repo-balanced-literal(contains(file:a)x)@5..22",
            ]
        );
    }

    #[test]
    fn test_quoted_paren_inside_predicate() {
        assert_eq!(
            scan_literal(r#"repo:contains(content:")") x"#),
            vec![
                "field(repo)@0..4",
                "separator(:)@4..5",
                r#"repo-predicate(contains(content:")"))@5..26"#,
                "ws@26..27",
                "pattern-literal(x)@27..28",
            ]
        );
        // 未闭合的引号只是普通字符
        assert_eq!(
            scan_literal("repo:contains(content:don't)"),
            vec![
                "field(repo)@0..4",
                "separator(:)@4..5",
                "repo-predicate(contains(content:don't))@5..28",
            ]
        );
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            scan(r#""foo"#, false, PatternType::Regexp),
            Err(ScanError::new(NO_UNTERMINATED_QUOTES, 4))
        );
        assert_eq!(
            scan(r#"file:"foo"#, false, PatternType::Literal),
            Err(ScanError::new(NO_UNTERMINATED_QUOTES, 9))
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            scan_described("a // b c\nd", true, PatternType::Literal),
            vec![
                "pattern-literal(a)@0..1",
                "ws@1..2",
                "comment(// b c)@2..8",
                "ws@8..9",
                "pattern-literal(d)@9..10",
            ]
        );
        assert_eq!(scan_literal("//"), vec!["pattern-literal(//)@0..2"]);
    }

    #[test]
    fn test_url_is_not_a_filter() {
        assert_eq!(
            scan_literal("https://example.com/a"),
            vec!["pattern-literal(https://example.com/a)@0..21"]
        );
    }

    #[test]
    fn test_structural_hole_is_not_a_filter() {
        assert_eq!(
            scan_described("foo:[x]", false, PatternType::Structural),
            vec!["pattern-structural(foo:[x])@0..7"]
        );
        assert_eq!(
            scan_literal("foo:[x]"),
            vec!["field(foo)@0..3", "separator(:)@3..4", "foo-balanced-literal([x])@4..7"]
        );
    }

    #[test]
    fn test_escaped_whitespace_stays_in_pattern() {
        assert_eq!(scan_literal(r"foo\ bar"), vec![r"pattern-literal(foo\ bar)@0..8"]);
    }

    #[test]
    fn test_character_offsets() {
        assert_eq!(
            scan_literal("é:ü x"),
            vec!["pattern-literal(é:ü)@0..3", "ws@3..4", "pattern-literal(x)@4..5"]
        );
    }

    #[test]
    fn test_ranges_cover_input() {
        let inputs = [
            "repo:foo file:bar baz",
            "(a or b) and -file:test c",
            "repo:contains(file:README.md) lang:go not x",
            "  leading and trailing  ",
            "a // comment",
        ];
        for input in inputs {
            let tokens = scan(input, true, PatternType::Regexp).unwrap();
            let mut expected_start = 0;
            for token in &tokens {
                assert_eq!(token.range.start, expected_start, "gap in {:?}", input);
                assert!(token.range.end > token.range.start);
                expected_start = token.range.end;
            }
            assert_eq!(expected_start, input.chars().count());
        }
    }
}
