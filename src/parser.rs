//! 搜索查询语言的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_or()                      Or     := And ("or" And)*
//!        └─ parse_and()                And    := Leaves ("and" Leaves)*
//!             └─ parse_leaves()        Leaves := (Leaf | "not" Leaf | "(" Or ")")*
//!                  ├─ 模式字面值       → Pattern
//!                  ├─ field : value    → Parameter
//!                  ├─ "not" leaf       → 取反的 Pattern / Parameter
//!                  └─ "(" → parse_or() → 分组内的节点，直接并入当前序列
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(a or b)`
//! 2. **取反** `not a`、`-repo:a`
//! 3. **AND** `a and b`
//! 4. **OR** `a or b`
//!
//! 因此 `a and b or c` 解析为 `(a and b) or c`。
//!
//! 每个规则接收剩余的token，返回构造出的节点以及未消费的token，
//! 规则之间不共享游标。
//!
//! 没有关键字连接的相邻节点保持为平铺列表；只有显式的 `and` / `or`
//! 才会产生 `Operator`，并收集两侧所有相邻节点：`a b and c` 为 `AND[a, b, c]`。

use crate::ast::{Node, Operator, OperatorKind, Parameter, Pattern};
use crate::scanner::{scan, ScanError};
use crate::token::{CharacterRange, KeywordKind, LiteralKind, PatternType, Token, TokenKind};
use log::debug;
use serde::Serialize;
use thiserror::Error;

pub const EXPECTED_CONVERTIBLE_TOKEN: &str = "a convertible token to tree node";
pub const EXPECTED_CLOSING_PAREN: &str = "a closing parenthesis";
pub const EXPECTED_LEAF_AFTER_NOT: &str = "a pattern or filter after not";

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("expected {expected}")]
pub struct ParseError {
    pub expected: String,
}

impl ParseError {
    fn new(expected: &str) -> Self {
        Self {
            expected: expected.to_string(),
        }
    }
}

/// 扫描加解析整个流程的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    Scan(#[from] ScanError),
    #[error("invalid query: {0}")]
    Parse(#[from] ParseError),
}

/// 规则构造出的节点以及剩余的token
struct Parsed<'a> {
    nodes: Vec<Node>,
    rest: &'a [&'a Token],
}

/// 解析token序列，跳过空白和注释
pub fn parse(tokens: &[Token]) -> Result<Vec<Node>, ParseError> {
    let tokens: Vec<&Token> = tokens.iter().filter(|t| !t.is_trivia()).collect();
    let Parsed { nodes, rest } = parse_or(&tokens)?;
    if let Some(token) = rest.first() {
        debug!("unconsumed token {:?} at {:?}", token.kind, token.range);
        return Err(ParseError::new(EXPECTED_CONVERTIBLE_TOKEN));
    }
    Ok(nodes)
}

/// 以字面模式、不解析注释的方式扫描 `input`，然后解析
pub fn parse_query(input: &str) -> Result<Vec<Node>, QueryError> {
    parse_query_with(input, false, PatternType::Literal)
}

pub fn parse_query_with(
    input: &str,
    interpret_comments: bool,
    pattern_type: PatternType,
) -> Result<Vec<Node>, QueryError> {
    let tokens = scan(input, interpret_comments, pattern_type)?;
    let nodes = parse(&tokens)?;
    debug!("parsed {:?} into {} top-level nodes", input, nodes.len());
    Ok(nodes)
}

fn parse_or<'a>(tokens: &'a [&'a Token]) -> Result<Parsed<'a>, ParseError> {
    parse_operator(tokens, KeywordKind::Or, OperatorKind::Or, parse_and)
}

fn parse_and<'a>(tokens: &'a [&'a Token]) -> Result<Parsed<'a>, ParseError> {
    parse_operator(tokens, KeywordKind::And, OperatorKind::And, parse_leaves)
}

/// `operand (keyword operand)*`，OR 和 AND 两层共用
fn parse_operator<'a>(
    tokens: &'a [&'a Token],
    keyword: KeywordKind,
    kind: OperatorKind,
    operand: fn(&'a [&'a Token]) -> Result<Parsed<'a>, ParseError>,
) -> Result<Parsed<'a>, ParseError> {
    let Parsed { mut nodes, mut rest } = operand(tokens)?;
    let mut explicit = false;

    while let Some(after) = skip_keyword(rest, keyword) {
        explicit = true;
        let right = operand(after)?;
        nodes.extend(right.nodes);
        rest = right.rest;
    }

    Ok(Parsed {
        nodes: combine(kind, nodes, explicit),
        rest,
    })
}

/// 相邻节点由关键字连接时包装为运算符。悬空的关键字（`a and`）
/// 只留下一个操作数，保持原样
fn combine(kind: OperatorKind, nodes: Vec<Node>, explicit: bool) -> Vec<Node> {
    if !explicit || nodes.len() < 2 {
        return nodes;
    }
    match Operator::new(kind, nodes) {
        Some(operator) => vec![Node::Operator(operator)],
        None => Vec::new(),
    }
}

fn skip_keyword<'a>(tokens: &'a [&'a Token], keyword: KeywordKind) -> Option<&'a [&'a Token]> {
    match tokens.split_first() {
        Some((token, rest)) => match &token.kind {
            TokenKind::Keyword { kind, .. } if *kind == keyword => Some(rest),
            _ => None,
        },
        None => None,
    }
}

fn parse_leaves<'a>(tokens: &'a [&'a Token]) -> Result<Parsed<'a>, ParseError> {
    let mut nodes = Vec::new();
    let mut rest = tokens;

    while let Some((token, after)) = rest.split_first() {
        match &token.kind {
            TokenKind::Literal {
                kind: LiteralKind::Pattern(_),
                ..
            }
            | TokenKind::Field { .. } => {
                let (node, after) = parse_leaf(rest, None)?;
                nodes.push(node);
                rest = after;
            }
            TokenKind::Keyword {
                kind: KeywordKind::Not,
                ..
            } => {
                let (node, after) = parse_leaf(after, Some(*token))?;
                nodes.push(node);
                rest = after;
            }
            TokenKind::OpeningParen => {
                let group = parse_or(after)?;
                match group.rest.split_first() {
                    Some((close, after)) if close.kind == TokenKind::ClosingParen => {
                        nodes.extend(group.nodes);
                        rest = after;
                    }
                    _ => return Err(ParseError::new(EXPECTED_CLOSING_PAREN)),
                }
            }
            // and / or / ")" 交给外层规则处理
            _ => break,
        }
    }

    Ok(Parsed { nodes, rest })
}

/// 把一个模式或一组 `field:value` 转换为节点，`not` 为前面的取反关键字（如果有）
fn parse_leaf<'a>(
    tokens: &'a [&'a Token],
    not: Option<&Token>,
) -> Result<(Node, &'a [&'a Token]), ParseError> {
    let negated = not.is_some();
    let unconvertible = || {
        ParseError::new(if negated {
            EXPECTED_LEAF_AFTER_NOT
        } else {
            EXPECTED_CONVERTIBLE_TOKEN
        })
    };
    let Some((token, rest)) = tokens.split_first() else {
        return Err(unconvertible());
    };
    let start = not.map_or(token.range.start, |t| t.range.start);

    match &token.kind {
        TokenKind::Literal {
            value,
            quoted,
            kind: LiteralKind::Pattern(pattern_type),
        } => {
            let pattern = Pattern {
                kind: *pattern_type,
                value: value.clone(),
                quoted: *quoted,
                negated,
                range: CharacterRange::new(start, token.range.end),
            };
            Ok((Node::Pattern(pattern), rest))
        }
        TokenKind::Field {
            value: field,
            negated: field_negated,
        } => {
            let Some((separator, rest)) = rest.split_first() else {
                return Err(unconvertible());
            };
            if !matches!(
                separator.kind,
                TokenKind::Literal {
                    kind: LiteralKind::Separator,
                    ..
                }
            ) {
                return Err(unconvertible());
            }

            let (value, quoted, end, rest) = match rest.split_first() {
                Some((candidate, after)) => match filter_value(candidate) {
                    Some((value, quoted)) => (value.to_string(), quoted, candidate.range.end, after),
                    None => (String::new(), false, separator.range.end, rest),
                },
                None => (String::new(), false, separator.range.end, rest),
            };

            let parameter = Parameter {
                field: field.trim_start_matches('-').to_string(),
                value,
                quoted,
                negated: *field_negated != negated,
                range: CharacterRange::new(start, end),
            };
            Ok((Node::Parameter(parameter), rest))
        }
        _ => Err(unconvertible()),
    }
}

fn filter_value(token: &Token) -> Option<(&str, bool)> {
    match &token.kind {
        TokenKind::Literal {
            value,
            quoted,
            kind,
        } if kind.field().is_some() => Some((value, *quoted)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{same_shape, to_query_string};

    fn parse_string(input: &str) -> Result<Vec<Node>, QueryError> {
        parse_query(input)
    }

    fn operator(node: &Node) -> &Operator {
        match node {
            Node::Operator(operator) => operator,
            other => panic!("Expected operator, found {:?}", other),
        }
    }

    fn pattern_value(node: &Node) -> &str {
        match node {
            Node::Pattern(pattern) => &pattern.value,
            other => panic!("Expected pattern, found {:?}", other),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let nodes = parse_string("a and b or c").unwrap();
        assert_eq!(nodes.len(), 1);

        let or = operator(&nodes[0]);
        assert_eq!(or.kind, OperatorKind::Or);
        assert_eq!(or.operands.len(), 2);

        let and = operator(&or.operands[0]);
        assert_eq!(and.kind, OperatorKind::And);
        assert_eq!(pattern_value(&and.operands[0]), "a");
        assert_eq!(pattern_value(&and.operands[1]), "b");
        assert_eq!(pattern_value(&or.operands[1]), "c");
        assert_eq!(or.range, CharacterRange::new(0, 12));
        assert_eq!(and.range, CharacterRange::new(0, 7));
    }

    #[test]
    fn test_or_then_and() {
        let nodes = parse_string("a or b and c").unwrap();
        assert_eq!(to_query_string(&nodes), "(a or (b and c))");
    }

    #[test]
    fn test_siblings_stay_flat() {
        let nodes = parse_string("a b repo:c").unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|n| !matches!(n, Node::Operator(_))));
    }

    #[test]
    fn test_operator_collects_all_siblings() {
        let nodes = parse_string("a b and c and d").unwrap();
        let and = operator(&nodes[0]);
        assert_eq!(and.operands.len(), 4);
        assert_eq!(to_query_string(&nodes), "(a and b and c and d)");
    }

    #[test]
    fn test_group() {
        let nodes = parse_string("(a or b) and c").unwrap();
        let and = operator(&nodes[0]);
        assert_eq!(and.kind, OperatorKind::And);
        assert_eq!(operator(&and.operands[0]).kind, OperatorKind::Or);
        assert_eq!(pattern_value(&and.operands[1]), "c");
    }

    #[test]
    fn test_parameters() {
        let nodes = parse_string("repo:foo -file:test lang:").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Parameter(Parameter {
                    field: "repo".into(),
                    value: "foo".into(),
                    quoted: false,
                    negated: false,
                    range: CharacterRange::new(0, 8),
                }),
                Node::Parameter(Parameter {
                    field: "file".into(),
                    value: "test".into(),
                    quoted: false,
                    negated: true,
                    range: CharacterRange::new(9, 19),
                }),
                Node::Parameter(Parameter {
                    field: "lang".into(),
                    value: String::new(),
                    quoted: false,
                    negated: false,
                    range: CharacterRange::new(20, 25),
                }),
            ]
        );
    }

    #[test]
    fn test_not() {
        let nodes = parse_string("not foo not repo:bar").unwrap();
        match &nodes[0] {
            Node::Pattern(pattern) => {
                assert!(pattern.negated);
                assert_eq!(pattern.value, "foo");
                assert_eq!(pattern.range, CharacterRange::new(0, 7));
            }
            other => panic!("Expected pattern, found {:?}", other),
        }
        match &nodes[1] {
            Node::Parameter(parameter) => {
                assert!(parameter.negated);
                assert_eq!(parameter.field, "repo");
            }
            other => panic!("Expected parameter, found {:?}", other),
        }
    }

    #[test]
    fn test_not_before_group_is_error() {
        assert_eq!(
            parse_string("not (a or b)"),
            Err(QueryError::Parse(ParseError::new(EXPECTED_LEAF_AFTER_NOT)))
        );
    }

    #[test]
    fn test_missing_closing_paren() {
        assert_eq!(
            parse_string("(a or b"),
            Err(QueryError::Parse(ParseError::new(EXPECTED_CLOSING_PAREN)))
        );
    }

    #[test]
    fn test_stray_closing_paren() {
        assert_eq!(
            parse_string("a or b)"),
            Err(QueryError::Parse(ParseError::new(EXPECTED_CONVERTIBLE_TOKEN)))
        );
    }

    #[test]
    fn test_scan_error_propagates() {
        match parse_string("foo(") {
            Err(QueryError::Scan(error)) => assert_eq!(error.at, 4),
            other => panic!("Expected scan error, found {:?}", other),
        }
    }

    #[test]
    fn test_dangling_keyword() {
        let nodes = parse_string("a and").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(pattern_value(&nodes[0]), "a");
        assert!(parse_string("or").unwrap().is_empty());
    }

    #[test]
    fn test_comments_are_skipped() {
        let nodes = parse_query_with("a // and b", true, PatternType::Literal).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_regexp_pattern_kind() {
        let nodes = parse_query_with(r#"(a|b) "c d""#, false, PatternType::Regexp).unwrap();
        match (&nodes[0], &nodes[1]) {
            (Node::Pattern(first), Node::Pattern(second)) => {
                assert_eq!(first.kind, PatternType::Regexp);
                assert_eq!(first.value, "(a|b)");
                assert!(second.quoted);
                assert_eq!(second.value, "c d");
            }
            other => panic!("Expected two patterns, found {:?}", other),
        }
    }

    #[test]
    fn test_round_trip() {
        let queries = [
            "a and b or c",
            "repo:foo -file:bar (x or y) and z",
            "not foo bar",
            "(a or b) (c and d)",
            "repo:contains(file:README.md) lang:go",
            r#"file:"a b" c"#,
            r#""a b" and c"#,
            "((a and b) and c)",
            "a or b or c",
            "-repo:x not y",
            "lang: foo(bar)",
        ];
        for query in queries {
            let nodes = parse_string(query).unwrap();
            let rendered = to_query_string(&nodes);
            let reparsed = parse_string(&rendered).unwrap();
            assert!(
                same_shape(&nodes, &reparsed),
                "{:?} rendered as {:?} parsed differently",
                query,
                rendered
            );
        }
    }
}
