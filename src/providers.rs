//! 编辑器适配层：把扫描结果转换为高亮、悬停说明和补全项。
//!
//! 这里的函数都是同步、无状态的；防抖、取消以及丢弃过期结果由调用方负责。

use crate::config::{FilterSpec, FilterValidator};
use crate::predicate::{PredicateCatalog, PredicateScanner};
use crate::token::{CharacterRange, KeywordKind, LiteralKind, PatternType, Token, TokenKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenStyle {
    Paren,
    Keyword,
    Comment,
    Pattern,
    RegexpPattern,
    StructuralPattern,
    QuotedPattern,
    Field,
    NegatedField,
    Separator,
    FilterValue,
    Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub range: CharacterRange,
    pub style: TokenStyle,
}

/// 为每个token确定高亮样式，空白不产生高亮
pub fn highlight(tokens: &[Token]) -> Vec<Highlight> {
    tokens
        .iter()
        .filter_map(|token| {
            let style = match &token.kind {
                TokenKind::Whitespace => return None,
                TokenKind::OpeningParen | TokenKind::ClosingParen => TokenStyle::Paren,
                TokenKind::Keyword { .. } => TokenStyle::Keyword,
                TokenKind::Comment { .. } => TokenStyle::Comment,
                TokenKind::Field { negated: false, .. } => TokenStyle::Field,
                TokenKind::Field { negated: true, .. } => TokenStyle::NegatedField,
                TokenKind::Literal { quoted, kind, .. } => match kind {
                    LiteralKind::Pattern(_) if *quoted => TokenStyle::QuotedPattern,
                    LiteralKind::Pattern(PatternType::Literal) => TokenStyle::Pattern,
                    LiteralKind::Pattern(PatternType::Regexp) => TokenStyle::RegexpPattern,
                    LiteralKind::Pattern(PatternType::Structural) => TokenStyle::StructuralPattern,
                    LiteralKind::Separator => TokenStyle::Separator,
                    LiteralKind::BalancedValue(_) | LiteralKind::QuotedValue(_) => TokenStyle::FilterValue,
                    LiteralKind::Predicate(_) => TokenStyle::Predicate,
                },
            };
            Some(Highlight {
                range: token.range,
                style,
            })
        })
        .collect()
}

/// 光标所在的token，即满足 `start <= offset < end` 的那个
pub fn token_at(tokens: &[Token], offset: usize) -> Option<&Token> {
    tokens
        .iter()
        .find(|t| t.range.start <= offset && offset < t.range.end)
}

/// 光标左侧紧邻的token，也就是正在输入的那个
fn token_before(tokens: &[Token], offset: usize) -> Option<(usize, &Token)> {
    tokens
        .iter()
        .enumerate()
        .find(|(_, t)| t.range.start < offset && offset <= t.range.end)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    pub range: CharacterRange,
    pub contents: String,
}

pub fn hover<V, P>(tokens: &[Token], offset: usize, validator: &V, predicates: &P) -> Option<Hover>
where
    V: FilterValidator + ?Sized,
    P: PredicateScanner + PredicateCatalog + ?Sized,
{
    let token = token_at(tokens, offset)?;
    let contents = match &token.kind {
        TokenKind::Field { value, negated } => describe_field(value, *negated, validator),
        TokenKind::Keyword { kind, .. } => match kind {
            KeywordKind::And => "Find results that match both the left and the right side.".to_string(),
            KeywordKind::Or => "Find results that match the left or the right side.".to_string(),
            KeywordKind::Not => "Exclude results matching the following pattern or filter.".to_string(),
        },
        TokenKind::Literal { value, kind, .. } => match kind {
            LiteralKind::Pattern(PatternType::Literal) => format!("Matches the text `{}` exactly.", value),
            LiteralKind::Pattern(PatternType::Regexp) => format!("Matches the regular expression `{}`.", value),
            LiteralKind::Pattern(PatternType::Structural) => format!("Matches the structural pattern `{}`.", value),
            LiteralKind::Separator => return None,
            LiteralKind::BalancedValue(field) | LiteralKind::QuotedValue(field) => {
                let negated = field.starts_with('-');
                describe_field(field, negated, validator)
            }
            LiteralKind::Predicate(field) => {
                let name = validator
                    .resolve_filter(field)
                    .map_or(field.trim_start_matches('-'), |spec| spec.name.as_str());
                let predicate = predicates.scan_predicate(name, value)?;
                let spec = predicates.lookup(name, &predicate.path)?;
                format!("**{}:{}(...)**: {}", spec.field, spec.name(), spec.description)
            }
        },
        TokenKind::Whitespace
        | TokenKind::OpeningParen
        | TokenKind::ClosingParen
        | TokenKind::Comment { .. } => return None,
    };
    Some(Hover {
        range: token.range,
        contents,
    })
}

fn describe_field<V: FilterValidator + ?Sized>(field: &str, negated: bool, validator: &V) -> String {
    match validator.resolve_filter(field) {
        Some(spec) if negated => format!("**-{}**: Exclude results matching this filter. {}", spec.name, spec.description),
        Some(spec) => format!("**{}**: {}", spec.name, spec.description),
        None => format!("Unknown filter `{}`.", field.trim_start_matches('-')),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Filter,
    Value,
    Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub label: String,
    pub insert_text: String,
    pub detail: String,
    pub kind: CompletionKind,
    /// 补全要替换的文本范围
    pub range: CharacterRange,
}

/// 光标位于 `offset` 时的补全项
pub fn completions<V, P>(
    tokens: &[Token],
    offset: usize,
    filters: &[FilterSpec],
    validator: &V,
    predicates: &P,
) -> Vec<Completion>
where
    V: FilterValidator + ?Sized,
    P: PredicateCatalog + ?Sized,
{
    let Some((index, token)) = token_before(tokens, offset) else {
        return filter_completions(filters, "", CharacterRange::new(offset, offset));
    };
    let typed = |value: &str| -> String { value.chars().take(offset - token.range.start).collect() };

    match &token.kind {
        TokenKind::Whitespace | TokenKind::OpeningParen | TokenKind::ClosingParen => {
            filter_completions(filters, "", CharacterRange::new(offset, offset))
        }
        TokenKind::Field { value, .. }
        | TokenKind::Literal {
            value,
            kind: LiteralKind::Pattern(_),
            quoted: false,
        } => filter_completions(filters, &typed(value), CharacterRange::new(token.range.start, offset)),
        TokenKind::Literal {
            kind: LiteralKind::Separator,
            ..
        } => match index.checked_sub(1).map(|i| &tokens[i].kind) {
            Some(TokenKind::Field { value: field, .. }) => value_completions(
                field,
                "",
                CharacterRange::new(offset, offset),
                validator,
                predicates,
            ),
            _ => Vec::new(),
        },
        TokenKind::Literal {
            value,
            kind: LiteralKind::BalancedValue(field),
            ..
        } => value_completions(
            field,
            &typed(value),
            CharacterRange::new(token.range.start, offset),
            validator,
            predicates,
        ),
        _ => Vec::new(),
    }
}

fn filter_completions(
    filters: &[FilterSpec],
    typed: &str,
    range: CharacterRange,
) -> Vec<Completion> {
    let negated = typed.starts_with('-');
    let prefix = typed.trim_start_matches('-').to_ascii_lowercase();
    let sign = if negated { "-" } else { "" };

    let mut items = Vec::new();
    for spec in filters {
        if negated && !spec.negatable {
            continue;
        }
        for name in std::iter::once(&spec.name).chain(&spec.aliases) {
            if name.to_ascii_lowercase().starts_with(&prefix) {
                items.push(Completion {
                    label: format!("{}{}", sign, name),
                    insert_text: format!("{}{}:", sign, name),
                    detail: spec.description.clone(),
                    kind: CompletionKind::Filter,
                    range,
                });
            }
        }
    }
    items
}

fn value_completions<V, P>(
    field: &str,
    typed: &str,
    range: CharacterRange,
    validator: &V,
    predicates: &P,
) -> Vec<Completion>
where
    V: FilterValidator + ?Sized,
    P: PredicateCatalog + ?Sized,
{
    let Some(spec) = validator.resolve_filter(field) else {
        return Vec::new();
    };
    let prefix = typed.to_ascii_lowercase();

    let values = spec
        .discrete_values()
        .iter()
        .filter(|v| v.to_ascii_lowercase().starts_with(&prefix))
        .map(|v| Completion {
            label: v.clone(),
            insert_text: v.clone(),
            detail: spec.description.clone(),
            kind: CompletionKind::Value,
            range,
        });
    let calls = predicates
        .predicates_for(&spec.name)
        .into_iter()
        .filter(|p| p.name().starts_with(&prefix))
        .map(|p| Completion {
            label: format!("{}(...)", p.name()),
            insert_text: p.snippet.to_string(),
            detail: p.description.to_string(),
            kind: CompletionKind::Predicate,
            range,
        });
    values.chain(calls).collect()
}
