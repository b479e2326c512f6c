//! 对扫描结果做语义检查
//!
//! 诊断只是提示：不会失败，无法理解输入的检查直接不报告。

use crate::config::{FilterValidation, FilterValidator};
use crate::predicate::PredicateScanner;
use crate::scanner::scan;
use crate::token::{CharacterRange, LiteralKind, PatternType, Token, TokenKind};
use log::debug;
use serde::Serialize;

pub const UNRECOGNIZED_PREDICATE_ARGUMENT: &str =
    "Unrecognized predicate argument. Expecting file:pattern, content:pattern, or both.";
pub const QUOTES_IN_LITERAL_PATTERN: &str =
    "Your search is interpreted literally and contains quotes. Did you mean to search for quotes?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// 带位置的编辑器提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub severity: Severity,
    pub message: String,
    pub range: CharacterRange,
}

impl Marker {
    fn error(message: impl Into<String>, range: CharacterRange) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            range,
        }
    }

    fn warning(message: impl Into<String>, range: CharacterRange) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            range,
        }
    }
}

pub fn get_diagnostics<V, P>(
    tokens: &[Token],
    pattern_type: PatternType,
    validator: &V,
    predicates: &P,
) -> Vec<Marker>
where
    V: FilterValidator + ?Sized,
    P: PredicateScanner + ?Sized,
{
    let mut markers = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::Field { value: field, .. } => {
                let value = filter_value_after(tokens, index).unwrap_or("");
                if let FilterValidation::Invalid { reason } = validator.validate_filter(field, value) {
                    markers.push(Marker::error(reason, token.range));
                }
            }
            TokenKind::Literal {
                value,
                kind: LiteralKind::Predicate(field),
                ..
            } => {
                if let Some(marker) = check_contains_predicate(field, value, token.range, validator, predicates) {
                    markers.push(marker);
                }
            }
            TokenKind::Literal {
                value,
                quoted,
                kind: LiteralKind::Pattern(_),
            } if pattern_type == PatternType::Literal => {
                if *quoted || looks_quoted(value) {
                    markers.push(Marker::warning(QUOTES_IN_LITERAL_PATTERN, token.range));
                }
            }
            _ => {}
        }
    }

    debug!("{} diagnostics for {} tokens", markers.len(), tokens.len());
    markers
}

/// 字段token位于 `index` 的过滤器的值
fn filter_value_after(tokens: &[Token], index: usize) -> Option<&str> {
    match tokens.get(index + 2).map(|t| &t.kind) {
        Some(TokenKind::Literal { value, kind, .. }) if kind.field().is_some() => Some(value.as_str()),
        _ => None,
    }
}

fn looks_quoted(value: &str) -> bool {
    value.chars().count() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// `repo:contains(...)` 接受一个 `file:` 过滤器、一个 `content:` 过滤器，或两者都有
fn check_contains_predicate<V, P>(
    field: &str,
    value: &str,
    range: CharacterRange,
    validator: &V,
    predicates: &P,
) -> Option<Marker>
where
    V: FilterValidator + ?Sized,
    P: PredicateScanner + ?Sized,
{
    let field = validator
        .resolve_filter(field)
        .map_or(field.trim_start_matches('-'), |spec| spec.name.as_str());
    let predicate = predicates.scan_predicate(field, value)?;
    if !predicate.field.eq_ignore_ascii_case("repo")
        || predicate.path.len() != 1
        || !predicate.path[0].eq_ignore_ascii_case("contains")
    {
        return None;
    }

    // 无法扫描的参数列表不在这里报告
    let tokens = scan(predicate.body(), false, PatternType::Literal).ok()?;
    let (tokens, has_file) = remove_filter(tokens, "file");
    let (tokens, has_content) = remove_filter(tokens, "content");
    let leftover = tokens.iter().any(|t| !t.is_whitespace());
    if (has_file || has_content) && !leftover {
        return None;
    }

    let start = range.start + predicate.name().chars().count() + 1;
    let length = predicate.parameters.chars().count().saturating_sub(2);
    Some(Marker::error(
        UNRECOGNIZED_PREDICATE_ARGUMENT,
        CharacterRange::new(start, start + length),
    ))
}

/// 从 `tokens` 中删除第一个未取反的 `name:value`
fn remove_filter(mut tokens: Vec<Token>, name: &str) -> (Vec<Token>, bool) {
    let position = tokens.iter().position(|t| {
        matches!(&t.kind, TokenKind::Field { value, negated: false } if value.eq_ignore_ascii_case(name))
    });
    let Some(position) = position else {
        return (tokens, false);
    };

    let mut end = position + 1;
    if tokens
        .get(end)
        .is_some_and(|t| matches!(&t.kind, TokenKind::Literal { kind: LiteralKind::Separator, .. }))
    {
        end += 1;
    }
    if tokens
        .get(end)
        .is_some_and(|t| matches!(&t.kind, TokenKind::Literal { kind, .. } if kind.field().is_some()))
    {
        end += 1;
    }
    tokens.drain(position..end);
    (tokens, true)
}
