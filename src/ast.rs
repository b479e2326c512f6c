//! 搜索查询的语法树

use crate::scanner::is_quote;
use crate::token::{CharacterRange, PatternType};
use serde::Serialize;
use std::fmt;

/// 语法树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Pattern(Pattern),
    Parameter(Parameter),
    Operator(Operator),
}

/// 要搜索的自由文本，如 `foo`、`(a|b)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    pub kind: PatternType,
    pub value: String,
    pub quoted: bool,
    pub negated: bool,
    pub range: CharacterRange,
}

/// 解析后的 `field:value` 过滤器。`field` 不带 `-`，取反记录在 `negated` 中
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub field: String,
    pub value: String,
    pub quoted: bool,
    pub negated: bool,
    pub range: CharacterRange,
}

/// 显式的 `and` / `or`，包含一个或多个操作数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    pub kind: OperatorKind,
    pub operands: Vec<Node>,
    pub range: CharacterRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatorKind {
    And,
    Or,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::And => "and",
            OperatorKind::Or => "or",
        }
    }
}

impl Node {
    pub fn range(&self) -> CharacterRange {
        match self {
            Node::Pattern(pattern) => pattern.range,
            Node::Parameter(parameter) => parameter.range,
            Node::Operator(operator) => operator.range,
        }
    }

    /// 忽略位置信息的结构比较
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Pattern(a), Node::Pattern(b)) => {
                a.kind == b.kind && a.value == b.value && a.quoted == b.quoted && a.negated == b.negated
            }
            (Node::Parameter(a), Node::Parameter(b)) => {
                a.field == b.field && a.value == b.value && a.quoted == b.quoted && a.negated == b.negated
            }
            (Node::Operator(a), Node::Operator(b)) => {
                a.kind == b.kind && same_shape(&a.operands, &b.operands)
            }
            _ => false,
        }
    }
}

/// 对两个节点列表做 [`Node::same_shape`] 比较
pub fn same_shape(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}

impl Operator {
    /// 构造覆盖首个到末个操作数的运算符节点，操作数为空时返回 `None`
    pub fn new(kind: OperatorKind, operands: Vec<Node>) -> Option<Self> {
        let start = operands.first()?.range().start;
        let end = operands.last()?.range().end;
        Some(Self {
            kind,
            operands,
            range: CharacterRange::new(start, end),
        })
    }
}

/// 把节点列表还原为查询字符串，重新解析后得到相同的树
pub fn to_query_string(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Pattern(pattern) => {
                let value = render_value(&pattern.value, pattern.quoted);
                if pattern.negated {
                    write!(f, "(not {})", value)
                } else {
                    f.write_str(&value)
                }
            }
            Node::Parameter(parameter) => {
                if parameter.negated {
                    f.write_str("-")?;
                }
                write!(
                    f,
                    "{}:{}",
                    parameter.field,
                    render_value(&parameter.value, parameter.quoted)
                )
            }
            Node::Operator(operator) => {
                let separator = format!(" {} ", operator.kind.as_str());
                let operands = operator
                    .operands
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(&separator);
                write!(f, "({})", operands)
            }
        }
    }
}

fn render_value(value: &str, quoted: bool) -> String {
    if !quoted {
        return value.to_string();
    }
    let delimiter = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    let mut rendered = String::with_capacity(value.len() + 2);
    rendered.push(delimiter);
    for c in value.chars() {
        if c == '\\' || (is_quote(c) && c == delimiter) {
            rendered.push('\\');
        }
        rendered.push(c);
    }
    rendered.push(delimiter);
    rendered
}
