//! 搜索查询语言的Token定义

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Token是语言的最小单元，包含类型和位置信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub range: CharacterRange,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            range: CharacterRange::new(start, end),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace)
    }

    /// 语法分析器不关心的token（空白、注释）
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment { .. })
    }
}

/// Token的类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TokenKind {
    Whitespace,
    OpeningParen,
    ClosingParen,

    // and / or / not
    Keyword { value: String, kind: KeywordKind },

    // "// ..." 直到行尾
    Comment { value: String },

    Literal {
        value: String,
        quoted: bool,
        kind: LiteralKind,
    },

    // 字段名，如 "repo"、"-file"
    Field { value: String, negated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordKind {
    And,
    Or,
    Not,
}

impl KeywordKind {
    /// 只匹配小写的运算符
    pub fn from_lowercase(s: &str) -> Option<Self> {
        match s {
            "and" => Some(KeywordKind::And),
            "or" => Some(KeywordKind::Or),
            "not" => Some(KeywordKind::Not),
            _ => None,
        }
    }

    /// 匹配任意大小写，用于判断字面值是否吞掉了关键字
    pub fn from_any_case(s: &str) -> Option<Self> {
        Self::from_lowercase(&s.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordKind::And => "and",
            KeywordKind::Or => "or",
            KeywordKind::Not => "not",
        }
    }
}

/// 查询中自由文本的解释方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    #[default]
    Literal,
    Regexp,
    Structural,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Literal => "literal",
            PatternType::Regexp => "regexp",
            PatternType::Structural => "structural",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" | "standard" => Ok(PatternType::Literal),
            "regexp" | "regex" => Ok(PatternType::Regexp),
            "structural" => Ok(PatternType::Structural),
            other => Err(format!("unknown pattern type: {}", other)),
        }
    }
}

/// 字面值token的标签，显示为 `pattern-literal`、`separator`、
/// `repo-balanced-literal`、`-file-quoted-literal`、`repo-predicate` 等
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// 自由文本，按模式类型解释
    Pattern(PatternType),
    /// 字段与值之间的 `:`
    Separator,
    /// 未加引号的过滤器值，保存原样书写的字段名（含 `-`）
    BalancedValue(String),
    /// 加引号的过滤器值
    QuotedValue(String),
    /// 函数调用形式的过滤器值，如 `contains(file:README.md)`
    Predicate(String),
}

impl LiteralKind {
    pub fn is_pattern(&self) -> bool {
        matches!(self, LiteralKind::Pattern(_))
    }

    /// 过滤器值所属的字段；其他类型返回 `None`
    pub fn field(&self) -> Option<&str> {
        match self {
            LiteralKind::BalancedValue(field)
            | LiteralKind::QuotedValue(field)
            | LiteralKind::Predicate(field) => Some(field),
            LiteralKind::Pattern(_) | LiteralKind::Separator => None,
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralKind::Pattern(pattern_type) => write!(f, "pattern-{}", pattern_type),
            LiteralKind::Separator => f.write_str("separator"),
            LiteralKind::BalancedValue(field) => write!(f, "{}-balanced-literal", field),
            LiteralKind::QuotedValue(field) => write!(f, "{}-quoted-literal", field),
            LiteralKind::Predicate(field) => write!(f, "{}-predicate", field),
        }
    }
}

impl Serialize for LiteralKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 查询中按字符计的左闭右开区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct CharacterRange {
    /// 起始字符
    pub start: usize,
    /// 结束字符的下一个位置
    pub end: usize,
}

impl CharacterRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 位于 `offset` 的光标是否接触该区间。包含结束位置，
    /// 紧跟在单词后面的光标仍属于该单词
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}
