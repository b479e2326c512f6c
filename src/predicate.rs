//! 过滤器值中的函数调用形式，例如 `repo:contains(file:README.md)`、
//! `repo:contains.commit.after(1 month ago)`。

use serde::Serialize;

/// 在过滤器值中识别出的谓词调用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    /// 谓词所属的规范字段名，如 `repo`
    pub field: String,
    /// 点分名称拆开后的各段：`contains.file` 为 `["contains", "file"]`
    pub path: Vec<String>,
    /// 带括号的参数列表，如 `(file:README.md)`
    pub parameters: String,
}

impl Predicate {
    pub fn name(&self) -> String {
        self.path.join(".")
    }

    /// 去掉外层括号的参数部分
    pub fn body(&self) -> &str {
        let inner = self.parameters.strip_prefix('(').unwrap_or(&self.parameters);
        inner.strip_suffix(')').unwrap_or(inner)
    }
}

/// 识别过滤器值中的谓词调用语法
pub trait PredicateScanner {
    fn scan_predicate(&self, field: &str, value: &str) -> Option<Predicate>;
}

/// 谓词目录，供悬停说明和补全使用
pub trait PredicateCatalog {
    /// 已知的全部谓词
    fn predicates(&self) -> &[PredicateSpec];

    /// `field` 上可用的谓词。字段名前的 `-` 会被忽略。
    fn predicates_for(&self, field: &str) -> Vec<&PredicateSpec> {
        let field = normalize_field(field);
        self.predicates()
            .iter()
            .filter(|p| p.field.eq_ignore_ascii_case(field))
            .collect()
    }

    fn lookup(&self, field: &str, path: &[String]) -> Option<&PredicateSpec> {
        let field = normalize_field(field);
        self.predicates().iter().find(|p| {
            p.field.eq_ignore_ascii_case(field)
                && p.path.len() == path.len()
                && p.path.iter().zip(path).all(|(a, b)| a.eq_ignore_ascii_case(b))
        })
    }
}

/// 默认语法中的一个谓词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateSpec {
    pub field: &'static str,
    pub path: &'static [&'static str],
    pub description: &'static str,
    /// 补全时插入的文本
    pub snippet: &'static str,
}

impl PredicateSpec {
    pub fn name(&self) -> String {
        self.path.join(".")
    }
}

const DEFAULT_PREDICATES: &[PredicateSpec] = &[
    PredicateSpec {
        field: "repo",
        path: &["contains"],
        description: "Search only inside repositories that contain a file path match, a file content match, or both.",
        snippet: "contains(file:",
    },
    PredicateSpec {
        field: "repo",
        path: &["contains", "file"],
        description: "Search only inside repositories that contain a file path matching the pattern.",
        snippet: "contains.file(",
    },
    PredicateSpec {
        field: "repo",
        path: &["contains", "content"],
        description: "Search only inside repositories that contain file content matching the pattern.",
        snippet: "contains.content(",
    },
    PredicateSpec {
        field: "repo",
        path: &["contains", "commit", "after"],
        description: "Search only inside repositories with commits after the given date.",
        snippet: "contains.commit.after(",
    },
    PredicateSpec {
        field: "repo",
        path: &["dependencies"],
        description: "Search inside the dependencies of the matching repositories.",
        snippet: "dependencies(",
    },
    PredicateSpec {
        field: "file",
        path: &["contains"],
        description: "Search only inside files that contain content matching the pattern.",
        snippet: "contains(",
    },
    PredicateSpec {
        field: "file",
        path: &["contains", "content"],
        description: "Search only inside files that contain content matching the pattern.",
        snippet: "contains.content(",
    },
];

/// 内置的谓词语法
#[derive(Debug, Clone)]
pub struct PredicateGrammar {
    predicates: Vec<PredicateSpec>,
}

impl Default for PredicateGrammar {
    fn default() -> Self {
        Self {
            predicates: DEFAULT_PREDICATES.to_vec(),
        }
    }
}

impl PredicateGrammar {
    pub fn new(predicates: Vec<PredicateSpec>) -> Self {
        Self { predicates }
    }
}

impl PredicateCatalog for PredicateGrammar {
    fn predicates(&self) -> &[PredicateSpec] {
        &self.predicates
    }
}

impl PredicateScanner for PredicateGrammar {
    fn scan_predicate(&self, field: &str, value: &str) -> Option<Predicate> {
        let open = value.find('(')?;
        let (name, parameters) = value.split_at(open);
        if !parameters.ends_with(')') || parameters.len() < 2 {
            return None;
        }
        let path: Vec<String> = name.split('.').map(str::to_string).collect();
        if !path.iter().all(|segment| is_identifier(segment)) {
            return None;
        }
        let spec = self.lookup(field, &path)?;
        Some(Predicate {
            field: spec.field.to_string(),
            path,
            parameters: parameters.to_string(),
        })
    }
}

fn normalize_field(field: &str) -> &str {
    field.trim_start_matches('-')
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_contains() {
        let grammar = PredicateGrammar::default();
        let predicate = grammar.scan_predicate("repo", "contains(file:README.md)").unwrap();
        assert_eq!(predicate.path, vec!["contains"]);
        assert_eq!(predicate.parameters, "(file:README.md)");
        assert_eq!(predicate.body(), "file:README.md");
        assert_eq!(predicate.name(), "contains");
    }

    #[test]
    fn test_scan_dotted_path() {
        let grammar = PredicateGrammar::default();
        let predicate = grammar
            .scan_predicate("-repo", "contains.commit.after(1 month ago)")
            .unwrap();
        assert_eq!(predicate.field, "repo");
        assert_eq!(predicate.name(), "contains.commit.after");
        assert_eq!(predicate.body(), "1 month ago");
    }

    #[test]
    fn test_unknown_predicates() {
        let grammar = PredicateGrammar::default();
        assert_eq!(grammar.scan_predicate("repo", "foo(bar)"), None);
        assert_eq!(grammar.scan_predicate("lang", "contains(x)"), None);
        assert_eq!(grammar.scan_predicate("repo", "contains"), None);
        assert_eq!(grammar.scan_predicate("repo", "contains(x"), None);
        assert_eq!(grammar.scan_predicate("repo", "con-tains(x)"), None);
    }

    #[test]
    fn test_predicates_for_field() {
        let grammar = PredicateGrammar::default();
        let names: Vec<_> = grammar.predicates_for("file").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["contains", "contains.content"]);
    }
}
