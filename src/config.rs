//! 过滤器注册表配置，从JSON文件加载或使用内置默认值
//!
//! 诊断、悬停和补全都通过注册表判断 `field:value` 是否是已知过滤器，
//! 以及它的值是否合法。
//!
//! ```json
//! {
//!   "filters": [
//!     { "name": "repo", "aliases": ["r"], "description": "...", "value": { "type": "nonempty" } },
//!     { "name": "case", "negatable": false, "value": { "type": "discrete", "values": ["yes", "no"] } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse filter config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("filter name or alias defined twice: {0}")]
    Duplicate(String),
}

/// 过滤器接受的值类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FilterValue {
    Any,
    NonEmpty,
    Discrete(Vec<String>),
    Number,
}

/// 一个已知的过滤器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_negatable")]
    pub negatable: bool,
    #[serde(default = "default_value")]
    pub value: FilterValue,
}

fn default_negatable() -> bool {
    true
}

fn default_value() -> FilterValue {
    FilterValue::NonEmpty
}

impl FilterSpec {
    fn new(
        name: &str,
        aliases: &[&str],
        negatable: bool,
        value: FilterValue,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            description: description.to_string(),
            negatable,
            value,
        }
    }

    /// `name`（不含 `-`）是否为该过滤器的名称或别名
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    pub fn discrete_values(&self) -> &[String] {
        match &self.value {
            FilterValue::Discrete(values) => values,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValidation {
    Valid,
    Invalid { reason: String },
}

impl FilterValidation {
    fn invalid(reason: String) -> Self {
        FilterValidation::Invalid { reason }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FilterValidation::Valid)
    }
}

/// 解析过滤器名称并校验其值
pub trait FilterValidator {
    /// 按名称或别名查找过滤器，忽略开头的 `-`
    fn resolve_filter(&self, name: &str) -> Option<&FilterSpec>;

    /// 校验 `name:value`，`name` 为原样书写的字段名（含 `-`）
    fn validate_filter(&self, name: &str, value: &str) -> FilterValidation;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRegistry {
    filters: Vec<FilterSpec>,
}

impl FilterRegistry {
    pub fn new(filters: Vec<FilterSpec>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for spec in &filters {
            for name in std::iter::once(&spec.name).chain(&spec.aliases) {
                if !seen.insert(name.to_ascii_lowercase()) {
                    return Err(ConfigError::Duplicate(name.clone()));
                }
            }
        }
        Ok(Self { filters })
    }

    /// 从JSON文件加载注册表
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::Missing(path_ref.to_path_buf()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let registry: FilterRegistry = serde_json::from_str(content)?;
        Self::new(registry.filters)
    }

    pub fn get_filters(&self) -> &[FilterSpec] {
        &self.filters
    }
}

impl Default for FilterRegistry {
    /// 所有搜索后端都支持的过滤器
    fn default() -> Self {
        use FilterValue::{Discrete, NonEmpty, Number};

        let yes_no_only = || Discrete(vec!["yes".into(), "no".into(), "only".into()]);
        let filters = vec![
            FilterSpec::new("repo", &["r"], true, NonEmpty, "Include only results from repositories matching the given search pattern."),
            FilterSpec::new("file", &["f", "path"], true, NonEmpty, "Include only results from files matching the given search pattern."),
            FilterSpec::new("lang", &["l", "language"], true, NonEmpty, "Include only results from files in the given language."),
            FilterSpec::new("content", &[], true, NonEmpty, "Search file content for the given pattern, even if it looks like query syntax."),
            FilterSpec::new("case", &[], false, Discrete(vec!["yes".into(), "no".into()]), "Treat the search pattern as case-sensitive."),
            FilterSpec::new(
                "type",
                &[],
                false,
                Discrete(["repo", "path", "file", "symbol", "diff", "commit"].map(String::from).to_vec()),
                "Limit results to the given type.",
            ),
            FilterSpec::new(
                "patterntype",
                &[],
                false,
                Discrete(["literal", "regexp", "structural", "standard"].map(String::from).to_vec()),
                "Interpret the search pattern as a literal string, a regular expression, or a structural pattern.",
            ),
            FilterSpec::new("count", &[], false, Number, "Retrieve at least N results."),
            FilterSpec::new("timeout", &[], false, NonEmpty, "Maximum time the search may take, e.g. 30s."),
            FilterSpec::new("fork", &[], false, yes_no_only(), "Include results from forked repositories, or only from forks."),
            FilterSpec::new("archived", &[], false, yes_no_only(), "Include results from archived repositories, or only from archived ones."),
            FilterSpec::new(
                "visibility",
                &[],
                false,
                Discrete(["any", "private", "public"].map(String::from).to_vec()),
                "Include only results from repositories with the given visibility.",
            ),
            FilterSpec::new("rev", &["revision"], false, NonEmpty, "Search a revision (branch, commit, or tag) instead of the default branch."),
            FilterSpec::new("context", &[], false, NonEmpty, "Search within the given search context."),
            FilterSpec::new(
                "select",
                &[],
                false,
                Discrete(["repo", "file", "content", "symbol", "commit"].map(String::from).to_vec()),
                "Show only the selected kind of result.",
            ),
            FilterSpec::new("author", &[], true, NonEmpty, "Include only commits or diffs authored by a matching user."),
            FilterSpec::new("committer", &[], true, NonEmpty, "Include only commits or diffs committed by a matching user."),
            FilterSpec::new("before", &["until"], false, NonEmpty, "Include only commits made before the given date."),
            FilterSpec::new("after", &["since"], false, NonEmpty, "Include only commits made after the given date."),
            FilterSpec::new("message", &["msg", "m"], true, NonEmpty, "Include only commits whose message matches the pattern."),
            FilterSpec::new("repohasfile", &[], true, NonEmpty, "Include only repositories containing a file matching the pattern."),
        ];
        Self { filters }
    }
}

impl FilterValidator for FilterRegistry {
    fn resolve_filter(&self, name: &str) -> Option<&FilterSpec> {
        let name = name.trim_start_matches('-');
        self.filters.iter().find(|spec| spec.matches(name))
    }

    fn validate_filter(&self, name: &str, value: &str) -> FilterValidation {
        let Some(spec) = self.resolve_filter(name) else {
            return FilterValidation::invalid("Invalid filter type.".to_string());
        };
        if name.starts_with('-') && !spec.negatable {
            return FilterValidation::invalid(format!("Filter {} cannot be negated.", spec.name));
        }

        let requires_value = !matches!(spec.value, FilterValue::Any);
        if requires_value && value.is_empty() {
            return FilterValidation::invalid(format!("Filter {} requires a value.", spec.name));
        }

        match &spec.value {
            FilterValue::Discrete(values) if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) => {
                FilterValidation::invalid(format!(
                    "Invalid value for {}. Expected one of: {}.",
                    spec.name,
                    values.join(", ")
                ))
            }
            FilterValue::Number if value.parse::<u64>().is_err() => FilterValidation::invalid(format!(
                "Invalid value for {}. Expected a number.",
                spec.name
            )),
            _ => FilterValidation::Valid,
        }
    }
}
