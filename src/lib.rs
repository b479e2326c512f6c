//! 代码搜索查询语言：词法分析、语法分析以及编辑器支持
//!
//! ```text
//! "repo:foo a and not b"
//!   └─ scanner::scan()       → token序列（带位置，保留空白）
//!        ├─ parser::parse()  → Pattern / Parameter / Operator 组成的语法树
//!        │    └─ visitor     → 遍历语法树
//!        ├─ diagnostics      → 编辑器诊断标记
//!        └─ providers        → 高亮、悬停、补全
//! ```

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod predicate;
pub mod providers;
pub mod scanner;
pub mod token;
pub mod visitor;

pub use ast::{to_query_string, Node};
pub use config::{FilterRegistry, FilterValidator};
pub use diagnostics::{get_diagnostics, Marker};
pub use parser::{parse, parse_query, parse_query_with, QueryError};
pub use predicate::{PredicateCatalog, PredicateGrammar, PredicateScanner};
pub use scanner::{scan, ScanError};
pub use token::{CharacterRange, PatternType, Token, TokenKind};
pub use visitor::{visit, Visitor};
