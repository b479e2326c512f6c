use std::env;

use anyhow::Result;
use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use search_query::ast::{to_query_string, Node};
use search_query::config::FilterRegistry;
use search_query::diagnostics::get_diagnostics;
use search_query::parser::parse;
use search_query::predicate::PredicateGrammar;
use search_query::providers::{completions, hover};
use search_query::scanner::scan;
use search_query::token::{PatternType, Token};
use search_query::visitor::{collect_parameters, count_nodes};

const FILTERS_ENV: &str = "SEARCH_QUERY_FILTERS";
const DEFAULT_FILTERS_FILE: &str = "filters.json";

/// 从JSON加载过滤器注册表，失败时使用内置过滤器
fn load_registry() -> FilterRegistry {
    let path = env::var(FILTERS_ENV).unwrap_or_else(|_| DEFAULT_FILTERS_FILE.to_string());
    match FilterRegistry::from_json_file(&path) {
        Ok(registry) => {
            info!("从 {} 加载了 {} 个过滤器", path, registry.get_filters().len());
            registry
        }
        Err(e) => {
            warn!("无法加载过滤器配置 {} ({}), 使用内置过滤器", path, e);
            FilterRegistry::default()
        }
    }
}

/// 提示符和补全共享的编辑器状态
struct QueryHelper {
    registry: FilterRegistry,
    grammar: PredicateGrammar,
    pattern_type: PatternType,
    interpret_comments: bool,
    json: bool,
    /// 最近输入的查询，供 `:hover` 使用
    last_query: String,
}

impl QueryHelper {
    fn tokens(&self, query: &str) -> Option<Vec<Token>> {
        scan(query, self.interpret_comments, self.pattern_type).ok()
    }
}

fn byte_offset(line: &str, chars: usize) -> usize {
    line.char_indices().nth(chars).map_or(line.len(), |(i, _)| i)
}

impl Completer for QueryHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with(':') {
            return Ok((pos, Vec::new()));
        }
        let Some(tokens) = self.tokens(line) else {
            return Ok((pos, Vec::new()));
        };
        let offset = line[..pos].chars().count();
        let items = completions(
            &tokens,
            offset,
            self.registry.get_filters(),
            &self.registry,
            &self.grammar,
        );
        let start = items.first().map_or(pos, |c| byte_offset(line, c.range.start));
        let pairs = items
            .into_iter()
            .map(|c| Pair {
                display: c.label,
                replacement: c.insert_text,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for QueryHelper {
    type Hint = String;
}

impl Highlighter for QueryHelper {}

impl Validator for QueryHelper {}

impl Helper for QueryHelper {}

enum Command {
    Quit,
    Handled,
    Query,
}

fn run_command(helper: &mut QueryHelper, line: &str) -> Command {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some(":quit"), _) | (Some(":q"), _) => return Command::Quit,
        (Some(":type"), Some(name)) => match name.parse::<PatternType>() {
            Ok(pattern_type) => {
                helper.pattern_type = pattern_type;
                println!("✅ 模式类型: {}", pattern_type);
            }
            Err(e) => println!("✗ {}", e),
        },
        (Some(":comments"), Some(flag)) => match flag {
            "on" => helper.interpret_comments = true,
            "off" => helper.interpret_comments = false,
            _ => println!("✗ 期望 on 或 off"),
        },
        (Some(":json"), _) => {
            helper.json = !helper.json;
            println!("✅ JSON输出: {}", if helper.json { "on" } else { "off" });
        }
        (Some(":hover"), Some(offset)) => match offset.parse::<usize>() {
            Ok(offset) => print_hover(helper, offset),
            Err(e) => println!("✗ 无效的位置: {}", e),
        },
        (Some(command), _) if command.starts_with(':') => {
            println!("命令: :type <literal|regexp|structural>, :comments <on|off>, :json, :hover <offset>, :quit");
        }
        _ => return Command::Query,
    }
    Command::Handled
}

fn print_hover(helper: &QueryHelper, offset: usize) {
    let Some(tokens) = helper.tokens(&helper.last_query) else {
        println!("✗ 没有可以悬停的查询");
        return;
    };
    match hover(&tokens, offset, &helper.registry, &helper.grammar) {
        Some(hover) => println!("[{}..{}] {}", hover.range.start, hover.range.end, hover.contents),
        None => println!("位置 {} 没有可显示的内容", offset),
    }
}

fn print_json<T: serde::Serialize>(label: &str, value: &T) -> Result<()> {
    println!("{}: {}", label, serde_json::to_string_pretty(value)?);
    Ok(())
}

fn process_query(helper: &QueryHelper, query: &str) -> Result<()> {
    let tokens = match scan(query, helper.interpret_comments, helper.pattern_type) {
        Ok(tokens) => tokens,
        Err(e) => {
            println!("✗ 词法分析失败: {}", e);
            println!("  {}", query);
            println!("  {}^", " ".repeat(e.at));
            return Ok(());
        }
    };

    let markers = get_diagnostics(&tokens, helper.pattern_type, &helper.registry, &helper.grammar);
    if helper.json {
        print_json("tokens", &tokens)?;
        print_json("diagnostics", &markers)?;
    } else {
        println!("[步骤 1] tokens:");
        for token in tokens.iter().filter(|t| !t.is_whitespace()) {
            println!("  {:>3}..{:<3} {:?}", token.range.start, token.range.end, token.kind);
        }
        for marker in &markers {
            println!(
                "  {:?} {}..{}: {}",
                marker.severity, marker.range.start, marker.range.end, marker.message
            );
        }
    }

    let nodes: Vec<Node> = match parse(&tokens) {
        Ok(nodes) => nodes,
        Err(e) => {
            println!("✗ 语法分析失败: {}", e);
            return Ok(());
        }
    };

    if helper.json {
        print_json("tree", &nodes)?;
    } else {
        println!("[步骤 2] 语法树, 共 {} 个节点:", count_nodes(&nodes));
        println!("{:#?}", nodes);
    }
    println!("[步骤 3] 规范化查询: {}", to_query_string(&nodes));

    let parameters = collect_parameters(&nodes);
    if !parameters.is_empty() {
        println!("[过滤器]:");
        for parameter in parameters {
            let sign = if parameter.negated { "-" } else { "" };
            println!("  {}{} = {}", sign, parameter.field, parameter.value);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("--- 搜索查询: 词法分析 / 语法分析 / 诊断 ---");
    println!("输入查询，或输入 :quit 退出");

    let helper = QueryHelper {
        registry: load_registry(),
        grammar: PredicateGrammar::default(),
        pattern_type: PatternType::Literal,
        interpret_comments: false,
        json: false,
        last_query: String::new(),
    };
    let mut editor: Editor<QueryHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(helper));

    loop {
        match editor.readline("query> ") {
            Ok(line) => {
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                let Some(helper) = editor.helper_mut() else {
                    break;
                };
                match run_command(helper, line) {
                    Command::Quit => break,
                    Command::Handled => {}
                    Command::Query => {
                        helper.last_query = line.to_string();
                        process_query(helper, line)?;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
