//! 语法树的先序遍历

use crate::ast::{Node, OperatorKind, Parameter, Pattern};
use crate::token::CharacterRange;

/// [`visit`] 调用的回调。所有方法默认什么都不做，
/// 实现者只需覆盖关心的节点类型
pub trait Visitor<'a> {
    fn visit_operator(&mut self, _operands: &'a [Node], _kind: OperatorKind, _range: CharacterRange) {}

    fn visit_parameter(&mut self, _parameter: &'a Parameter) {}

    fn visit_pattern(&mut self, _pattern: &'a Pattern) {}
}

/// 从左到右遍历 `nodes`，每个节点恰好调用一次回调；
/// 运算符先于其操作数被访问
pub fn visit<'a, V: Visitor<'a> + ?Sized>(nodes: &'a [Node], visitor: &mut V) {
    for node in nodes {
        match node {
            Node::Operator(operator) => {
                visitor.visit_operator(&operator.operands, operator.kind, operator.range);
                visit(&operator.operands, visitor);
            }
            Node::Parameter(parameter) => visitor.visit_parameter(parameter),
            Node::Pattern(pattern) => visitor.visit_pattern(pattern),
        }
    }
}

#[derive(Default)]
struct Collector<'a> {
    parameters: Vec<&'a Parameter>,
    patterns: Vec<&'a Pattern>,
}

impl<'a> Visitor<'a> for Collector<'a> {
    fn visit_parameter(&mut self, parameter: &'a Parameter) {
        self.parameters.push(parameter);
    }

    fn visit_pattern(&mut self, pattern: &'a Pattern) {
        self.patterns.push(pattern);
    }
}

/// 按查询顺序收集所有过滤器
pub fn collect_parameters(nodes: &[Node]) -> Vec<&Parameter> {
    let mut collector = Collector::default();
    visit(nodes, &mut collector);
    collector.parameters
}

/// 按查询顺序收集所有模式
pub fn collect_patterns(nodes: &[Node]) -> Vec<&Pattern> {
    let mut collector = Collector::default();
    visit(nodes, &mut collector);
    collector.patterns
}

#[derive(Default)]
struct Counter(usize);

impl<'a> Visitor<'a> for Counter {
    fn visit_operator(&mut self, _: &'a [Node], _: OperatorKind, _: CharacterRange) {
        self.0 += 1;
    }

    fn visit_parameter(&mut self, _: &'a Parameter) {
        self.0 += 1;
    }

    fn visit_pattern(&mut self, _: &'a Pattern) {
        self.0 += 1;
    }
}

/// 节点总数（包括运算符）
pub fn count_nodes(nodes: &[Node]) -> usize {
    let mut counter = Counter::default();
    visit(nodes, &mut counter);
    counter.0
}

/// 字段 `field` 上所有未取反过滤器的值，例如全部 `repo:` 的值
pub fn filter_values<'a>(nodes: &'a [Node], field: &str) -> Vec<&'a str> {
    collect_parameters(nodes)
        .into_iter()
        .filter(|p| !p.negated && p.field.eq_ignore_ascii_case(field))
        .map(|p| p.value.as_str())
        .collect()
}
