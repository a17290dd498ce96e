/// McCabe cyclomatic complexity plus a per-line decision-point counter.
///
/// Every construct that adds a decision path bumps both the method total
/// and the counter of the line it starts on; the line counters feed the
/// heatmap's line-level complexity penalty.
use std::collections::BTreeMap;

use tree_sitter::Node;

use crate::analysis::ast::kinds::kinds;
use crate::analysis::ast::{collect_methods, line_of, node_text};

/// Complexity facts for one compilation unit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ComplexityFacts {
    /// Cyclomatic complexity keyed by method name.
    pub method_complexity: BTreeMap<String, u32>,
    /// Decision points per source line (absent line means zero).
    pub line_decision_points: BTreeMap<usize, u32>,
}

impl ComplexityFacts {
    pub fn decision_points(&self, line: usize) -> u32 {
        self.line_decision_points.get(&line).copied().unwrap_or(0)
    }
}

/// Compute complexity facts for every method and constructor under `root`.
pub fn analyze_complexity(root: Node, source: &str) -> ComplexityFacts {
    let mut facts = ComplexityFacts::default();
    for method in collect_methods(root) {
        let name = method
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_default();
        let complexity = method_complexity(method, source, &mut facts.line_decision_points);
        facts.method_complexity.insert(name, complexity);
    }
    facts
}

/// Cyclomatic complexity of a single method body, base 1. Each increment
/// also records a decision point on the construct's starting line.
pub fn method_complexity(
    method: Node,
    source: &str,
    line_hits: &mut BTreeMap<usize, u32>,
) -> u32 {
    let k = kinds();
    let mut complexity: u32 = 1;
    let body = match method.child_by_field_name("body") {
        Some(body) => body,
        None => return complexity,
    };

    let mut bump = |line: usize| {
        *line_hits.entry(line).or_insert(0) += 1;
    };

    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        for i in (0..node.child_count()).rev() {
            if let Some(ch) = node.child(i) {
                stack.push(ch);
            }
        }

        let kind_id = node.kind_id();
        let is_decision = kind_id == k.if_statement
            || kind_id == k.for_statement
            || kind_id == k.enhanced_for_statement
            || kind_id == k.while_statement
            || kind_id == k.do_statement
            || kind_id == k.catch_clause
            || kind_id == k.ternary_expression;

        if is_decision {
            complexity += 1;
            bump(line_of(node));
        } else if kind_id == k.binary_expression {
            let operator = node
                .child_by_field_name("operator")
                .map(|op| node_text(op, source))
                .unwrap_or("");
            if operator == "&&" || operator == "||" {
                complexity += 1;
                bump(line_of(node));
            }
        } else if kind_id == k.switch_label {
            // one path per case label; the switch itself adds nothing
            if node_text(node, source).starts_with("case") {
                complexity += 1;
                bump(line_of(node));
            }
        }
    }

    complexity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ast::parse_java;

    fn complexity_of(source: &str) -> (u32, BTreeMap<usize, u32>) {
        let tree = parse_java(source).expect("test source should parse");
        let methods = collect_methods(tree.root_node());
        let mut lines = BTreeMap::new();
        let c = method_complexity(methods[0], source, &mut lines);
        (c, lines)
    }

    #[test]
    fn straight_line_method_is_base_one() {
        let (c, lines) = complexity_of("class A { int m() { return 1; } }");
        assert_eq!(c, 1);
        assert!(lines.is_empty());
    }

    #[test]
    fn if_else_inside_loop_is_exactly_three() {
        // base 1 + loop 1 + if 1; the else branch adds nothing
        let (c, _) = complexity_of(
            r#"class A { void m(int n) {
                for (int i = 0; i < n; i++) {
                    if (i % 2 == 0) { even(); } else { odd(); }
                }
            } }"#,
        );
        assert_eq!(c, 3);
    }

    #[test]
    fn short_circuit_operators_count() {
        let (c, _) = complexity_of(
            "class A { boolean m(int a, int b) { return a > 0 && b > 0 || a < -5; } }",
        );
        // base 1 + && + ||
        assert_eq!(c, 3);
    }

    #[test]
    fn switch_counts_one_per_case_label() {
        let (c, _) = complexity_of(
            r#"class A { int m(int x) {
                switch (x) {
                    case 1: return 1;
                    case 2: return 2;
                    default: return 0;
                }
            } }"#,
        );
        // base 1 + two case labels; default adds nothing
        assert_eq!(c, 3);
    }

    #[test]
    fn decision_points_land_on_their_own_lines() {
        let source = "class A { void m(int n) {\nif (n > 0) { n--; }\nwhile (n > 0) { n--; }\n} }";
        let (_, lines) = complexity_of(source);
        assert_eq!(lines.get(&2).copied(), Some(1));
        assert_eq!(lines.get(&3).copied(), Some(1));
    }

    #[test]
    fn catch_and_ternary_count() {
        let (c, _) = complexity_of(
            r#"class A { int m(int x) {
                try { return x > 0 ? 1 : 0; } catch (Exception e) { return -1; }
            } }"#,
        );
        // base 1 + ternary + catch
        assert_eq!(c, 3);
    }
}
