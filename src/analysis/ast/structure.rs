/// Class and method outline: the line ranges, parameter counts, and
/// member counts that scoring joins findings against.
use serde::Serialize;
use tree_sitter::Node;

use crate::analysis::ast::kinds::kinds;
use crate::analysis::ast::{end_line_of, line_of, node_text};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class_name: String,
    pub start_line: usize,
    pub method_count: usize,
    pub field_count: usize,
    pub method_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodMetrics {
    pub method_name: String,
    pub class_name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub parameter_count: usize,
}

impl MethodMetrics {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

/// Everything the scorer needs to know about the unit's shape.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ClassOutline {
    pub classes: Vec<ClassMetrics>,
    pub methods: Vec<MethodMetrics>,
}

impl ClassOutline {
    /// Name of the first (outermost) declared class, if any.
    pub fn primary_class_name(&self) -> Option<&str> {
        self.classes.first().map(|c| c.class_name.as_str())
    }
}

/// Walk the unit once and record class/method shape in document order.
pub fn collect_outline(root: Node, source: &str) -> ClassOutline {
    let mut outline = ClassOutline::default();
    visit(root, None, source, &mut outline);
    outline
}

pub fn parameter_count(method: Node) -> usize {
    let k = kinds();
    method
        .child_by_field_name("parameters")
        .map(|params| {
            let mut cursor = params.walk();
            params
                .named_children(&mut cursor)
                .filter(|p| p.kind_id() == k.formal_parameter || p.kind_id() == k.spread_parameter)
                .count()
        })
        .unwrap_or(0)
}

fn visit(node: Node, current_class: Option<&str>, source: &str, outline: &mut ClassOutline) {
    let k = kinds();

    if k.is_type_declaration(&node) {
        let class_name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_default();

        let mut method_names = Vec::new();
        let mut method_count = 0;
        let mut field_count = 0;
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                if k.is_method_like(&member) {
                    method_count += 1;
                    if let Some(name) = member.child_by_field_name("name") {
                        method_names.push(node_text(name, source).to_string());
                    }
                } else if member.kind_id() == k.field_declaration {
                    field_count += 1;
                }
            }
        }
        outline.classes.push(ClassMetrics {
            class_name: class_name.clone(),
            start_line: line_of(node),
            method_count,
            field_count,
            method_names,
        });

        for i in 0..node.child_count() {
            if let Some(ch) = node.child(i) {
                visit(ch, Some(&class_name), source, outline);
            }
        }
        return;
    }

    if k.is_method_like(&node) {
        outline.methods.push(MethodMetrics {
            method_name: node
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string())
                .unwrap_or_default(),
            class_name: current_class.unwrap_or_default().to_string(),
            start_line: line_of(node),
            end_line: end_line_of(node),
            parameter_count: parameter_count(node),
        });
    }

    for i in 0..node.child_count() {
        if let Some(ch) = node.child(i) {
            visit(ch, current_class, source, outline);
        }
    }
}
