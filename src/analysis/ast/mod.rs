/// Java AST front-end: parsing, node-kind table, and the per-method fact
/// passes (scope tracking, complexity) the rule sets consume.
pub mod complexity;
pub mod error;
pub mod kinds;
pub mod parser;
pub mod scope;
pub mod structure;

use tree_sitter::Node;

// Re-export main types for convenience
pub use complexity::ComplexityFacts;
pub use error::AnalysisError;
pub use kinds::{kinds, JavaKinds};
pub use parser::parse_java;
pub use scope::ScopeFacts;
pub use structure::{ClassMetrics, ClassOutline, MethodMetrics};

/// UTF-8 text of a node, empty on the (unreachable for valid trees) error case.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-based source line a node starts on.
pub fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// 1-based source line a node ends on.
pub fn end_line_of(node: Node) -> usize {
    node.end_position().row + 1
}

/// Value of a string literal node with the surrounding quotes removed.
pub fn string_literal_value<'a>(node: Node, source: &'a str) -> &'a str {
    let text = node_text(node, source);
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

/// Short single-line snippet of a node for inclusion in findings.
pub fn snippet(node: Node, source: &str) -> String {
    let text = node_text(node, source);
    let first_line = text.lines().next().unwrap_or("").trim();
    crate::truncate_utf8_safe(first_line, 160)
}

/// Signature part of a method or constructor declaration (text up to the body).
pub fn declaration_snippet(method: Node, source: &str) -> String {
    let text = match method.child_by_field_name("body") {
        Some(body) => source
            .get(method.start_byte()..body.start_byte())
            .unwrap_or(""),
        None => node_text(method, source),
    };
    crate::truncate_utf8_safe(text.trim(), 160)
}

/// All method and constructor declarations under `root`, in document order.
pub fn collect_methods(root: Node) -> Vec<Node> {
    let k = kinds();
    let mut methods = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for i in (0..node.child_count()).rev() {
            if let Some(ch) = node.child(i) {
                stack.push(ch);
            }
        }
        if k.is_method_like(&node) {
            methods.push(node);
        }
    }
    methods
}
