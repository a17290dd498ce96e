/// Scope tracking: one walk over a method body that records which
/// identifiers are declared, used, assigned, null-checked, caught, or
/// loop-bound. Every detector rule queries these facts instead of
/// re-walking the tree.
use std::collections::HashSet;

use regex::Regex;
use tree_sitter::Node;

use crate::analysis::ast::kinds::kinds;
use crate::analysis::ast::node_text;

/// Identifier-usage facts for a single method body.
///
/// Rebuilt from scratch on every method visit and discarded afterwards;
/// nothing here survives across methods.
#[derive(Debug, Default, Clone)]
pub struct ScopeFacts {
    pub method_name: String,
    pub declared_vars: HashSet<String>,
    pub used_vars: HashSet<String>,
    pub assigned_vars: HashSet<String>,
    pub null_checked_vars: HashSet<String>,
    pub initialized_vars: HashSet<String>,
    pub exception_vars: HashSet<String>,
    pub enhanced_for_vars: HashSet<String>,
    pub parameter_names: HashSet<String>,
    /// Rendered body text, kept for the textual heuristics below.
    pub body_text: String,
}

impl ScopeFacts {
    pub fn is_parameter(&self, name: &str) -> bool {
        self.parameter_names.contains(name)
    }

    pub fn is_null_checked(&self, name: &str) -> bool {
        self.null_checked_vars.contains(name)
    }
}

/// Build the scope facts for one method or constructor declaration.
pub fn collect_scope_facts(method: Node, source: &str) -> ScopeFacts {
    let k = kinds();
    let mut facts = ScopeFacts {
        method_name: method
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_default(),
        ..ScopeFacts::default()
    };

    if let Some(params) = method.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind_id() == k.formal_parameter {
                if let Some(name) = param.child_by_field_name("name") {
                    facts.parameter_names.insert(node_text(name, source).to_string());
                }
            } else if param.kind_id() == k.spread_parameter {
                // varargs carry their name on a nested declarator
                let mut inner = param.walk();
                for child in param.named_children(&mut inner) {
                    if child.kind_id() == k.variable_declarator {
                        if let Some(name) = child.child_by_field_name("name") {
                            facts.parameter_names.insert(node_text(name, source).to_string());
                        }
                    }
                }
            }
        }
    }

    let body = match method.child_by_field_name("body") {
        Some(body) => body,
        None => return facts, // abstract or interface method
    };
    facts.body_text = node_text(body, source).to_string();

    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        for i in (0..node.child_count()).rev() {
            if let Some(ch) = node.child(i) {
                stack.push(ch);
            }
        }

        let kind_id = node.kind_id();
        if kind_id == k.identifier {
            if is_use_position(node, source) {
                facts.used_vars.insert(node_text(node, source).to_string());
            }
        } else if kind_id == k.local_variable_declaration {
            let mut cursor = node.walk();
            for decl in node.children_by_field_name("declarator", &mut cursor) {
                if let Some(name) = decl.child_by_field_name("name") {
                    let name = node_text(name, source).to_string();
                    if decl.child_by_field_name("value").is_some() {
                        facts.initialized_vars.insert(name.clone());
                    }
                    facts.declared_vars.insert(name);
                }
            }
        } else if kind_id == k.assignment_expression {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind_id() == k.identifier {
                    let name = node_text(left, source).to_string();
                    facts.used_vars.insert(name.clone());
                    facts.assigned_vars.insert(name.clone());
                    facts.initialized_vars.insert(name);
                } else if left.kind_id() == k.field_access {
                    // this.x = ... counts as a use (and write) of field x
                    if let (Some(object), Some(field)) = (
                        left.child_by_field_name("object"),
                        left.child_by_field_name("field"),
                    ) {
                        if object.kind_id() == k.this_expr {
                            let name = node_text(field, source).to_string();
                            facts.used_vars.insert(name.clone());
                            facts.assigned_vars.insert(name);
                        }
                    }
                }
            }
        } else if kind_id == k.update_expression {
            if let Some(operand) = node.named_child(0) {
                if operand.kind_id() == k.identifier {
                    let name = node_text(operand, source).to_string();
                    facts.used_vars.insert(name.clone());
                    facts.assigned_vars.insert(name);
                }
            }
        } else if kind_id == k.binary_expression {
            collect_null_check(node, source, &mut facts.null_checked_vars);
        } else if kind_id == k.method_invocation {
            collect_non_null_assertion(node, source, &mut facts.null_checked_vars);
        } else if kind_id == k.catch_formal_parameter {
            if let Some(name) = node.child_by_field_name("name") {
                facts.exception_vars.insert(node_text(name, source).to_string());
            }
        } else if kind_id == k.enhanced_for_statement {
            if let Some(name) = node.child_by_field_name("name") {
                facts.enhanced_for_vars.insert(node_text(name, source).to_string());
            }
        }
    }

    facts
}

/// Whether an identifier node sits in an expression position that reads a
/// variable, as opposed to introducing a name (declarations, method names,
/// plain field selectors).
fn is_use_position(node: Node, _source: &str) -> bool {
    let k = kinds();
    let parent = match node.parent() {
        Some(p) => p,
        None => return true,
    };
    let same = |field: &str| {
        parent
            .child_by_field_name(field)
            .map(|n| n.id() == node.id())
            .unwrap_or(false)
    };

    let pk = parent.kind_id();
    if pk == k.variable_declarator && same("name") {
        return false;
    }
    if (pk == k.formal_parameter || pk == k.spread_parameter || pk == k.catch_formal_parameter)
        && same("name")
    {
        return false;
    }
    if (pk == k.method_declaration || pk == k.constructor_declaration) && same("name") {
        return false;
    }
    if pk == k.enhanced_for_statement && same("name") {
        return false;
    }
    if pk == k.method_invocation && same("name") {
        return false;
    }
    if pk == k.field_access && same("field") {
        // x.y reads x, not y; this.y does read field y
        return parent
            .child_by_field_name("object")
            .map(|obj| obj.kind_id() == k.this_expr)
            .unwrap_or(false);
    }
    if pk == k.break_statement || parent.kind() == "continue_statement" || parent.kind() == "labeled_statement" {
        return false;
    }
    true
}

fn collect_null_check(node: Node, source: &str, out: &mut HashSet<String>) {
    let k = kinds();
    let operator = node
        .child_by_field_name("operator")
        .map(|op| node_text(op, source))
        .unwrap_or("");
    if operator != "!=" {
        return;
    }
    let (left, right) = match (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) {
        (Some(l), Some(r)) => (l, r),
        _ => return,
    };
    if right.kind_id() == k.null_literal && left.kind_id() == k.identifier {
        out.insert(node_text(left, source).to_string());
    }
    if left.kind_id() == k.null_literal && right.kind_id() == k.identifier {
        out.insert(node_text(right, source).to_string());
    }
}

/// Objects.nonNull(x) / Objects.requireNonNull(x) prove x non-null.
fn collect_non_null_assertion(node: Node, source: &str, out: &mut HashSet<String>) {
    let k = kinds();
    let receiver = node
        .child_by_field_name("object")
        .filter(|obj| obj.kind_id() == k.identifier)
        .map(|obj| node_text(obj, source));
    if receiver != Some("Objects") {
        return;
    }
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .unwrap_or("");
    if name != "nonNull" && name != "requireNonNull" {
        return;
    }
    if let Some(args) = node.child_by_field_name("arguments") {
        if let Some(first) = args.named_child(0) {
            if first.kind_id() == k.identifier {
                out.insert(node_text(first, source).to_string());
            }
        }
    }
}

// Structural use-collection can miss indirect references, so declaring a
// variable unused additionally requires that none of these rendered-text
// patterns match the method body.
const USAGE_PATTERN_TEMPLATES: [&str; 18] = [
    r"\.NAME\(",
    r"NAME\.",
    r"\(NAME\)",
    r"\(NAME,",
    r", NAME\)",
    r", NAME,",
    r"= NAME;",
    r"return NAME;",
    r"\+ NAME",
    r"NAME \+",
    r"\[NAME\]",
    r"NAME\[",
    r"if \(NAME",
    r"while \(NAME",
    r"NAME ==",
    r"NAME !=",
    r"== NAME",
    r"!= NAME",
];

/// Textual fallback for use detection. A pattern that fails to compile is
/// treated as not matching rather than aborting the scan.
pub fn is_textually_used(name: &str, body_text: &str) -> bool {
    let escaped = regex::escape(name);
    USAGE_PATTERN_TEMPLATES.iter().any(|template| {
        let pattern = template.replace("NAME", &escaped);
        match Regex::new(&pattern) {
            Ok(re) => re.is_match(body_text),
            Err(_) => false,
        }
    })
}

/// Conventionally ignorable names that are never reported as unused.
pub fn is_conventionally_unused(name: &str) -> bool {
    name.starts_with('_') || matches!(name, "args" | "e" | "ex" | "exception" | "ignored")
}

/// Whether a declarator drives a loop: declared in a for/for-each header or
/// body, or referenced by a while condition in counter fashion.
pub fn is_loop_control_variable(declarator: Node, source: &str) -> bool {
    let k = kinds();
    let name = declarator
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .unwrap_or("");
    let mut current = declarator.parent();
    while let Some(parent) = current {
        let pk = parent.kind_id();
        if pk == k.for_statement || pk == k.enhanced_for_statement {
            return true;
        }
        if pk == k.while_statement {
            let parent_text = node_text(parent, source);
            return (parent_text.contains(&format!("{name} ="))
                && parent_text.contains(&format!("{name}++")))
                || parent_text.contains(&format!("{name} <"))
                || parent_text.contains(&format!("{name} >"));
        }
        current = parent.parent();
    }
    false
}

/// Whether a declarator lives inside a for/for-each construct.
pub fn is_loop_scoped(declarator: Node) -> bool {
    let k = kinds();
    let mut current = declarator.parent();
    while let Some(parent) = current {
        let pk = parent.kind_id();
        if pk == k.for_statement || pk == k.enhanced_for_statement {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Class-level pass: every field name declared anywhere in the unit.
pub fn collect_field_names(root: Node, source: &str) -> HashSet<String> {
    let k = kinds();
    let mut names = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for i in (0..node.child_count()).rev() {
            if let Some(ch) = node.child(i) {
                stack.push(ch);
            }
        }
        if node.kind_id() == k.field_declaration {
            let mut cursor = node.walk();
            for decl in node.children_by_field_name("declarator", &mut cursor) {
                if let Some(name) = decl.child_by_field_name("name") {
                    names.insert(node_text(name, source).to_string());
                }
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ast::{collect_methods, parse_java};

    fn facts_for(source: &str) -> ScopeFacts {
        let tree = parse_java(source).expect("test source should parse");
        let methods = collect_methods(tree.root_node());
        assert!(!methods.is_empty(), "test source needs a method");
        collect_scope_facts(methods[0], source)
    }

    #[test]
    fn declaration_and_use_are_tracked() {
        let facts = facts_for(
            r#"class A { void m() { int count = 0; process(count); int orphan = 1; } }"#,
        );
        assert!(facts.declared_vars.contains("count"));
        assert!(facts.declared_vars.contains("orphan"));
        assert!(facts.used_vars.contains("count"));
        assert!(!facts.used_vars.contains("orphan"));
        assert!(facts.initialized_vars.contains("count"));
    }

    #[test]
    fn declarator_name_is_not_its_own_use() {
        let facts = facts_for("class A { void m() { int lonely = 3; } }");
        assert!(!facts.used_vars.contains("lonely"));
    }

    #[test]
    fn assignment_marks_target_used_and_assigned() {
        let facts = facts_for("class A { void m(int x) { int y; y = x; y++; } }");
        assert!(facts.assigned_vars.contains("y"));
        assert!(facts.used_vars.contains("y"));
        assert!(facts.used_vars.contains("x"));
    }

    #[test]
    fn null_checks_and_assertions_are_collected() {
        let facts = facts_for(
            r#"class A { void m(String a, String b, String c) {
                if (a != null) { a.length(); }
                if (null != b) { b.length(); }
                Objects.requireNonNull(c);
            } }"#,
        );
        assert!(facts.null_checked_vars.contains("a"));
        assert!(facts.null_checked_vars.contains("b"));
        assert!(facts.null_checked_vars.contains("c"));
    }

    #[test]
    fn catch_and_foreach_variables_are_separated() {
        let facts = facts_for(
            r#"class A { void m(int[] xs) {
                try { risky(); } catch (Exception boom) { }
                for (int item : xs) { use(item); }
            } }"#,
        );
        assert!(facts.exception_vars.contains("boom"));
        assert!(facts.enhanced_for_vars.contains("item"));
        assert!(!facts.declared_vars.contains("item"));
    }

    #[test]
    fn textual_fallback_finds_indirect_uses() {
        assert!(is_textually_used("buf", "return buf;"));
        assert!(is_textually_used("buf", "sink.write(buf)"));
        assert!(is_textually_used("buf", "if (buf != null) {}"));
        assert!(!is_textually_used("buf", "int other = 0;"));
    }

    #[test]
    fn conventional_names_are_exempt() {
        assert!(is_conventionally_unused("_scratch"));
        assert!(is_conventionally_unused("ignored"));
        assert!(!is_conventionally_unused("total"));
    }

    #[test]
    fn field_names_are_collected_once_per_class() {
        let source = "class A { private int hits; private String label; void m() {} }";
        let tree = parse_java(source).unwrap();
        let fields = collect_field_names(tree.root_node(), source);
        assert!(fields.contains("hits"));
        assert!(fields.contains("label"));
    }
}
