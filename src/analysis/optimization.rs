/// Optimization rule set: an ordered table of independent detectors over
/// declarations, loops, conditionals, binary expressions, and object
/// creation. Each rule sees one node plus the per-method facts and may
/// emit any number of findings; rules never abort each other.
use std::collections::{BTreeMap, HashSet};

use tree_sitter::Node;

use crate::analysis::ast::complexity::method_complexity;
use crate::analysis::ast::kinds::kinds;
use crate::analysis::ast::scope::{
    collect_field_names, collect_scope_facts, is_conventionally_unused, is_loop_control_variable,
    is_loop_scoped, is_textually_used, ScopeFacts,
};
use crate::analysis::ast::{
    collect_methods, declaration_snippet, line_of, node_text, snippet,
};
use crate::analysis::findings::{OptimizationFinding, OptimizationKind, Severity};

/// Per-method context handed to every rule.
pub struct MethodContext<'a> {
    pub source: &'a str,
    pub method: Node<'a>,
    pub scope: &'a ScopeFacts,
    pub field_names: &'a HashSet<String>,
    pub cyclomatic: u32,
}

pub trait OptimizationRule: Send + Sync {
    fn rule_id(&self) -> &'static str;
    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding>;
}

/// Runs the rule table over every method of a compilation unit.
pub struct OptimizationAnalyzer {
    rules: Vec<Box<dyn OptimizationRule>>,
}

impl Default for OptimizationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationAnalyzer {
    pub fn new() -> Self {
        // Ordered registration keeps finding order deterministic.
        let rules: Vec<Box<dyn OptimizationRule>> = vec![
            Box::new(UnusedVariableRule),
            Box::new(UninitializedVariableRule),
            Box::new(StringConcatenationInLoopRule),
            Box::new(LoopInvariantCalculationRule),
            Box::new(UnnecessaryObjectCreationRule),
            Box::new(WrapperObjectCreationRule),
            Box::new(DivisionByPowerOfTwoRule),
            Box::new(InefficientLoopBoundRule),
            Box::new(InfiniteLoopRule),
            Box::new(RedundantConditionRule),
            Box::new(MethodShapeRule),
            Box::new(CyclomaticComplexityRule),
        ];
        Self { rules }
    }

    pub fn analyze(&self, root: Node, source: &str) -> Vec<OptimizationFinding> {
        let field_names = collect_field_names(root, source);
        let mut findings = Vec::new();

        for method in collect_methods(root) {
            let scope = collect_scope_facts(method, source);
            let mut line_hits = BTreeMap::new();
            let cyclomatic = method_complexity(method, source, &mut line_hits);
            let ctx = MethodContext {
                source,
                method,
                scope: &scope,
                field_names: &field_names,
                cyclomatic,
            };

            if let Some(body) = method.child_by_field_name("body") {
                // Nested method bodies (anonymous classes) are their own unit;
                // rules must not fire twice for their nodes.
                let mut stack = vec![body];
                while let Some(node) = stack.pop() {
                    if node.id() != body.id() && kinds().is_method_like(&node) {
                        continue;
                    }
                    for i in (0..node.child_count()).rev() {
                        if let Some(ch) = node.child(i) {
                            stack.push(ch);
                        }
                    }
                    for rule in &self.rules {
                        findings.extend(rule.check(node, &ctx));
                    }
                }
            }
            // Method-level rules run after the body, as a reader of the
            // report expects local findings before the method verdict.
            for rule in &self.rules {
                findings.extend(rule.check(method, &ctx));
            }
            tracing::debug!(
                method = %scope.method_name,
                cyclomatic,
                findings = findings.len(),
                "optimization pass finished method"
            );
        }

        findings
    }
}

fn finding(
    kind: OptimizationKind,
    description: String,
    line: usize,
    snippet: String,
    severity: Severity,
) -> OptimizationFinding {
    OptimizationFinding {
        kind,
        description,
        line,
        snippet,
        severity,
    }
}

// ---------------------------------------------------------------------------
// Shared predicates

fn is_inside_loop(node: Node) -> bool {
    let k = kinds();
    let mut current = node.parent();
    while let Some(parent) = current {
        if k.is_loop(&parent) {
            return true;
        }
        if k.is_method_like(&parent) {
            return false;
        }
        current = parent.parent();
    }
    false
}

/// An enclosing call whose name contains "print" absorbs concatenation
/// findings; println-style output is not a hot loop body.
fn is_print_context(node: Node, source: &str) -> bool {
    let k = kinds();
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind_id() == k.method_invocation {
            if let Some(name) = parent.child_by_field_name("name") {
                if node_text(name, source).contains("print") {
                    return true;
                }
            }
        }
        if k.is_method_like(&parent) {
            return false;
        }
        current = parent.parent();
    }
    false
}

/// Log-style call context, judged textually on the enclosing expression
/// chain up to and including the owning statement.
fn is_logging_context(node: Node, source: &str) -> bool {
    let k = kinds();
    let mut current = node.parent();
    while let Some(parent) = current {
        let text = node_text(parent, source).to_lowercase();
        if text.contains("log")
            || text.contains("debug")
            || text.contains("info")
            || text.contains("error")
        {
            return true;
        }
        let pk = parent.kind_id();
        if pk == k.expression_statement || pk == k.local_variable_declaration || pk == k.block {
            break;
        }
        current = parent.parent();
    }
    false
}

/// String-typedness is judged locally: a `String` declaration in the same
/// body, or a name that conventionally holds text.
fn is_string_variable(name: &str, ctx: &MethodContext) -> bool {
    if ctx.scope.body_text.contains(&format!("String {name}")) {
        return true;
    }
    let lower = name.to_lowercase();
    lower.contains("string")
        || lower.contains("message")
        || lower.contains("text")
        || lower.contains("report")
        || lower.contains("output")
        || lower == "result"
}

fn has_string_operand(binary: Node, ctx: &MethodContext) -> bool {
    let k = kinds();
    for field in ["left", "right"] {
        if let Some(operand) = binary.child_by_field_name(field) {
            if operand.kind_id() == k.string_literal {
                return true;
            }
            if operand.kind_id() == k.identifier
                && is_string_variable(node_text(operand, ctx.source), ctx)
            {
                return true;
            }
        }
    }
    false
}

const PRIMITIVE_TYPES: [&str; 8] = [
    "int", "long", "double", "float", "boolean", "char", "byte", "short",
];

/// Integer literal text to value; underscores and l/L suffixes accepted.
/// Malformed text means "not a literal we understand", never an error.
fn parse_int_literal(text: &str) -> Option<i64> {
    let cleaned = text.trim().trim_end_matches(['l', 'L']).replace('_', "");
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()
    } else {
        cleaned.parse().ok()
    }
}

fn is_power_of_two(n: i64) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

fn contains_break(node: Node) -> bool {
    let k = kinds();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if n.kind_id() == k.break_statement {
            return true;
        }
        for i in (0..n.child_count()).rev() {
            if let Some(ch) = n.child(i) {
                stack.push(ch);
            }
        }
    }
    false
}

/// The inner expression of an `if`/`while` condition, unwrapping parens.
fn condition_inner(node: Node) -> Option<Node> {
    let k = kinds();
    let condition = node.child_by_field_name("condition")?;
    if condition.kind_id() == k.parenthesized_expression {
        condition.named_child(0)
    } else {
        Some(condition)
    }
}

// ---------------------------------------------------------------------------
// Rules

/// Declared locals that neither the structural scan nor the textual
/// fallback can find a use for.
struct UnusedVariableRule;

impl OptimizationRule for UnusedVariableRule {
    fn rule_id(&self) -> &'static str {
        "OPT_UNUSED_VARIABLE"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.variable_declarator {
            return Vec::new();
        }
        let parent_is_local = node
            .parent()
            .map(|p| p.kind_id() == k.local_variable_declaration)
            .unwrap_or(false);
        if !parent_is_local {
            return Vec::new();
        }
        let name = match node.child_by_field_name("name") {
            Some(n) => node_text(n, ctx.source).to_string(),
            None => return Vec::new(),
        };

        if is_conventionally_unused(&name)
            || ctx.field_names.contains(&name)
            || is_loop_control_variable(node, ctx.source)
            || ctx.scope.is_parameter(&name)
        {
            return Vec::new();
        }
        if ctx.scope.used_vars.contains(&name) || is_textually_used(&name, &ctx.scope.body_text) {
            return Vec::new();
        }

        vec![finding(
            OptimizationKind::UnusedVariable,
            format!("Local variable '{name}' is declared but never used"),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Low,
        )]
    }
}

/// Reference-typed locals declared without an initializer.
struct UninitializedVariableRule;

impl OptimizationRule for UninitializedVariableRule {
    fn rule_id(&self) -> &'static str {
        "OPT_UNINITIALIZED_VARIABLE"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.variable_declarator || node.child_by_field_name("value").is_some() {
            return Vec::new();
        }
        let parent = match node.parent() {
            Some(p) if p.kind_id() == k.local_variable_declaration => p,
            _ => return Vec::new(),
        };
        let var_type = parent
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        if PRIMITIVE_TYPES.contains(&var_type) {
            return Vec::new();
        }
        let name = match node.child_by_field_name("name") {
            Some(n) => node_text(n, ctx.source).to_string(),
            None => return Vec::new(),
        };
        // Loop scratch names conventionally start null and fill in a loop.
        if ctx.scope.is_parameter(&name)
            || is_loop_scoped(node)
            || matches!(name.as_str(), "line" | "data" | "input")
        {
            return Vec::new();
        }

        vec![finding(
            OptimizationKind::UninitializedVariable,
            format!("Variable '{name}' declared without initialization"),
            line_of(node),
            snippet(parent, ctx.source),
            Severity::Low,
        )]
    }
}

/// `x = x + y` / `x += y` on a string-typed target inside a loop body.
struct StringConcatenationInLoopRule;

impl OptimizationRule for StringConcatenationInLoopRule {
    fn rule_id(&self) -> &'static str {
        "OPT_STRING_CONCAT_IN_LOOP"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.assignment_expression || !is_inside_loop(node) {
            return Vec::new();
        }
        let (left, right) = match (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) {
            (Some(l), Some(r)) => (l, r),
            _ => return Vec::new(),
        };
        if left.kind_id() != k.identifier {
            return Vec::new();
        }
        let target = node_text(left, ctx.source);
        let operator = node
            .child_by_field_name("operator")
            .map(|op| node_text(op, ctx.source))
            .unwrap_or("");

        let is_concat = match operator {
            "+=" => is_string_variable(target, ctx) || right.kind_id() == k.string_literal,
            "=" => {
                right.kind_id() == k.binary_expression
                    && right
                        .child_by_field_name("operator")
                        .map(|op| node_text(op, ctx.source) == "+")
                        .unwrap_or(false)
                    && right
                        .child_by_field_name("left")
                        .map(|bl| {
                            bl.kind_id() == k.identifier && node_text(bl, ctx.source) == target
                        })
                        .unwrap_or(false)
                    && (has_string_operand(right, ctx) || is_string_variable(target, ctx))
            }
            _ => false,
        };

        if !is_concat || is_print_context(node, ctx.source) || is_logging_context(node, ctx.source)
        {
            return Vec::new();
        }

        vec![finding(
            OptimizationKind::StringConcatenationInLoop,
            "String concatenation inside loop may impact performance".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::High,
        )]
    }
}

const EXPENSIVE_MATH_CALLS: [&str; 6] = ["pow", "sqrt", "sin", "cos", "log", "exp"];

/// Known-expensive Math calls repeated inside a while body.
struct LoopInvariantCalculationRule;

impl OptimizationRule for LoopInvariantCalculationRule {
    fn rule_id(&self) -> &'static str {
        "OPT_LOOP_INVARIANT"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.while_statement {
            return Vec::new();
        }
        let body = match node.child_by_field_name("body") {
            Some(b) => b,
            None => return Vec::new(),
        };

        let mut findings = Vec::new();
        let mut stack = vec![body];
        while let Some(n) = stack.pop() {
            for i in (0..n.child_count()).rev() {
                if let Some(ch) = n.child(i) {
                    stack.push(ch);
                }
            }
            if n.kind_id() != k.method_invocation {
                continue;
            }
            let name = n
                .child_by_field_name("name")
                .map(|x| node_text(x, ctx.source))
                .unwrap_or("");
            let receiver = n
                .child_by_field_name("object")
                .filter(|o| o.kind_id() == k.identifier)
                .map(|o| node_text(o, ctx.source));
            if receiver == Some("Math") && EXPENSIVE_MATH_CALLS.contains(&name) {
                findings.push(finding(
                    OptimizationKind::LoopInvariantCalculation,
                    format!("Expensive calculation inside loop: {name}"),
                    line_of(n),
                    snippet(n, ctx.source),
                    Severity::Medium,
                ));
            }
        }
        findings
    }
}

/// `new String()` with no arguments.
struct UnnecessaryObjectCreationRule;

impl OptimizationRule for UnnecessaryObjectCreationRule {
    fn rule_id(&self) -> &'static str {
        "OPT_UNNECESSARY_OBJECT"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.object_creation_expression {
            return Vec::new();
        }
        let type_name = node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        let arg_count = node
            .child_by_field_name("arguments")
            .map(|a| a.named_child_count())
            .unwrap_or(0);
        if type_name != "String" || arg_count != 0 {
            return Vec::new();
        }
        vec![finding(
            OptimizationKind::UnnecessaryObjectCreation,
            "Unnecessary String object creation".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Low,
        )]
    }
}

/// `new Integer(x)`-style boxing outside a call argument position.
struct WrapperObjectCreationRule;

impl OptimizationRule for WrapperObjectCreationRule {
    fn rule_id(&self) -> &'static str {
        "OPT_WRAPPER_OBJECT"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.object_creation_expression {
            return Vec::new();
        }
        let type_name = node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        if !matches!(type_name, "Boolean" | "Integer" | "Long") {
            return Vec::new();
        }
        let arg_count = node
            .child_by_field_name("arguments")
            .map(|a| a.named_child_count())
            .unwrap_or(0);
        if arg_count != 1 {
            return Vec::new();
        }
        // As a call argument or receiver the wrapper may be intentional.
        if let Some(parent) = node.parent() {
            if parent.kind_id() == k.method_invocation {
                return Vec::new();
            }
            if parent.kind_id() == k.argument_list
                && parent
                    .parent()
                    .map(|gp| gp.kind_id() == k.method_invocation)
                    .unwrap_or(false)
            {
                return Vec::new();
            }
        }
        vec![finding(
            OptimizationKind::WrapperObjectCreation,
            "Consider using valueOf() method for wrapper objects".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Low,
        )]
    }
}

/// Integer division by a literal power of two.
struct DivisionByPowerOfTwoRule;

impl OptimizationRule for DivisionByPowerOfTwoRule {
    fn rule_id(&self) -> &'static str {
        "OPT_DIVISION_POWER_OF_TWO"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.binary_expression {
            return Vec::new();
        }
        let operator = node
            .child_by_field_name("operator")
            .map(|op| node_text(op, ctx.source))
            .unwrap_or("");
        if operator != "/" {
            return Vec::new();
        }
        let right = match node.child_by_field_name("right") {
            Some(r) if r.kind().ends_with("integer_literal") => r,
            _ => return Vec::new(),
        };
        let divisor = match parse_int_literal(node_text(right, ctx.source)) {
            Some(v) => v,
            None => return Vec::new(), // malformed literal: rule does not fire
        };
        if divisor <= 1 || !is_power_of_two(divisor) {
            return Vec::new();
        }
        vec![finding(
            OptimizationKind::DivisionOptimization,
            "Division by power of 2 can be optimized".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Low,
        )]
    }
}

/// `for (...; i < x.size(); ...)` re-evaluating a non-trivial bound call.
struct InefficientLoopBoundRule;

impl OptimizationRule for InefficientLoopBoundRule {
    fn rule_id(&self) -> &'static str {
        "OPT_INEFFICIENT_LOOP_BOUND"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.for_statement {
            return Vec::new();
        }
        let condition = match node.child_by_field_name("condition") {
            Some(c) if c.kind_id() == k.binary_expression => c,
            _ => return Vec::new(),
        };
        let bound = match condition.child_by_field_name("right") {
            Some(r) if r.kind_id() == k.method_invocation => r,
            _ => return Vec::new(),
        };
        let name = bound
            .child_by_field_name("name")
            .map(|n| node_text(n, ctx.source))
            .unwrap_or("");
        if name != "size" && name != "length" {
            return Vec::new();
        }
        // A plain `list.size()` is cheap; flag bounds like `load().size()`.
        let simple_receiver = bound
            .child_by_field_name("object")
            .map(|o| o.kind_id() == k.identifier)
            .unwrap_or(false);
        if simple_receiver {
            return Vec::new();
        }
        vec![finding(
            OptimizationKind::InefficientLoop,
            format!("Method call '{name}()' in loop condition may be inefficient"),
            line_of(node),
            snippet(condition, ctx.source),
            Severity::Medium,
        )]
    }
}

/// `while (true)` whose body contains no break anywhere.
struct InfiniteLoopRule;

impl OptimizationRule for InfiniteLoopRule {
    fn rule_id(&self) -> &'static str {
        "OPT_INFINITE_LOOP"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.while_statement {
            return Vec::new();
        }
        let literal_true = condition_inner(node)
            .map(|inner| inner.kind() == "true")
            .unwrap_or(false);
        if !literal_true {
            return Vec::new();
        }
        if let Some(body) = node.child_by_field_name("body") {
            if contains_break(body) {
                return Vec::new();
            }
        }
        vec![finding(
            OptimizationKind::InfiniteLoop,
            "Potential infinite loop detected - no break statement found".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::High,
        )]
    }
}

/// `if` with a literal boolean condition.
struct RedundantConditionRule;

impl OptimizationRule for RedundantConditionRule {
    fn rule_id(&self) -> &'static str {
        "OPT_REDUNDANT_CONDITION"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if node.kind_id() != k.if_statement {
            return Vec::new();
        }
        let literal = condition_inner(node)
            .map(|inner| inner.kind() == "true" || inner.kind() == "false")
            .unwrap_or(false);
        if !literal {
            return Vec::new();
        }
        vec![finding(
            OptimizationKind::RedundantCondition,
            "If statement with constant boolean condition".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Low,
        )]
    }
}

/// Method-shape checks: empty bodies and oversized parameter lists.
struct MethodShapeRule;

impl OptimizationRule for MethodShapeRule {
    fn rule_id(&self) -> &'static str {
        "OPT_METHOD_SHAPE"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if !k.is_method_like(&node) || node.id() != ctx.method.id() {
            return Vec::new();
        }
        let mut findings = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            if body.named_child_count() == 0 {
                findings.push(finding(
                    OptimizationKind::EmptyMethod,
                    "Method has empty body".to_string(),
                    line_of(node),
                    declaration_snippet(node, ctx.source),
                    Severity::Low,
                ));
            }
            let params = crate::analysis::ast::structure::parameter_count(node);
            if params > 7 {
                findings.push(finding(
                    OptimizationKind::TooManyParameters,
                    format!("Method has too many parameters ({params})"),
                    line_of(node),
                    declaration_snippet(node, ctx.source),
                    Severity::Medium,
                ));
            }
        }
        findings
    }
}

/// Methods whose decision structure exceeds the complexity threshold.
struct CyclomaticComplexityRule;

impl OptimizationRule for CyclomaticComplexityRule {
    fn rule_id(&self) -> &'static str {
        "OPT_CYCLOMATIC_COMPLEXITY"
    }

    fn check(&self, node: Node, ctx: &MethodContext) -> Vec<OptimizationFinding> {
        let k = kinds();
        if !k.is_method_like(&node) || node.id() != ctx.method.id() {
            return Vec::new();
        }
        if ctx.cyclomatic <= 10 {
            return Vec::new();
        }
        let severity = if ctx.cyclomatic > 20 {
            Severity::High
        } else {
            Severity::Medium
        };
        vec![finding(
            OptimizationKind::HighCyclomaticComplexity,
            format!(
                "Method '{}' has high cyclomatic complexity: {}",
                ctx.scope.method_name, ctx.cyclomatic
            ),
            line_of(node),
            declaration_snippet(node, ctx.source),
            severity,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_check_matches_bit_trick() {
        assert!(is_power_of_two(2));
        assert!(is_power_of_two(1024));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(3));
        assert!(!is_power_of_two(-8));
    }

    #[test]
    fn int_literal_parsing_accepts_java_forms() {
        assert_eq!(parse_int_literal("8"), Some(8));
        assert_eq!(parse_int_literal("1_024"), Some(1024));
        assert_eq!(parse_int_literal("0x10"), Some(16));
        assert_eq!(parse_int_literal("64L"), Some(64));
        assert_eq!(parse_int_literal("not-a-number"), None);
    }
}
