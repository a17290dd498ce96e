/// Security rule set: an ordered table of detectors over method calls,
/// object creation, literals, casts, array accesses, and try/catch blocks.
///
/// Rules are heuristic and local to one class; they share only the set of
/// lines already flagged, which the null-dereference rule consults to
/// avoid double-reporting a statement.
use std::collections::HashSet;

use regex::Regex;
use tree_sitter::Node;

use crate::analysis::ast::kinds::kinds;
use crate::analysis::ast::scope::{collect_field_names, collect_scope_facts, ScopeFacts};
use crate::analysis::ast::{line_of, node_text, snippet, string_literal_value};
use crate::analysis::findings::{SecurityFinding, SecurityKind, Severity};

const SQL_METHODS: [&str; 3] = ["executeQuery", "executeUpdate", "execute"];

const FILE_OPERATION_TYPES: [&str; 5] = [
    "File",
    "FileInputStream",
    "FileOutputStream",
    "FileReader",
    "FileWriter",
];

const CREDENTIAL_NAME_TOKENS: [&str; 9] = [
    "password",
    "secret",
    "key",
    "token",
    "user",
    "credential",
    "auth",
    "api_key",
    "access_key",
];

/// Context shared by all rules at one point of the walk.
pub struct SecurityContext<'a> {
    pub source: &'a str,
    pub field_names: &'a HashSet<String>,
    /// Facts of the innermost enclosing method, when inside one.
    pub scope: Option<&'a ScopeFacts>,
}

impl<'a> SecurityContext<'a> {
    fn method_name(&self) -> &str {
        self.scope.map(|s| s.method_name.as_str()).unwrap_or("")
    }

    fn body_text(&self) -> &str {
        self.scope.map(|s| s.body_text.as_str()).unwrap_or("")
    }

    /// Inside `main` or a test-named method, dangerous-call findings are
    /// expected noise and suppressed.
    fn in_test_method(&self) -> bool {
        let name = self.method_name().to_lowercase();
        !name.is_empty() && (name.contains("test") || name == "main")
    }
}

/// Mutable scan state threaded through the walk.
#[derive(Debug, Default)]
pub struct ScanState {
    /// Lines that already carry a security finding (or an examined SQL
    /// call site); used to suppress duplicate null-dereference reports.
    pub flagged_lines: HashSet<usize>,
}

pub trait SecurityRule: Send + Sync {
    fn rule_id(&self) -> &'static str;
    fn check(&self, node: Node, ctx: &SecurityContext, state: &mut ScanState)
        -> Vec<SecurityFinding>;
}

pub struct SecurityAnalyzer {
    rules: Vec<Box<dyn SecurityRule>>,
}

impl Default for SecurityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityAnalyzer {
    pub fn new() -> Self {
        // Ordered registration; the null-dereference rule must run after
        // the injection rules so their flagged lines are visible to it.
        let rules: Vec<Box<dyn SecurityRule>> = vec![
            Box::new(CredentialFieldRule),
            Box::new(CredentialLiteralRule),
            Box::new(CommandInjectionRule),
            Box::new(SqlInjectionRule),
            Box::new(NullDereferenceRule),
            Box::new(WeakRandomRule),
            Box::new(PathTraversalRule),
            Box::new(SensitiveDataRule),
            Box::new(ArrayBoundsRule),
            Box::new(UnsafeCastRule),
            Box::new(CatchBlockRule),
        ];
        Self { rules }
    }

    pub fn analyze(&self, root: Node, source: &str) -> Vec<SecurityFinding> {
        let field_names = collect_field_names(root, source);
        let ctx = SecurityContext {
            source,
            field_names: &field_names,
            scope: None,
        };
        let mut state = ScanState::default();
        let mut findings = Vec::new();
        self.visit(root, &ctx, &mut state, &mut findings);
        tracing::debug!(findings = findings.len(), "security pass finished");
        findings
    }

    fn visit(
        &self,
        node: Node,
        ctx: &SecurityContext,
        state: &mut ScanState,
        out: &mut Vec<SecurityFinding>,
    ) {
        for rule in &self.rules {
            out.extend(rule.check(node, ctx, state));
        }

        if kinds().is_method_like(&node) {
            let facts = collect_scope_facts(node, ctx.source);
            let inner = SecurityContext {
                source: ctx.source,
                field_names: ctx.field_names,
                scope: Some(&facts),
            };
            for i in 0..node.child_count() {
                if let Some(ch) = node.child(i) {
                    self.visit(ch, &inner, state, out);
                }
            }
        } else {
            for i in 0..node.child_count() {
                if let Some(ch) = node.child(i) {
                    self.visit(ch, ctx, state, out);
                }
            }
        }
    }
}

fn finding(
    kind: SecurityKind,
    description: String,
    line: usize,
    snippet: String,
    severity: Severity,
) -> SecurityFinding {
    SecurityFinding {
        kind,
        description,
        line,
        snippet,
        severity,
    }
}

// ---------------------------------------------------------------------------
// Credential heuristics

fn is_credential_field_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    CREDENTIAL_NAME_TOKENS.iter().any(|t| lower.contains(t))
}

fn is_placeholder_value(value: &str) -> bool {
    let lower = value.to_lowercase();
    matches!(
        lower.as_str(),
        "password" | "secret" | "user" | "test" | "example" | "demo" | "default" | "changeme" | ""
    ) || lower.starts_with("todo")
        || lower.starts_with("placeholder")
        || lower.starts_with("your_")
        || lower.starts_with("enter_")
}

fn looks_like_password(value: &str) -> bool {
    if value.len() < 6 {
        return false;
    }
    let has_upper = value.chars().any(|c| c.is_uppercase());
    let has_lower = value.chars().any(|c| c.is_lowercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| "!@#$%^&*()_+-=[]{}|;:,.<>?".contains(c));
    let classes =
        has_upper as u32 + has_lower as u32 + has_digit as u32 + has_special as u32;
    classes >= 2
}

fn looks_like_api_key(value: &str) -> bool {
    if value.len() < 16 || value.len() > 128 {
        return false;
    }
    let keyish = value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .count();
    (keyish as f64) / (value.len() as f64) > 0.8
}

fn looks_like_token(value: &str) -> bool {
    (value.contains('.') && value.len() > 20)
        || (value.len() > 32 && value.chars().all(|c| c.is_alphanumeric()))
}

fn looks_like_credential(value: &str) -> bool {
    let lower = value.to_lowercase();
    if matches!(lower.as_str(), "admin" | "administrator" | "root" | "sa") {
        return true;
    }
    if value.len() < 3 {
        return false;
    }
    if looks_like_password(value) || looks_like_api_key(value) || looks_like_token(value) {
        return true;
    }
    lower.contains("admin") && value.len() < 20
}

/// Initializer read from environment, config, or a secure generator.
fn is_from_secure_source(initializer_text: &str) -> bool {
    initializer_text.contains("System.getProperty")
        || initializer_text.contains("System.getenv")
        || initializer_text.contains("SecureRandom")
        || initializer_text.contains("KeyGenerator")
        || initializer_text.contains("getPassword()")
}

/// Config-lookup context, judged on the enclosing expression chain up to
/// the owning statement.
fn in_config_context(node: Node, source: &str) -> bool {
    let k = kinds();
    let mut current = node.parent();
    while let Some(parent) = current {
        let text = node_text(parent, source);
        if text.contains("System.getProperty")
            || text.contains("System.getenv")
            || text.contains("config")
            || text.contains("properties")
        {
            return true;
        }
        let pk = parent.kind_id();
        if pk == k.expression_statement
            || pk == k.local_variable_declaration
            || pk == k.field_declaration
            || pk == k.block
        {
            break;
        }
        current = parent.parent();
    }
    false
}

// ---------------------------------------------------------------------------
// Expression predicates

/// `a + b` chains that mix in at least one variable or string literal.
fn contains_variable_concatenation(node: Node, source: &str) -> bool {
    let k = kinds();
    if node.kind_id() != k.binary_expression {
        return false;
    }
    let plus = node
        .child_by_field_name("operator")
        .map(|op| node_text(op, source) == "+")
        .unwrap_or(false);
    if !plus {
        return false;
    }
    let operand_hits = |field: &str| {
        node.child_by_field_name(field)
            .map(|n| {
                n.kind_id() == k.identifier
                    || n.kind_id() == k.string_literal
                    || contains_variable_concatenation(n, source)
            })
            .unwrap_or(false)
    };
    operand_hits("left") || operand_hits("right")
}

fn has_concatenation_argument(call: Node, source: &str) -> bool {
    let k = kinds();
    call.child_by_field_name("arguments")
        .map(|args| {
            let mut cursor = args.walk();
            let hit = args.named_children(&mut cursor).any(|arg| {
                arg.kind_id() == k.binary_expression
                    && arg
                        .child_by_field_name("operator")
                        .map(|op| node_text(op, source) == "+")
                        .unwrap_or(false)
                    && contains_variable_reference(arg)
            });
            hit
        })
        .unwrap_or(false)
}

fn contains_variable_reference(binary: Node) -> bool {
    let k = kinds();
    for field in ["left", "right"] {
        if let Some(operand) = binary.child_by_field_name(field) {
            if operand.kind_id() == k.identifier {
                return true;
            }
            if operand.kind_id() == k.binary_expression && contains_variable_reference(operand) {
                return true;
            }
        }
    }
    false
}

/// Parameter-like names that smell of unvalidated user input.
fn is_user_input(node: Node, ctx: &SecurityContext) -> bool {
    let k = kinds();
    if node.kind_id() != k.identifier {
        return false;
    }
    let name = node_text(node, ctx.source);
    let lower = name.to_lowercase();
    (lower.contains("input")
        || lower.contains("param")
        || lower.contains("request")
        || lower.contains("user"))
        && ctx.scope.map(|s| s.is_parameter(name)).unwrap_or(false)
}

fn receiver_text<'a>(call: Node, source: &'a str) -> &'a str {
    call.child_by_field_name("object")
        .map(|obj| node_text(obj, source))
        .unwrap_or("")
}

/// Receiver that already carries prepared/parameterized semantics.
fn is_prepared_statement_receiver(call: Node, source: &str) -> bool {
    let receiver = receiver_text(call, source).to_lowercase();
    receiver.contains("preparedstatement") || receiver.contains("statement")
}

// ---------------------------------------------------------------------------
// Rules

/// Credential-named fields initialized with a real-looking string literal.
struct CredentialFieldRule;

impl SecurityRule for CredentialFieldRule {
    fn rule_id(&self) -> &'static str {
        "SEC_CREDENTIAL_FIELD"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.field_declaration {
            return Vec::new();
        }
        let mut findings = Vec::new();
        let mut cursor = node.walk();
        for decl in node.children_by_field_name("declarator", &mut cursor) {
            let name = decl
                .child_by_field_name("name")
                .map(|n| node_text(n, ctx.source))
                .unwrap_or("");
            if !is_credential_field_name(name) {
                continue;
            }
            let value = match decl.child_by_field_name("value") {
                Some(v) if v.kind_id() == k.string_literal => v,
                _ => continue,
            };
            let literal = string_literal_value(value, ctx.source);
            if literal.is_empty() || is_placeholder_value(literal) {
                continue;
            }
            if is_from_secure_source(node_text(value, ctx.source)) {
                continue;
            }
            findings.push(finding(
                SecurityKind::HardcodedCredentials,
                format!("Hardcoded credential found in field: {name}"),
                line_of(node),
                snippet(decl, ctx.source),
                Severity::Critical,
            ));
        }
        findings
    }
}

/// Any string literal that heuristically resembles a secret.
struct CredentialLiteralRule;

impl SecurityRule for CredentialLiteralRule {
    fn rule_id(&self) -> &'static str {
        "SEC_CREDENTIAL_LITERAL"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.string_literal {
            return Vec::new();
        }
        let value = string_literal_value(node, ctx.source);
        if !looks_like_credential(value) {
            return Vec::new();
        }
        if ctx.in_test_method() || in_config_context(node, ctx.source) {
            return Vec::new();
        }
        vec![finding(
            SecurityKind::HardcodedCredentials,
            "Potential hardcoded credential in string literal".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::High,
        )]
    }
}

/// Runtime.exec and friends outside test methods.
struct CommandInjectionRule;

impl SecurityRule for CommandInjectionRule {
    fn rule_id(&self) -> &'static str {
        "SEC_COMMAND_INJECTION"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.method_invocation {
            return Vec::new();
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, ctx.source))
            .unwrap_or("");
        let mut findings = Vec::new();

        if name == "exec" {
            let receiver = receiver_text(node, ctx.source);
            let runtime_receiver =
                receiver.contains("Runtime.getRuntime()") || receiver.contains("runtime");
            if runtime_receiver && !ctx.in_test_method() {
                let line = line_of(node);
                state.flagged_lines.insert(line);
                findings.push(finding(
                    SecurityKind::CommandInjection,
                    "Potentially dangerous Runtime.exec() call".to_string(),
                    line,
                    snippet(node, ctx.source),
                    Severity::High,
                ));
            }
        }

        if name == "getRuntime"
            && node_text(node, ctx.source).contains("Runtime.getRuntime()")
            && !ctx.in_test_method()
        {
            findings.push(finding(
                SecurityKind::DangerousMethodCall,
                "Use of Runtime.getRuntime() detected".to_string(),
                line_of(node),
                snippet(node, ctx.source),
                Severity::Medium,
            ));
        }

        findings
    }
}

/// Statement-execution calls fed by concatenation or pre-built query vars.
struct SqlInjectionRule;

impl SecurityRule for SqlInjectionRule {
    fn rule_id(&self) -> &'static str {
        "SEC_SQL_INJECTION"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.method_invocation {
            return Vec::new();
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, ctx.source))
            .unwrap_or("");
        if !SQL_METHODS.contains(&name) {
            return Vec::new();
        }

        // Every examined SQL call site is marked so the null-dereference
        // rule stays quiet on the same statement.
        let line = line_of(node);
        state.flagged_lines.insert(line);

        let prepared = is_prepared_statement_receiver(node, ctx.source);
        if has_concatenation_argument(node, ctx.source) && !prepared {
            return vec![finding(
                SecurityKind::SqlInjection,
                "SQL injection vulnerability - string concatenation in query".to_string(),
                line,
                snippet(node, ctx.source),
                Severity::Critical,
            )];
        }

        if prepared {
            return Vec::new();
        }

        // A bare variable argument named like a query is suspicious when
        // the method body builds it with concatenation.
        let mut findings = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for arg in args.named_children(&mut cursor) {
                if arg.kind_id() != k.identifier {
                    continue;
                }
                let var = node_text(arg, ctx.source);
                let lower = var.to_lowercase();
                if !(lower.contains("query") || lower.contains("sql") || lower.contains("statement"))
                {
                    continue;
                }
                let body = ctx.body_text();
                if body.contains(&format!("{var} = ")) && body.contains(" + ") {
                    findings.push(finding(
                        SecurityKind::DynamicSqlConstruction,
                        "Dynamic SQL query construction detected".to_string(),
                        line,
                        snippet(node, ctx.source),
                        Severity::Critical,
                    ));
                }
            }
        }
        findings
    }
}

/// Method calls on receivers that may be null: unchecked parameters and
/// results of lookup-style calls.
struct NullDereferenceRule;

impl NullDereferenceRule {
    fn directly_dereferenced(name: &str, body: &str) -> bool {
        let pattern = format!(r"\b{}\.\w+\(", regex::escape(name));
        match Regex::new(&pattern) {
            Ok(re) => re.is_match(body),
            Err(_) => false,
        }
    }

    fn lookup_style_assignment(name: &str, body: &str) -> bool {
        body.contains(&format!("{name} = "))
            && (body.contains(".get")
                || body.contains("find")
                || body.contains("search")
                || body.contains("lookup"))
    }

    fn known_non_null(name: &str) -> bool {
        name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
            || matches!(name, "System" | "Math" | "String" | "Objects")
    }

    fn constant_or_static_looking(name: &str) -> bool {
        name == name.to_uppercase()
            || (name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) && name.len() > 1)
    }

    fn in_security_critical_method(ctx: &SecurityContext) -> bool {
        let name = ctx.method_name().to_lowercase();
        name.contains("sql")
            || name.contains("query")
            || name.contains("execute")
            || name.contains("command")
    }

    fn should_report(name: &str, line: usize, ctx: &SecurityContext, state: &ScanState) -> bool {
        // Two independent suppressions: a security finding already on this
        // line, and a method whose own name marks a validated path.
        if state.flagged_lines.contains(&line) {
            return false;
        }
        if Self::in_security_critical_method(ctx) {
            return false;
        }
        let scope = match ctx.scope {
            Some(scope) => scope,
            None => return false,
        };
        if scope.is_parameter(name) && !scope.is_null_checked(name) {
            return Self::directly_dereferenced(name, &scope.body_text);
        }
        if Self::lookup_style_assignment(name, &scope.body_text) {
            return !scope.is_null_checked(name);
        }
        !scope.is_null_checked(name)
            && !scope.initialized_vars.contains(name)
            && !ctx.field_names.contains(name)
            && !scope.exception_vars.contains(name)
            && !scope.enhanced_for_vars.contains(name)
            && !Self::known_non_null(name)
            && name != "this"
            && name != "super"
            && !Self::constant_or_static_looking(name)
    }
}

impl SecurityRule for NullDereferenceRule {
    fn rule_id(&self) -> &'static str {
        "SEC_NULL_DEREFERENCE"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.method_invocation {
            return Vec::new();
        }
        let receiver = match node.child_by_field_name("object") {
            Some(obj) if obj.kind_id() == k.identifier => obj,
            _ => return Vec::new(),
        };
        let name = node_text(receiver, ctx.source);
        let line = line_of(node);
        if !Self::should_report(name, line, ctx, state) {
            return Vec::new();
        }
        vec![finding(
            SecurityKind::NullPointerDereference,
            format!("Potential null pointer dereference on variable: {name}"),
            line,
            snippet(node, ctx.source),
            Severity::Medium,
        )]
    }
}

/// `new Random()` in security-sensitive surroundings.
struct WeakRandomRule;

impl WeakRandomRule {
    fn security_critical_context(node: Node, ctx: &SecurityContext) -> bool {
        let k = kinds();
        let mut current = node.parent();
        while let Some(parent) = current {
            let text = node_text(parent, ctx.source).to_lowercase();
            if text.contains("password")
                || text.contains("key")
                || text.contains("token")
                || text.contains("crypto")
                || text.contains("security")
                || text.contains("auth")
            {
                return true;
            }
            if k.is_method_like(&parent) {
                break;
            }
            current = parent.parent();
        }
        false
    }
}

impl SecurityRule for WeakRandomRule {
    fn rule_id(&self) -> &'static str {
        "SEC_WEAK_RANDOM"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.object_creation_expression {
            return Vec::new();
        }
        let type_name = node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        if type_name != "Random" || !Self::security_critical_context(node, ctx) {
            return Vec::new();
        }
        vec![finding(
            SecurityKind::WeakRandom,
            "Using weak random number generator in security context".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Medium,
        )]
    }
}

/// File handles opened on concatenated or user-supplied paths.
struct PathTraversalRule;

impl SecurityRule for PathTraversalRule {
    fn rule_id(&self) -> &'static str {
        "SEC_PATH_TRAVERSAL"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.object_creation_expression {
            return Vec::new();
        }
        let type_name = node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        if !FILE_OPERATION_TYPES.contains(&type_name) {
            return Vec::new();
        }
        let args = match node.child_by_field_name("arguments") {
            Some(a) => a,
            None => return Vec::new(),
        };
        let mut cursor = args.walk();
        for arg in args.named_children(&mut cursor) {
            if contains_variable_concatenation(arg, ctx.source) || is_user_input(arg, ctx) {
                let line = line_of(node);
                state.flagged_lines.insert(line);
                return vec![finding(
                    SecurityKind::PathTraversal,
                    "Potential path traversal vulnerability - user input in file path".to_string(),
                    line,
                    snippet(node, ctx.source),
                    Severity::High,
                )];
            }
        }
        Vec::new()
    }
}

/// Secrets held in String locals, where they linger in memory dumps.
struct SensitiveDataRule;

impl SecurityRule for SensitiveDataRule {
    fn rule_id(&self) -> &'static str {
        "SEC_SENSITIVE_DATA"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.local_variable_declaration {
            return Vec::new();
        }
        let var_type = node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        if var_type != "String" {
            return Vec::new();
        }
        let mut findings = Vec::new();
        let mut cursor = node.walk();
        for decl in node.children_by_field_name("declarator", &mut cursor) {
            let name = decl
                .child_by_field_name("name")
                .map(|n| node_text(n, ctx.source))
                .unwrap_or("");
            let lower = name.to_lowercase();
            let secret_named = lower.contains("password")
                || lower.contains("secret")
                || lower.contains("key")
                || lower.contains("token");
            if !secret_named {
                continue;
            }
            let initializer = decl
                .child_by_field_name("value")
                .map(|v| node_text(v, ctx.source))
                .unwrap_or("");
            if is_from_secure_source(initializer) {
                continue;
            }
            findings.push(finding(
                SecurityKind::SensitiveDataExposure,
                "Sensitive data stored in String (immutable and may appear in memory dumps)"
                    .to_string(),
                line_of(node),
                snippet(decl, ctx.source),
                Severity::Medium,
            ));
        }
        findings
    }
}

/// Array accesses indexed by parameters or index-named variables with no
/// visible bounds check in the surrounding block.
struct ArrayBoundsRule;

impl ArrayBoundsRule {
    fn has_bounds_check(access: Node, index_name: &str, array_name: &str, source: &str) -> bool {
        let k = kinds();
        let mut current = access.parent();
        while let Some(parent) = current {
            if parent.kind_id() == k.block || k.is_method_like(&parent) {
                let context = node_text(parent, source);
                return context.contains(&format!("if ({index_name} >= 0"))
                    || context.contains(&format!("if ({index_name} < {array_name}.length"))
                    || context.contains(&format!("{index_name} >= 0 && {index_name} < "))
                    || context.contains("checkBounds")
                    || context.contains("isValidIndex");
            }
            current = parent.parent();
        }
        false
    }
}

impl SecurityRule for ArrayBoundsRule {
    fn rule_id(&self) -> &'static str {
        "SEC_ARRAY_BOUNDS"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.array_access {
            return Vec::new();
        }
        let index = match node.child_by_field_name("index") {
            Some(i) if i.kind_id() == k.identifier => i,
            _ => return Vec::new(),
        };
        let index_name = node_text(index, ctx.source);
        let lower = index_name.to_lowercase();
        let risky = ctx.scope.map(|s| s.is_parameter(index_name)).unwrap_or(false)
            || lower.contains("index")
            || lower.contains("pos")
            || lower.contains("offset");
        if !risky {
            return Vec::new();
        }
        let array_name = node
            .child_by_field_name("array")
            .map(|a| node_text(a, ctx.source))
            .unwrap_or("");
        if Self::has_bounds_check(node, index_name, array_name, ctx.source) {
            return Vec::new();
        }
        vec![finding(
            SecurityKind::ArrayBoundsCheck,
            "Array access without bounds checking - potential ArrayIndexOutOfBoundsException"
                .to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Medium,
        )]
    }
}

/// Reference casts with no instanceof guard anywhere in the method.
struct UnsafeCastRule;

impl UnsafeCastRule {
    const PRIMITIVE_CAST_TARGETS: [&'static str; 6] =
        ["int", "double", "float", "long", "short", "byte"];
}

impl SecurityRule for UnsafeCastRule {
    fn rule_id(&self) -> &'static str {
        "SEC_UNSAFE_CAST"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.cast_expression {
            return Vec::new();
        }
        let target = node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source))
            .unwrap_or("");
        if Self::PRIMITIVE_CAST_TARGETS.contains(&target) {
            return Vec::new();
        }
        let value_text = node
            .child_by_field_name("value")
            .map(|v| node_text(v, ctx.source))
            .unwrap_or("");
        let trivial_string_cast = target == "String"
            && (value_text.contains("toString()") || value_text.contains("String.valueOf"));
        if trivial_string_cast {
            return Vec::new();
        }
        if ctx.body_text().contains("instanceof") {
            return Vec::new();
        }
        vec![finding(
            SecurityKind::UnsafeCasting,
            "Unsafe type casting without instanceof check".to_string(),
            line_of(node),
            snippet(node, ctx.source),
            Severity::Low,
        )]
    }
}

/// Catch blocks that swallow or merely print exceptions.
struct CatchBlockRule;

impl SecurityRule for CatchBlockRule {
    fn rule_id(&self) -> &'static str {
        "SEC_CATCH_BLOCK"
    }

    fn check(
        &self,
        node: Node,
        ctx: &SecurityContext,
        _state: &mut ScanState,
    ) -> Vec<SecurityFinding> {
        let k = kinds();
        if node.kind_id() != k.try_statement {
            return Vec::new();
        }
        let mut findings = Vec::new();
        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            if clause.kind_id() != k.catch_clause {
                continue;
            }
            let body = match clause.child_by_field_name("body") {
                Some(b) => b,
                None => continue,
            };
            match body.named_child_count() {
                0 => findings.push(finding(
                    SecurityKind::EmptyCatchBlock,
                    "Empty catch block may hide security issues".to_string(),
                    line_of(clause),
                    snippet(clause, ctx.source),
                    Severity::Low,
                )),
                1 => {
                    let only_prints = body
                        .named_child(0)
                        .filter(|stmt| stmt.kind_id() == k.expression_statement)
                        .and_then(|stmt| stmt.named_child(0))
                        .filter(|expr| expr.kind_id() == k.method_invocation)
                        .and_then(|call| call.child_by_field_name("name"))
                        .map(|name| node_text(name, ctx.source) == "printStackTrace")
                        .unwrap_or(false);
                    if only_prints {
                        findings.push(finding(
                            SecurityKind::PoorExceptionHandling,
                            "Exception handling only prints stack trace - consider proper logging"
                                .to_string(),
                            line_of(clause),
                            snippet(clause, ctx.source),
                            Severity::Low,
                        ));
                    }
                }
                _ => {}
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_heuristic_requires_two_character_classes() {
        assert!(looks_like_password("Sup3rSecret"));
        assert!(looks_like_password("hunter2!"));
        assert!(!looks_like_password("short"));
        assert!(!looks_like_password("alllowercase"));
    }

    #[test]
    fn api_key_heuristic_checks_length_and_alphabet() {
        assert!(looks_like_api_key("sk-abcDEF123456789_xyz"));
        assert!(!looks_like_api_key("too-short"));
        assert!(!looks_like_api_key("!!! not a key !!! $$$"));
    }

    #[test]
    fn token_heuristic_accepts_dotted_and_long_opaque_values() {
        assert!(looks_like_token("eyJhbGciOi.eyJzdWIiOi.sflKxwRJ"));
        assert!(looks_like_token(&"a".repeat(40)));
        assert!(!looks_like_token("plain"));
    }

    #[test]
    fn placeholders_are_not_credentials() {
        assert!(is_placeholder_value("changeme"));
        assert!(is_placeholder_value("your_api_key"));
        assert!(!is_placeholder_value("Sup3rSecret!"));
    }

    #[test]
    fn privileged_account_names_count_as_credentials() {
        assert!(looks_like_credential("admin"));
        assert!(looks_like_credential("root"));
        assert!(looks_like_credential("sa"));
    }
}
