/// Resolved node-kind ids for the Java grammar.
///
/// Kind ids are stable per Language instance; resolving them once lets the
/// traversal passes compare a `u16` instead of a string on every node.
use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::analysis::ast::parser::java_language;

#[derive(Copy, Clone)]
pub struct JavaKinds {
    pub identifier: u16,
    pub class_declaration: u16,
    pub interface_declaration: u16,
    pub field_declaration: u16,
    pub method_declaration: u16,
    pub constructor_declaration: u16,
    pub formal_parameter: u16,
    pub spread_parameter: u16,
    pub catch_formal_parameter: u16,
    pub local_variable_declaration: u16,
    pub variable_declarator: u16,
    pub assignment_expression: u16,
    pub update_expression: u16,
    pub binary_expression: u16,
    pub ternary_expression: u16,
    pub cast_expression: u16,
    pub parenthesized_expression: u16,
    pub array_access: u16,
    pub method_invocation: u16,
    pub argument_list: u16,
    pub object_creation_expression: u16,
    pub field_access: u16,
    pub string_literal: u16,
    pub null_literal: u16,
    pub if_statement: u16,
    pub while_statement: u16,
    pub do_statement: u16,
    pub for_statement: u16,
    pub enhanced_for_statement: u16,
    pub switch_expression: u16,
    pub switch_label: u16,
    pub try_statement: u16,
    pub catch_clause: u16,
    pub break_statement: u16,
    pub expression_statement: u16,
    pub block: u16,
    pub this_expr: u16,
}

static KINDS: Lazy<JavaKinds> = Lazy::new(|| {
    let lang = java_language();
    let id = |kind: &str| lang.id_for_node_kind(kind, true);
    JavaKinds {
        identifier: id("identifier"),
        class_declaration: id("class_declaration"),
        interface_declaration: id("interface_declaration"),
        field_declaration: id("field_declaration"),
        method_declaration: id("method_declaration"),
        constructor_declaration: id("constructor_declaration"),
        formal_parameter: id("formal_parameter"),
        spread_parameter: id("spread_parameter"),
        catch_formal_parameter: id("catch_formal_parameter"),
        local_variable_declaration: id("local_variable_declaration"),
        variable_declarator: id("variable_declarator"),
        assignment_expression: id("assignment_expression"),
        update_expression: id("update_expression"),
        binary_expression: id("binary_expression"),
        ternary_expression: id("ternary_expression"),
        cast_expression: id("cast_expression"),
        parenthesized_expression: id("parenthesized_expression"),
        array_access: id("array_access"),
        method_invocation: id("method_invocation"),
        argument_list: id("argument_list"),
        object_creation_expression: id("object_creation_expression"),
        field_access: id("field_access"),
        string_literal: id("string_literal"),
        null_literal: id("null_literal"),
        if_statement: id("if_statement"),
        while_statement: id("while_statement"),
        do_statement: id("do_statement"),
        for_statement: id("for_statement"),
        enhanced_for_statement: id("enhanced_for_statement"),
        switch_expression: id("switch_expression"),
        switch_label: id("switch_label"),
        try_statement: id("try_statement"),
        catch_clause: id("catch_clause"),
        break_statement: id("break_statement"),
        expression_statement: id("expression_statement"),
        block: id("block"),
        this_expr: id("this"),
    }
});

pub fn kinds() -> &'static JavaKinds {
    &KINDS
}

impl JavaKinds {
    /// Any loop construct: for, enhanced-for, while, do-while.
    pub fn is_loop(&self, node: &Node) -> bool {
        let k = node.kind_id();
        k == self.for_statement
            || k == self.enhanced_for_statement
            || k == self.while_statement
            || k == self.do_statement
    }

    /// Method or constructor declaration.
    pub fn is_method_like(&self, node: &Node) -> bool {
        let k = node.kind_id();
        k == self.method_declaration || k == self.constructor_declaration
    }

    /// Class-like type declaration that owns fields and methods.
    pub fn is_type_declaration(&self, node: &Node) -> bool {
        let k = node.kind_id();
        k == self.class_declaration || k == self.interface_declaration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ids_resolve_for_java_grammar() {
        let k = kinds();
        // id 0 is tree-sitter's "not a kind" sentinel
        assert_ne!(k.identifier, 0);
        assert_ne!(k.method_declaration, 0);
        assert_ne!(k.enhanced_for_statement, 0);
        assert_ne!(k.switch_label, 0);
    }
}
