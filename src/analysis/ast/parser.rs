/// Java parsing front-end built on Tree-sitter.
///
/// The analysis engine itself only consumes an already-parsed
/// `tree_sitter::Tree`; this module is the thin boundary that produces one.
use lazy_static::lazy_static;
use tree_sitter::{Language, Parser, Tree};

use crate::analysis::ast::error::AnalysisError;

/// Upper bound on accepted source size. Decompiled classes are small;
/// anything beyond this is rejected before parsing.
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

// The Language is expensive to construct and safe to share between parsers,
// so build it once for the whole process.
lazy_static! {
    static ref JAVA_LANGUAGE: Language = Language::new(tree_sitter_java::LANGUAGE);
}

/// Handle to the cached Java grammar.
pub fn java_language() -> &'static Language {
    &JAVA_LANGUAGE
}

/// Create a parser configured for Java.
pub fn java_parser() -> Result<Parser, AnalysisError> {
    let mut parser = Parser::new();
    parser
        .set_language(java_language())
        .map_err(|_| AnalysisError::ParseFailed)?;
    Ok(parser)
}

/// Parse one compilation unit, failing fast on unusable input.
///
/// Blank input and parser failure are errors rather than empty results so
/// callers can tell "no findings" apart from "nothing was analyzed".
pub fn parse_java(source: &str) -> Result<Tree, AnalysisError> {
    if source.trim().is_empty() {
        return Err(AnalysisError::EmptySource);
    }
    if source.len() > MAX_SOURCE_BYTES {
        return Err(AnalysisError::SourceTooLarge(source.len()));
    }

    let mut parser = java_parser()?;
    let tree = parser.parse(source, None).ok_or(AnalysisError::ParseFailed)?;
    if tree.root_node().is_error() {
        return Err(AnalysisError::ParseFailed);
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_class() {
        let tree = parse_java("class A {}").expect("minimal class should parse");
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn rejects_blank_source() {
        assert!(matches!(parse_java("   \n\t"), Err(AnalysisError::EmptySource)));
    }

    #[test]
    fn rejects_oversized_source() {
        let big = "a".repeat(MAX_SOURCE_BYTES + 1);
        assert!(matches!(
            parse_java(&big),
            Err(AnalysisError::SourceTooLarge(_))
        ));
    }
}
