//! Static analysis engine for single Java classes.
//!
//! Given the parsed source of one class (typically recovered by an external
//! decompiler), the engine produces three kinds of output: optimization
//! suggestions, security-vulnerability findings, and per-line / per-method /
//! per-class quality scores merged into contiguous heatmap regions.
//!
//! The whole pipeline is a pure function of one immutable syntax tree; no
//! state is shared between class analyses and re-running on the same tree
//! yields identical output.

/// Safely truncate a UTF-8 string to a maximum number of characters
pub fn truncate_utf8_safe(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Analysis modules: AST fact passes, rule sets, and scoring
pub mod analysis;

// Re-export commonly used types for convenience
pub use analysis::ast::{AnalysisError, ClassOutline, ComplexityFacts, ScopeFacts};
pub use analysis::findings::{
    OptimizationFinding, OptimizationKind, SecurityFinding, SecurityKind, Severity,
};
pub use analysis::heatmap::{HeatBand, HeatmapData, HeatmapRegion};
pub use analysis::{audit_source, audit_tree, ClassAuditReport};
