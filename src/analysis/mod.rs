/// Analysis engine: scope/complexity fact passes, the optimization and
/// security rule sets, and quality scoring over one Java class.
pub mod ast;
pub mod findings;
pub mod heatmap;
pub mod optimization;
pub mod security;

use serde::Serialize;
use tree_sitter::Tree;

use crate::analysis::ast::error::AnalysisError;
use crate::analysis::ast::kinds::kinds;
use crate::analysis::ast::parse_java;
use crate::analysis::findings::{OptimizationFinding, SecurityFinding};
use crate::analysis::heatmap::{HeatmapAnalyzer, HeatmapData};
use crate::analysis::optimization::OptimizationAnalyzer;
use crate::analysis::security::SecurityAnalyzer;

// Re-export commonly used types
pub use ast::{AnalysisError as Error, ClassOutline, ComplexityFacts, ScopeFacts};
pub use findings::{OptimizationKind, SecurityKind, Severity};
pub use heatmap::{HeatBand, HeatmapRegion};

/// Complete audit output for one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAuditReport {
    pub class_name: Option<String>,
    pub optimizations: Vec<OptimizationFinding>,
    pub security: Vec<SecurityFinding>,
    pub heatmap: HeatmapData,
}

/// Run the full pipeline on an already-parsed tree.
///
/// The tree must contain at least one class or interface declaration;
/// anything less is a fail-fast error so callers can tell "no findings"
/// apart from "nothing was analyzed".
pub fn audit_tree(tree: &Tree, source: &str) -> Result<ClassAuditReport, AnalysisError> {
    let root = tree.root_node();
    if root.is_error() {
        return Err(AnalysisError::ParseFailed);
    }
    let k = kinds();
    let mut has_type = false;
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if k.is_type_declaration(&child) || child.kind() == "enum_declaration" {
            has_type = true;
            break;
        }
    }
    if !has_type {
        return Err(AnalysisError::NoAnalyzableInput);
    }

    let optimizations = OptimizationAnalyzer::new().analyze(root, source);
    let security = SecurityAnalyzer::new().analyze(root, source);
    let heatmap = HeatmapAnalyzer::generate(root, source, &optimizations, &security);
    tracing::debug!(
        optimizations = optimizations.len(),
        security = security.len(),
        regions = heatmap.regions.len(),
        "class audit complete"
    );

    Ok(ClassAuditReport {
        class_name: heatmap
            .class_metrics
            .first()
            .map(|c| c.class_name.clone()),
        optimizations,
        security,
        heatmap,
    })
}

/// Convenience entry: parse then audit.
pub fn audit_source(source: &str) -> Result<ClassAuditReport, AnalysisError> {
    let tree = parse_java(source)?;
    audit_tree(&tree, source)
}
