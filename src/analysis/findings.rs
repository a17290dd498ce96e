/// Finding records emitted by the rule sets. Immutable once created; the
/// analyzers only ever append to their lists.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Lenient mapping from report/config text; anything unrecognized
    /// degrades to Low rather than erroring.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationKind {
    UnusedVariable,
    UninitializedVariable,
    StringConcatenationInLoop,
    LoopInvariantCalculation,
    UnnecessaryObjectCreation,
    WrapperObjectCreation,
    DivisionOptimization,
    InefficientLoop,
    InfiniteLoop,
    RedundantCondition,
    HighCyclomaticComplexity,
    TooManyParameters,
    EmptyMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityKind {
    HardcodedCredentials,
    SqlInjection,
    DynamicSqlConstruction,
    CommandInjection,
    DangerousMethodCall,
    PathTraversal,
    NullPointerDereference,
    WeakRandom,
    SensitiveDataExposure,
    ArrayBoundsCheck,
    UnsafeCasting,
    EmptyCatchBlock,
    PoorExceptionHandling,
}

/// One optimization suggestion anchored to a source line (0 if unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationFinding {
    pub kind: OptimizationKind,
    pub description: String,
    pub line: usize,
    pub snippet: String,
    pub severity: Severity,
}

/// One security observation anchored to a source line (0 if unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub kind: SecurityKind,
    pub description: String,
    pub line: usize,
    pub snippet: String,
    pub severity: Severity,
}
