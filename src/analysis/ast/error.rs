use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("source code cannot be empty")]
    EmptySource,

    #[error("source code too large ({0} bytes), potential DoS risk")]
    SourceTooLarge(usize),

    #[error("failed to parse Java source code - syntax may be invalid")]
    ParseFailed,

    #[error("no analyzable class declaration found in source")]
    NoAnalyzableInput,
}
