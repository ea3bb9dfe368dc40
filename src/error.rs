use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, VectorizerError>;

#[derive(Error, Debug)]
pub enum VectorizerError {
    /// Filtering (stop words, min_df / max_df, max_features) left no terms.
    #[error("empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Two index-aligned inputs disagree on their length.
    #[error("shape mismatch: {what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("column `{0}` not found in input header")]
    MissingColumn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
