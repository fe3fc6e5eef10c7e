use thiserror::Error;

/// Why a citation did not produce a span. None of these are fatal; callers
/// drop the citation and move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("citation text is empty")]
    EmptyInput,

    #[error("citation not found in record {record_id}")]
    NoMatch { record_id: String },

    /// Mapping produced `0..0`, which is never a real match.
    #[error("degenerate span 0..0 in record {record_id}")]
    DegenerateMatch { record_id: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("similarity threshold must be a number in 0..1, got {0}")]
    SimilarityThreshold(f64),

    #[error("minimum block length must be at least 1")]
    MinBlockLen,
}
