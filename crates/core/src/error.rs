use providers::ProviderError;
use thiserror::Error;

/// Failures the engine can produce. Only the input errors are meant to reach
/// a caller; the rest are absorbed where they occur and logged.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input text is empty")]
    EmptyInput,
    #[error("input too short for {operation}: {actual} < {minimum}")]
    InputTooShort {
        operation: &'static str,
        minimum: usize,
        actual: usize,
    },
    #[error("vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("malformed corpus entry {id}: {reason}")]
    MalformedCorpusEntry { id: String, reason: String },
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),
    #[error("invalid model response: {0}")]
    InvalidModelResponse(String),
}

impl AnalysisError {
    /// Errors a caller is expected to see: the request itself was unusable.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyInput | AnalysisError::InputTooShort { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
