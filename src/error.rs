//! Error taxonomy shared by the analysis core and its collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad request: reported before any computation starts.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// The price source could not deliver a series. Aborts the whole request.
    #[error("Price data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("Sweep cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AnalysisError::InputValidation(msg.into())
    }

    pub fn unavailable(ticker: &str, reason: impl std::fmt::Display) -> Self {
        AnalysisError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
