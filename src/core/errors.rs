//! Shared error types for pipeline analysis.

use thiserror::Error;

/// Fatal conditions for an analysis run.
///
/// Structural errors abort traversal: the caller gets this error instead of a
/// partial snapshot table or diagnostics list. Unknown-variable findings are
/// never errors; they surface as Warning annotations.
#[derive(Debug, Error)]
pub enum Error {
    /// A brick without a registry id cannot be analyzed or reported on.
    #[error("brick at '{path}' is missing its id")]
    MissingBrickId { path: String },

    /// A pipeline expression appeared nested inside a structured value.
    /// Slots must be direct config entries of a brick.
    #[error("pipeline expression at '{path}' is not a valid slot; sub-pipelines must be direct config entries")]
    MisplacedPipeline { path: String },

    /// Pipeline nesting exceeded the configured limit.
    #[error("pipeline nesting at '{path}' exceeds the configured limit of {limit}")]
    NestingTooDeep { path: String, limit: usize },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors caused by malformed pipeline structure, as opposed to
    /// wrapped external failures.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::MissingBrickId { .. }
                | Error::MisplacedPipeline { .. }
                | Error::NestingTooDeep { .. }
        )
    }
}
