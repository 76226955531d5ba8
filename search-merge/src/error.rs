//! Error types for the search-merge crate.
//!
//! Errors carry stable string messages. Query text never appears in an
//! error message; it is only ever logged at trace level.

/// Errors raised by the result pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// An edit script was applied to a list it was not computed for.
    #[error("edit script error: {0}")]
    Script(String),
}

/// Failure reported by an [`ExternalRanker`](crate::ranker::ExternalRanker).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankingError {
    /// The scoring service could not be reached or did not answer.
    #[error("ranking service unavailable: {0}")]
    Unavailable(String),

    /// The scoring service answered with something unusable.
    #[error("ranking failed: {0}")]
    Failed(String),
}

/// Convenience type alias for search-merge results.
pub type Result<T> = std::result::Result<T, SearchError>;
