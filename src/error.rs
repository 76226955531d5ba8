//! Error types for the search panel host.

use search_merge::SearchError;

/// Top-level error type for the search panel.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario file could not be parsed or replayed.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// The session coordinator is gone or did not answer.
    #[error("session error: {0}")]
    Session(String),

    /// A result provider failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// Merge/rank/diff pipeline error.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = PanelError::Config("channel_capacity must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: channel_capacity must be greater than 0"
        );
    }

    #[test]
    fn display_session() {
        let err = PanelError::Session("coordinator stopped".into());
        assert_eq!(err.to_string(), "session error: coordinator stopped");
    }

    #[test]
    fn pipeline_error_converts() {
        let err: PanelError = SearchError::Config("merge_order must name at least one provider".into()).into();
        assert_eq!(
            err.to_string(),
            "pipeline error: config error: merge_order must name at least one provider"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: PanelError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PanelError>();
    }
}
