use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Failure categories surfaced by every service and repository operation.
///
/// The display strings are meant for end users; callers branch on the
/// variant, never on the text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncError {
    #[error("Unable to load backend")]
    Network,

    #[error("Bad Server Response")]
    Json,

    #[error("Unknown User - Are you logged in?")]
    NotLoggedIn,

    #[error("Unknown Error, please try again later")]
    Unknown,
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised while wiring the library together for the command line.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid timestamp for {url}: {value}")]
    InvalidTimestamp { url: String, value: String },

    #[error("HTTP client error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_description() {
        assert_eq!(SyncError::Network.to_string(), "Unable to load backend");
    }

    #[test]
    fn test_json_description() {
        assert_eq!(SyncError::Json.to_string(), "Bad Server Response");
    }

    #[test]
    fn test_not_logged_in_description() {
        assert_eq!(
            SyncError::NotLoggedIn.to_string(),
            "Unknown User - Are you logged in?"
        );
    }

    #[test]
    fn test_unknown_description() {
        assert_eq!(
            SyncError::Unknown.to_string(),
            "Unknown Error, please try again later"
        );
    }

    #[test]
    fn test_app_error_wraps_sync_error_transparently() {
        let err = AppError::from(SyncError::NotLoggedIn);
        assert_eq!(err.to_string(), "Unknown User - Are you logged in?");
    }
}
