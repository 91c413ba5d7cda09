//! Error types for the Aparavi gateway.

use thiserror::Error;

/// Result type alias using the gateway's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gateway operations.
///
/// Remote-reported semantic errors (`status: "error"` inside an HTTP 200
/// body) are deliberately NOT represented here; they are returned as data
/// so callers can show them to an end user without a stack trace.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP 401 from the API. Terminal, never retried.
    #[error("Authentication failed - check username/password")]
    Auth,

    /// HTTP 400 from the API. Terminal; carries the response body so the
    /// offending query can be diagnosed.
    #[error("Bad request - invalid query: {0}")]
    BadRequest(String),

    /// HTTP 404 from the API. Terminal.
    #[error("API endpoint not found - check server configuration")]
    NotFound,

    /// Transport-level failure that survived the retry budget.
    #[error("Request failed after {attempts} retries: {message}")]
    Transport { attempts: u32, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed outside the retried query path
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_auth() {
        let err = Error::Auth;
        assert_eq!(
            err.to_string(),
            "Authentication failed - check username/password"
        );
    }

    #[test]
    fn test_error_display_bad_request() {
        let err = Error::BadRequest("syntax error near WHERE".to_string());
        assert_eq!(
            err.to_string(),
            "Bad request - invalid query: syntax error near WHERE"
        );
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound;
        assert!(err.to_string().contains("endpoint not found"));
    }

    #[test]
    fn test_error_display_transport() {
        let err = Error::Transport {
            attempts: 3,
            message: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request failed after 3 retries: connection reset"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing username".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing username");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty tag batch".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty tag batch");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
