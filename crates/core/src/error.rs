//! Error types for the storage client
//!
//! Every failure the client can report is one variant of [`Error`], so callers
//! match on the kind instead of comparing messages.

use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the storage client
#[derive(Debug, Error)]
pub enum Error {
    /// Empty user or key supplied; never reaches the network
    #[error("Bad auth credentials provided")]
    BadCredentials,

    /// The authentication handshake failed or the server answered 401
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Container or object name rejected before sending a request
    #[error("Bad container/object name provided: {0}")]
    BadName(String),

    /// The server answered 404 for a container or object
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// The server refused to remove a container that still holds objects
    #[error("Unable to remove container with objects: {0}")]
    ContainerNotEmpty(String),

    /// The server answered with a status the operation does not expect
    #[error("Unable to process api response (status {status})")]
    BadResponse { status: u16 },

    /// A listing body that is not a JSON document
    #[error("Bad JSON in response: {0}")]
    BadJson(String),

    /// A listing body that is valid JSON of the wrong shape
    #[error("Unable to decode response: {0}")]
    Decode(String),

    /// The server did not answer 201 to an upload
    #[error("Unable to upload object (status {status})")]
    UnableToUpload { status: u16 },

    /// A header value that must parse did not
    #[error("Parse error: {0}")]
    Parse(String),

    /// Network failure while talking to the storage endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file errors, passed through untouched
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify a `serde_json` failure on a listing body.
    ///
    /// Syntax and truncation errors mean the body is not JSON at all and map to
    /// [`Error::BadJson`]; type and value mismatches map to [`Error::Decode`].
    pub fn from_json(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof => Error::BadJson(err.to_string()),
            Category::Data => Error::Decode(err.to_string()),
            Category::Io => Error::Transport(err.to_string()),
        }
    }

    /// Whether this error means the container or object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound(_))
    }

    /// Whether this error came from authentication
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::BadCredentials | Error::Authentication(_))
    }

    /// Process exit code used by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::BadName(_) => 2,
            Error::Transport(_) => 3,
            Error::BadCredentials | Error::Authentication(_) => 4,
            Error::ObjectNotFound(_) => 5,
            Error::ContainerNotEmpty(_) => 6,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_is_bad_json() {
        let err = serde_json::from_str::<Vec<u64>>("[1, 2,,]").unwrap_err();
        assert!(matches!(Error::from_json(err), Error::BadJson(_)));

        let err = serde_json::from_str::<Vec<u64>>("[1, 2").unwrap_err();
        assert!(matches!(Error::from_json(err), Error::BadJson(_)));
    }

    #[test]
    fn test_json_shape_is_decode() {
        let err = serde_json::from_str::<Vec<u64>>(r#"["a"]"#).unwrap_err();
        assert!(matches!(Error::from_json(err), Error::Decode(_)));
    }

    #[test]
    fn test_io_error_passes_through() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        let err = Error::from(io);
        match err {
            Error::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_helpers() {
        assert!(Error::ObjectNotFound("c/o".to_string()).is_not_found());
        assert!(!Error::BadResponse { status: 500 }.is_not_found());
        assert!(Error::BadCredentials.is_auth());
        assert!(Error::Authentication("401".to_string()).is_auth());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::BadName("x".to_string()).exit_code(), 2);
        assert_eq!(Error::Transport("reset".to_string()).exit_code(), 3);
        assert_eq!(Error::BadCredentials.exit_code(), 4);
        assert_eq!(Error::ObjectNotFound("c".to_string()).exit_code(), 5);
        assert_eq!(Error::ContainerNotEmpty("c".to_string()).exit_code(), 6);
        assert_eq!(Error::BadResponse { status: 500 }.exit_code(), 1);
    }
}
