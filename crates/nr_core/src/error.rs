use thiserror::Error;

/// Broad failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received (connect failure, timeout, reset).
    Network,
    /// The server answered with an error status.
    Server,
    /// Local persistence failed.
    Storage,
    /// A payload was missing expected fields or could not be decoded.
    Malformed,
    /// The client was configured with unusable values.
    Config,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Malformed data: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Server { .. } => ErrorKind::Server,
            Error::Storage(_) | Error::Io(_) => ErrorKind::Storage,
            Error::Malformed(_) | Error::Serialization(_) => ErrorKind::Malformed,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Error::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_builder() {
            Error::Config(err.to_string())
        } else if err.is_timeout() {
            Error::Network("Request timed out. Please check your connection.".to_string())
        } else {
            Error::Network(format!("Network error. Please check your connection. ({})", err))
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("Invalid URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
