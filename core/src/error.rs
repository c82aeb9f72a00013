//! Error types and handling for the voquest core library

use thiserror::Error;

/// Result type alias for voquest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for voquest core
#[derive(Error, Debug)]
pub enum Error {
    /// Data Access Layer errors
    #[error("DAL error: {0}")]
    Dal(#[from] DalError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// XML reader errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// URL parse errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Errors raised while talking to a DAL service
#[derive(Error, Debug)]
pub enum DalError {
    /// The service endpoint failed at the HTTP level
    #[error("service error: {status} - {message}")]
    Service { status: u16, message: String },

    /// The service answered with QUERY_STATUS=ERROR
    #[error("query error: {message}")]
    Query { message: String },

    /// The response body is not a usable VOTable
    #[error("format error: {message}")]
    Format { message: String },

    /// The query itself is invalid and was never submitted
    #[error("protocol error: {message}")]
    Protocol { message: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format")]
    InvalidFormat,

    #[error("No configuration found")]
    NoConfigFound,
}

impl DalError {
    /// Shorthand for a protocol error with the given message
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        DalError::Protocol {
            message: message.into(),
        }
    }

    /// Shorthand for a format error with the given message
    pub fn format<S: Into<String>>(message: S) -> Self {
        DalError::Format {
            message: message.into(),
        }
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
