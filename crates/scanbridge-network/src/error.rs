//! Error types for the HTTP transport.

use std::net::SocketAddr;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors that can occur while serving HTTP.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The request head or framing could not be parsed.
    #[error("Malformed request: {0}")]
    Parse(String),

    /// The request exceeds the configured size limit.
    #[error("Request too large: {size} bytes (max {max_size})")]
    RequestTooLarge { size: usize, max_size: usize },

    /// A framing feature this server does not implement.
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Status code sent back before closing a connection that failed with this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::RequestTooLarge { .. } => 413,
            Self::Unsupported(_) => 501,
            Self::Parse(_) | Self::BindFailed { .. } | Self::Io(_) => 400,
        }
    }
}

impl From<httparse::Error> for HttpError {
    fn from(error: httparse::Error) -> Self {
        Self::Parse(error.to_string())
    }
}
