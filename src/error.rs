//! Error types
//!
//! Every failure in the pipeline is local to one channel. Connection and
//! protocol errors close the affected session and are kept on its
//! `CloseReason`. Decode errors are logged and skipped. A liveness timeout
//! is a plain `false`.

use std::fmt;

use tokio_tungstenite::tungstenite;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// WebSocket transport error
    WebSocket(tungstenite::Error),
    /// Invalid configuration or host page attributes
    Config(ConfigError),
    /// The server violated the stream protocol
    Protocol(ProtocolError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WebSocket(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Protocol(e) => Some(e),
        }
    }
}

impl From<tungstenite::Error> for Error {
    fn from(e: tungstenite::Error) -> Self {
        Error::WebSocket(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The host page did not supply a port
    MissingPort,
    /// The supplied port is not a valid TCP port
    InvalidPort(String),
    /// A channel descriptor is not of the form `<room>/<participant>`
    InvalidChannel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingPort => write!(f, "No port given"),
            ConfigError::InvalidPort(p) => write!(f, "Invalid port: {:?}", p),
            ConfigError::InvalidChannel(c) => write!(f, "Invalid channel descriptor: {:?}", c),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Stream protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A text message arrived on a binary channel
    NonBinaryMessage,
    /// Buffered bytes exceeded the configured cap without a marker
    BufferOverflow { size: usize, limit: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::NonBinaryMessage => write!(f, "Received non-binary data"),
            ProtocolError::BufferOverflow { size, limit } => write!(
                f,
                "Buffered {} bytes without a frame marker (limit {})",
                size, limit
            ),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Frame decode errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not a decodable image
    InvalidImage(String),
    /// The decode task was cancelled or panicked
    Aborted,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidImage(reason) => write!(f, "Invalid image: {}", reason),
            DecodeError::Aborted => write!(f, "Decode task aborted"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_conversions() {
        let err: Error = ConfigError::MissingPort.into();
        assert!(matches!(err, Error::Config(ConfigError::MissingPort)));

        let err: Error = ProtocolError::NonBinaryMessage.into();
        assert!(matches!(err, Error::Protocol(_)));

        let err: Error = ProtocolError::NonBinaryMessage.into();
        assert_eq!(err.to_string(), "Protocol error: Received non-binary data");
    }

    #[test]
    fn test_overflow_message() {
        let err = ProtocolError::BufferOverflow {
            size: 2048,
            limit: 1024,
        };
        assert_eq!(
            err.to_string(),
            "Buffered 2048 bytes without a frame marker (limit 1024)"
        );
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = Error::from(tungstenite::Error::ConnectionClosed);
        assert!(matches!(err, Error::WebSocket(_)));
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some(tungstenite::Error::ConnectionClosed.to_string())
        );
    }
}
