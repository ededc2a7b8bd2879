//! Stream client configuration

use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::protocol::constants::*;

/// Host page attribute carrying the service port
pub const ATTR_PORT: &str = "data-port";

/// Host page attributes carrying the "stream enabled" flag
pub const ATTR_ACTIVE: [&str; 2] = ["data-actif", "data-active"];

/// Stream client configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Host the stream service runs on
    pub host: String,

    /// Port the stream service listens on
    pub port: u16,

    /// Whether any connection should be attempted at all
    pub active: bool,

    /// How long the liveness probe waits for the connection to open
    pub probe_timeout: Duration,

    /// Close a session whose buffer exceeds this many bytes without a
    /// marker (None = unbounded)
    pub max_buffer_size: Option<usize>,

    /// Initial capacity of each session's receive buffer
    pub read_buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            active: true,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            max_buffer_size: None,
            read_buffer_size: 64 * 1024, // 64KB
        }
    }
}

impl StreamConfig {
    /// Create a new config for the given port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Build a config from host page data attributes.
    ///
    /// `data-port` is required. The stream is active only when
    /// `data-actif` (or `data-active`) is `"1"`.
    pub fn from_attributes<'a, I>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut port = None;
        let mut active = false;

        for (name, value) in attributes {
            if name == ATTR_PORT {
                port = Some(value);
            } else if ATTR_ACTIVE.contains(&name) {
                active = value.trim() == "1";
            }
        }

        let port = port.ok_or(ConfigError::MissingPort)?;
        let port = port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ConfigError::InvalidPort(port.to_string()))?;

        Ok(Self::with_port(port).active(active))
    }

    /// WebSocket URL of the stream service
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    /// Set the host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable streaming
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the liveness probe timeout
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Cap the receive buffer size
    pub fn max_buffer_size(mut self, max: usize) -> Self {
        self.max_buffer_size = Some(max);
        self
    }
}
