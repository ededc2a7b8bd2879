//! Channel identifiers
//!
//! A channel is addressed as `<room-code>/<participant-name>`. The string
//! is opaque to the client beyond that shape and is sent verbatim as the
//! first message on the socket.

use std::fmt;
use std::str::FromStr;

use super::constants::CHANNEL_SEPARATOR;
use crate::error::ConfigError;

/// Identifier selecting one server-side stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    room: String,
    participant: String,
}

impl ChannelId {
    /// Create a channel identifier from its parts
    pub fn new(room: impl Into<String>, participant: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            participant: participant.into(),
        }
    }

    /// Parse a `<room>/<participant>` descriptor.
    ///
    /// The split happens on the first separator, so participant names may
    /// themselves contain `/`.
    pub fn parse(descriptor: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidChannel(descriptor.to_string());

        let (room, participant) = descriptor
            .trim()
            .split_once(CHANNEL_SEPARATOR)
            .ok_or_else(invalid)?;

        if room.is_empty() || participant.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(room, participant))
    }

    /// Room code
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Participant name
    pub fn participant(&self) -> &str {
        &self.participant
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.room, CHANNEL_SEPARATOR, self.participant)
    }
}

impl FromStr for ChannelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
