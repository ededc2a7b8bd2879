//! Stream protocol definitions
//!
//! The wire protocol is deliberately small: the client sends one text
//! message naming the channel, then receives an unbounded binary stream of
//! `frame MARKER frame MARKER ...`.

pub mod channel;
pub mod constants;

pub use channel::ChannelId;
pub use constants::*;
