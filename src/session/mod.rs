//! Channel sessions
//!
//! A session connects to the stream service, selects one channel and feeds
//! the received bytes through the demuxer into a renderer bound to a
//! display target.

pub mod channel;
pub mod state;

pub use channel::ChannelSession;
pub use state::{ChannelStatus, CloseReason, SessionPhase, SessionState};
