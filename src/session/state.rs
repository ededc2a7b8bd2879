//! Session state machine
//!
//! ```text
//!  Connecting ──open──► Open ──close──► Closed
//!       │                                 ▲
//!       └──────────── close ──────────────┘
//! ```
//!
//! `Closed` is terminal; closing again is a no-op and keeps the first
//! reason.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, ProtocolError};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Socket connection in progress
    Connecting,
    /// Channel selected, frames flowing
    Open,
    /// Session ended
    Closed,
}

/// Why a session closed
///
/// Transport failures keep the underlying [`Error`]; it is shared so the
/// reason can be cloned into every state snapshot.
#[derive(Debug, Clone)]
pub enum CloseReason {
    /// Explicit teardown
    Requested,
    /// The server closed the connection
    RemoteClosed,
    /// The connection could not be established
    ConnectFailed(Arc<Error>),
    /// The socket failed while open
    SocketError(Arc<Error>),
    /// The server violated the stream protocol
    Protocol(ProtocolError),
}

impl CloseReason {
    /// Whether this reason indicates a failure
    pub fn is_error(&self) -> bool {
        !matches!(self, CloseReason::Requested)
    }

    /// The transport error behind this reason, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            CloseReason::ConnectFailed(e) | CloseReason::SocketError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

// Errors compare by identity: two reasons are equal only if they carry the
// same failure.
impl PartialEq for CloseReason {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CloseReason::Requested, CloseReason::Requested) => true,
            (CloseReason::RemoteClosed, CloseReason::RemoteClosed) => true,
            (CloseReason::ConnectFailed(a), CloseReason::ConnectFailed(b)) => Arc::ptr_eq(a, b),
            (CloseReason::SocketError(a), CloseReason::SocketError(b)) => Arc::ptr_eq(a, b),
            (CloseReason::Protocol(a), CloseReason::Protocol(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CloseReason {}

/// Classification consumed by a host status UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Not decided yet
    Pending,
    /// Stream is connected
    Connected,
    /// Stream is unavailable
    Error,
}

/// Complete session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Current phase
    pub phase: SessionPhase,

    /// Set once the session is closed
    pub close_reason: Option<CloseReason>,

    /// When the session was created
    pub created_at: Instant,

    /// When the connection opened
    pub opened_at: Option<Instant>,

    /// When the session closed
    pub closed_at: Option<Instant>,
}

impl SessionState {
    /// Create a new session state
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Connecting,
            close_reason: None,
            created_at: Instant::now(),
            opened_at: None,
            closed_at: None,
        }
    }

    /// Transition to open. Only valid from `Connecting`.
    pub fn open(&mut self) -> bool {
        if self.phase != SessionPhase::Connecting {
            return false;
        }
        self.phase = SessionPhase::Open;
        self.opened_at = Some(Instant::now());
        true
    }

    /// Transition to closed. Returns false if already closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if self.phase == SessionPhase::Closed {
            return false;
        }
        self.phase = SessionPhase::Closed;
        self.close_reason = Some(reason);
        self.closed_at = Some(Instant::now());
        true
    }

    /// Check if frames are being accepted
    pub fn is_open(&self) -> bool {
        self.phase == SessionPhase::Open
    }

    /// Check if the session has ended
    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Closed
    }

    /// Time spent open so far (or in total, once closed)
    pub fn open_duration(&self) -> Duration {
        match (self.opened_at, self.closed_at) {
            (Some(opened), Some(closed)) => closed.duration_since(opened),
            (Some(opened), None) => opened.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Status shown by the host page
    pub fn status(&self) -> ChannelStatus {
        match self.phase {
            SessionPhase::Connecting => ChannelStatus::Pending,
            SessionPhase::Open => ChannelStatus::Connected,
            SessionPhase::Closed => ChannelStatus::Error,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
