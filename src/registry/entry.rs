//! Registry entries

use std::sync::Arc;

use crate::render::DisplayTarget;
use crate::session::{ChannelSession, ChannelStatus};

/// A display target and the session feeding it
pub struct SessionEntry {
    /// Target the session renders to
    pub target: Arc<dyn DisplayTarget>,
    /// The session itself
    pub session: ChannelSession,
}

impl SessionEntry {
    /// Create an entry
    pub(super) fn new(target: Arc<dyn DisplayTarget>, session: ChannelSession) -> Self {
        Self { target, session }
    }

    /// Status of the session
    pub fn status(&self) -> ChannelStatus {
        self.session.status()
    }
}

impl std::fmt::Debug for SessionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEntry")
            .field("session", &self.session)
            .finish()
    }
}
