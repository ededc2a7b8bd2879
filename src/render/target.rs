//! Display targets
//!
//! A target is whatever shows a channel's frames: an `<img>` element on a
//! page, a window, a file on disk. Targets optionally carry the channel
//! descriptor that selects which stream they show.

use std::sync::Arc;

use parking_lot::Mutex;

use super::resource::{DisplayedResource, ResourceId};

/// Receives decoded frames for one channel
///
/// `present` and `release` are called from the session's async task and
/// must return quickly. Slow work such as file or GPU I/O belongs on a
/// separate task or `tokio::task::spawn_blocking`; blocking here stalls the
/// socket reads of that session and a runtime worker thread.
pub trait DisplayTarget: Send + Sync + 'static {
    /// Channel descriptor (`<room>/<participant>`) attached to this target,
    /// or `None` if it does not display a stream.
    fn descriptor(&self) -> Option<String>;

    /// Show `resource`, replacing whatever was shown before.
    fn present(&self, resource: Arc<DisplayedResource>);

    /// Free a resource that is no longer shown.
    ///
    /// Called exactly once per presented resource, after its replacement
    /// was presented or on teardown.
    fn release(&self, resource: &DisplayedResource);
}

#[derive(Debug, Default)]
struct MemoryState {
    current: Option<Arc<DisplayedResource>>,
    presented: Vec<ResourceId>,
    released: Vec<ResourceId>,
}

/// In-memory target that keeps the current resource and a history of
/// present/release calls
#[derive(Debug, Default)]
pub struct MemoryTarget {
    descriptor: Option<String>,
    state: Mutex<MemoryState>,
}

impl MemoryTarget {
    /// Create a target with no channel descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target bound to a channel descriptor
    pub fn with_descriptor(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: Some(descriptor.into()),
            state: Mutex::default(),
        }
    }

    /// Resource currently shown, if any.
    ///
    /// Stays set after release so the last frame remains visible; check
    /// [`MemoryTarget::live`] for resources not yet released.
    pub fn current(&self) -> Option<Arc<DisplayedResource>> {
        self.state.lock().current.clone()
    }

    /// IDs of all presented resources, in order
    pub fn presented(&self) -> Vec<ResourceId> {
        self.state.lock().presented.clone()
    }

    /// IDs of all released resources, in order
    pub fn released(&self) -> Vec<ResourceId> {
        self.state.lock().released.clone()
    }

    /// IDs presented but not yet released
    pub fn live(&self) -> Vec<ResourceId> {
        let state = self.state.lock();
        state
            .presented
            .iter()
            .filter(|id| !state.released.contains(id))
            .copied()
            .collect()
    }
}

impl DisplayTarget for MemoryTarget {
    fn descriptor(&self) -> Option<String> {
        self.descriptor.clone()
    }

    fn present(&self, resource: Arc<DisplayedResource>) {
        let mut state = self.state.lock();
        state.presented.push(resource.id);
        state.current = Some(resource);
    }

    fn release(&self, resource: &DisplayedResource) {
        let mut state = self.state.lock();
        if state.released.contains(&resource.id) {
            tracing::warn!(resource = %resource.id, "Resource released twice");
        }
        state.released.push(resource.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::resource::ResourceContent;

    fn resource(id: u64) -> Arc<DisplayedResource> {
        Arc::new(DisplayedResource::new(
            ResourceId(id),
            id,
            ResourceContent::DataUrl(String::new()),
        ))
    }

    #[test]
    fn test_memory_target_history() {
        let target = MemoryTarget::with_descriptor("R/p");
        assert_eq!(target.descriptor().as_deref(), Some("R/p"));
        assert!(target.current().is_none());

        target.present(resource(1));
        target.present(resource(2));
        target.release(&resource(1));

        assert_eq!(target.current().unwrap().id, ResourceId(2));
        assert_eq!(target.presented(), vec![ResourceId(1), ResourceId(2)]);
        assert_eq!(target.released(), vec![ResourceId(1)]);
        assert_eq!(target.live(), vec![ResourceId(2)]);
    }

    #[test]
    fn test_plain_target_has_no_descriptor() {
        assert!(MemoryTarget::new().descriptor().is_none());
    }
}
