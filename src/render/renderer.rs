//! Frame renderer
//!
//! Decodes one frame at a time on the blocking pool and installs the result
//! on the display target. The caller drives it:
//!
//! 1. [`Renderer::submit`] starts a decode if the renderer is idle.
//! 2. [`Renderer::settle`] waits for it and installs the resource.
//! 3. Only then is the next frame submitted.
//!
//! The previous resource is released right after its replacement has been
//! presented, so the target never goes blank and nothing leaks.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::decoder::FrameDecoder;
use super::resource::{DisplayedResource, ResourceContent, ResourceId};
use super::target::DisplayTarget;
use crate::error::DecodeError;
use crate::media::Frame;

/// Result of handing a frame to the renderer
#[derive(Debug, PartialEq, Eq)]
pub enum Submit {
    /// Decode started
    Started,
    /// Zero-length frame, nothing to decode
    Skipped,
    /// A decode is already in flight; the frame is handed back
    Busy(Frame),
}

/// Result of a completed decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The frame is now the displayed resource
    Installed {
        id: ResourceId,
        sequence: u64,
        replaced: Option<ResourceId>,
    },
    /// The frame could not be decoded; the previous resource stays visible
    Failed { sequence: u64, error: DecodeError },
}

struct InFlight {
    sequence: u64,
    handle: JoinHandle<Result<ResourceContent, DecodeError>>,
}

/// Per-channel renderer with a single decode slot
pub struct Renderer {
    decoder: Arc<dyn FrameDecoder>,
    target: Arc<dyn DisplayTarget>,
    in_flight: Option<InFlight>,
    active: Option<Arc<DisplayedResource>>,
    next_id: u64,
}

impl Renderer {
    /// Create a renderer drawing to `target`
    pub fn new(decoder: Arc<dyn FrameDecoder>, target: Arc<dyn DisplayTarget>) -> Self {
        Self {
            decoder,
            target,
            in_flight: None,
            active: None,
            next_id: 1,
        }
    }

    /// Check if a decode is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Resource currently installed on the target
    pub fn active(&self) -> Option<&Arc<DisplayedResource>> {
        self.active.as_ref()
    }

    /// Start decoding `frame`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, frame: Frame) -> Submit {
        if frame.is_empty() {
            return Submit::Skipped;
        }
        if self.is_busy() {
            return Submit::Busy(frame);
        }

        tracing::trace!(sequence = frame.sequence, bytes = frame.len(), "Decoding frame");

        let decoder = Arc::clone(&self.decoder);
        let data = frame.data;
        let handle = tokio::task::spawn_blocking(move || decoder.decode(&data));

        self.in_flight = Some(InFlight {
            sequence: frame.sequence,
            handle,
        });
        Submit::Started
    }

    /// Wait for the in-flight decode and install its result.
    ///
    /// Returns `None` immediately when idle. Cancel safe: dropping the
    /// future leaves the decode in flight.
    pub async fn settle(&mut self) -> Option<RenderOutcome> {
        let in_flight = self.in_flight.as_mut()?;
        let sequence = in_flight.sequence;
        let joined = (&mut in_flight.handle).await;
        self.in_flight = None;

        let outcome = match joined {
            Ok(Ok(content)) => self.install(sequence, content),
            Ok(Err(error)) => {
                tracing::error!(sequence = sequence, error = %error, "Failed to decode frame");
                RenderOutcome::Failed { sequence, error }
            }
            Err(e) => {
                tracing::error!(sequence = sequence, error = %e, "Decode task failed");
                RenderOutcome::Failed {
                    sequence,
                    error: DecodeError::Aborted,
                }
            }
        };

        Some(outcome)
    }

    fn install(&mut self, sequence: u64, content: ResourceContent) -> RenderOutcome {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        let bytes = content.size();

        let resource = Arc::new(DisplayedResource::new(id, sequence, content));
        self.target.present(Arc::clone(&resource));

        let replaced = self.active.replace(resource).map(|old| {
            self.target.release(&old);
            old.id
        });

        tracing::debug!(sequence = sequence, resource = %id, bytes = bytes, "Frame displayed");

        RenderOutcome::Installed {
            id,
            sequence,
            replaced,
        }
    }

    /// Drop the in-flight decode, if any. Its result is discarded.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(sequence = in_flight.sequence, "Discarding in-flight decode");
            in_flight.handle.abort();
        }
    }

    /// Cancel any decode and release the active resource. Idempotent.
    pub fn release(&mut self) {
        self.cancel();
        if let Some(resource) = self.active.take() {
            self.target.release(&resource);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("busy", &self.is_busy())
            .field("active", &self.active.as_ref().map(|r| r.id))
            .field("next_id", &self.next_id)
            .finish()
    }
}
