//! Client for live image streams multiplexed over WebSocket channels
//!
//! A stream service sends, per channel, an unbounded sequence of binary
//! messages whose concatenation is `frame0 MARKER frame1 MARKER ...`, where
//! each frame is a complete still image (usually JPEG). This crate connects
//! to the service, selects a channel, cuts frames out of the byte stream,
//! decodes them one at a time and hands the result to a display target.
//!
//! ```text
//!  socket bytes ──► FrameBuffer ──► MarkerDemuxer ──► Renderer ──► DisplayTarget
//!                        ▲                                │
//!                        └──────── backpressure ◄─────────┘
//! ```
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use flux_rs::{DisplayTarget, MemoryTarget, SessionRegistry, StreamConfig};
//!
//! # async fn example() -> flux_rs::error::Result<()> {
//! let config = StreamConfig::from_attributes([("data-port", "8765"), ("data-actif", "1")])?;
//! let targets: Vec<Arc<dyn DisplayTarget>> =
//!     vec![Arc::new(MemoryTarget::with_descriptor("ABCD/alice"))];
//!
//! let registry = SessionRegistry::start(config, targets);
//! registry.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod media;
pub mod protocol;
pub mod registry;
pub mod render;
pub mod session;
pub mod stats;

pub use client::{probe, StreamConfig};
pub use error::{Error, Result};
pub use media::{Frame, FrameBuffer, MarkerDemuxer};
pub use protocol::ChannelId;
pub use registry::SessionRegistry;
pub use render::{
    DataUrlDecoder, DisplayTarget, DisplayedResource, FrameDecoder, MemoryTarget, PixelDecoder,
    Renderer,
};
pub use session::{ChannelSession, ChannelStatus, SessionPhase, SessionState};
