//! Frame rendering
//!
//! A [`Renderer`] turns raw frame payloads into [`DisplayedResource`]s with
//! a pluggable [`FrameDecoder`] and binds them to a [`DisplayTarget`].
//! At most one decode is in flight per renderer, and the previous resource
//! is released only once its replacement has been presented.

pub mod decoder;
pub mod renderer;
pub mod resource;
pub mod target;

pub use decoder::{DataUrlDecoder, FrameDecoder, PixelDecoder};
pub use renderer::{RenderOutcome, Renderer, Submit};
pub use resource::{DisplayedResource, ResourceContent, ResourceId};
pub use target::{DisplayTarget, MemoryTarget};
