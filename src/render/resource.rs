//! Displayed resources
//!
//! A resource is the decoded, displayable form of one frame. Resources are
//! handed to targets behind an `Arc`, so presenting one is cheap and a
//! target may keep it around until it is told to release it.

use std::fmt;

use bytes::Bytes;

/// Identifier of a resource, unique within one renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decoded frame content
#[derive(Clone, PartialEq, Eq)]
pub enum ResourceContent {
    /// `data:<mime>;base64,<payload>` URL, ready for an `<img src>`
    DataUrl(String),
    /// Decoded RGBA8 pixels, row-major
    Pixels {
        width: u32,
        height: u32,
        rgba: Bytes,
    },
}

impl ResourceContent {
    /// Approximate memory held by this content in bytes
    pub fn size(&self) -> usize {
        match self {
            ResourceContent::DataUrl(url) => url.len(),
            ResourceContent::Pixels { rgba, .. } => rgba.len(),
        }
    }
}

impl fmt::Debug for ResourceContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads are large; print their shape only
        match self {
            ResourceContent::DataUrl(url) => {
                let header = url.split_once(',').map(|(h, _)| h).unwrap_or(url.as_str());
                f.debug_struct("DataUrl")
                    .field("header", &header)
                    .field("len", &url.len())
                    .finish()
            }
            ResourceContent::Pixels { width, height, rgba } => f
                .debug_struct("Pixels")
                .field("width", width)
                .field("height", height)
                .field("len", &rgba.len())
                .finish(),
        }
    }
}

/// A decoded frame bound (or about to be bound) to a display target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedResource {
    /// Resource identifier
    pub id: ResourceId,
    /// Sequence number of the frame it was decoded from
    pub sequence: u64,
    /// Decoded content
    pub content: ResourceContent,
}

impl DisplayedResource {
    /// Create a resource
    pub fn new(id: ResourceId, sequence: u64, content: ResourceContent) -> Self {
        Self {
            id,
            sequence,
            content,
        }
    }
}
