//! Append-only frame buffer
//!
//! Holds bytes received from the socket that have not yet been attributed
//! to a complete frame. Bytes are never reordered; only a contiguous prefix
//! is ever removed.

use bytes::{Buf, Bytes, BytesMut};

/// Growable byte buffer with marker search
#[derive(Debug, Default)]
pub struct FrameBuffer {
    data: BytesMut,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Append bytes to the end of the buffer
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Find the start offset of the first occurrence of `marker`.
    ///
    /// Candidates are located by their first byte before the rest of the
    /// marker is compared. An empty marker never matches.
    pub fn find_marker(&self, marker: &[u8]) -> Option<usize> {
        let (&first, rest) = marker.split_first()?;
        if self.data.len() < marker.len() {
            return None;
        }

        let last_start = self.data.len() - marker.len();
        let mut from = 0;

        while from <= last_start {
            let candidate = from + self.data[from..=last_start]
                .iter()
                .position(|&b| b == first)?;

            let tail = candidate + 1;
            if &self.data[tail..tail + rest.len()] == rest {
                return Some(candidate);
            }
            from = candidate + 1;
        }

        None
    }

    /// Remove and return the bytes strictly before `offset`.
    ///
    /// `offset` is clamped to the buffer length.
    pub fn split_prefix(&mut self, offset: usize) -> Bytes {
        let offset = offset.min(self.data.len());
        self.data.split_to(offset).freeze()
    }

    /// Discard the bytes strictly before `offset`.
    pub fn consume_prefix(&mut self, offset: usize) {
        let offset = offset.min(self.data.len());
        self.data.advance(offset);
    }

    /// Currently buffered bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
