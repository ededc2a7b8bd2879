//! Marker demuxer
//!
//! Cuts frames out of a [`FrameBuffer`] at each marker occurrence:
//!
//! ```text
//!  buffer: | frame0 | MARKER | frame1 | MARKER | partial frame2 ...
//!           └─cut──┘ └─drop─┘ └─cut──┘ └─drop─┘ └─stays buffered─┘
//! ```
//!
//! The demuxer itself never waits. Callers decide when to pull the next
//! frame, which is how the session applies backpressure while a decode is
//! in flight: bytes keep arriving in the buffer, frames are only cut once
//! the renderer is free again.
//!
//! If the marker never appears the buffer grows without bound. The server
//! is trusted to emit markers at bounded intervals; sessions can opt into
//! a cap via `StreamConfig::max_buffer_size`.

use bytes::Bytes;

use super::buffer::FrameBuffer;
use crate::protocol::constants::MARKER;

/// One complete payload cut from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Position of this frame in the channel, starting at 0.
    /// Zero-length frames consume a sequence number too.
    pub sequence: u64,
    /// Payload bytes (zero-copy slice of the receive buffer)
    pub data: Bytes,
}

impl Frame {
    /// Create a frame
    pub fn new(sequence: u64, data: Bytes) -> Self {
        Self { sequence, data }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Zero-length frames carry nothing to render
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Extracts marker-delimited frames from a buffer
#[derive(Debug, Clone)]
pub struct MarkerDemuxer {
    marker: Bytes,
    next_sequence: u64,
}

impl MarkerDemuxer {
    /// Create a demuxer for the protocol marker
    pub fn new() -> Self {
        Self::with_marker(Bytes::from_static(MARKER))
    }

    /// Create a demuxer for a custom marker
    pub fn with_marker(marker: Bytes) -> Self {
        Self {
            marker,
            next_sequence: 0,
        }
    }

    /// The marker this demuxer splits on
    pub fn marker(&self) -> &[u8] {
        &self.marker
    }

    /// Number of frames cut so far, including zero-length ones
    pub fn frames_cut(&self) -> u64 {
        self.next_sequence
    }

    /// Whether another cut is worth attempting without new input.
    ///
    /// A buffer shorter than the marker cannot contain one.
    pub fn may_have_frame(&self, buffer: &FrameBuffer) -> bool {
        !self.marker.is_empty() && buffer.len() >= self.marker.len()
    }

    /// Cut the next frame out of `buffer`.
    ///
    /// Returns `None` when no complete frame is buffered; the partial bytes
    /// stay in place until more input arrives.
    pub fn next_frame(&mut self, buffer: &mut FrameBuffer) -> Option<Frame> {
        if !self.may_have_frame(buffer) {
            return None;
        }

        let index = buffer.find_marker(&self.marker)?;
        let data = buffer.split_prefix(index);
        buffer.consume_prefix(self.marker.len());

        let frame = Frame::new(self.next_sequence, data);
        self.next_sequence += 1;
        Some(frame)
    }

    /// Cut the next frame that has a payload, skipping zero-length ones.
    pub fn next_payload(&mut self, buffer: &mut FrameBuffer) -> Option<Frame> {
        loop {
            let frame = self.next_frame(buffer)?;
            if !frame.is_empty() {
                return Some(frame);
            }
            tracing::trace!(sequence = frame.sequence, "Skipping empty frame");
        }
    }
}

impl Default for MarkerDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(frames: &[&[u8]], tail: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for frame in frames {
            out.extend_from_slice(frame);
            out.extend_from_slice(MARKER);
        }
        out.extend_from_slice(tail);
        out
    }

    /// Feed `bytes` in chunks of `chunk` size, pulling every payload after
    /// each append, as a session with an idle renderer would.
    fn feed(bytes: &[u8], chunk: usize) -> (Vec<Vec<u8>>, FrameBuffer) {
        let mut buffer = FrameBuffer::new();
        let mut demuxer = MarkerDemuxer::new();
        let mut frames = Vec::new();

        for piece in bytes.chunks(chunk.max(1)) {
            buffer.append(piece);
            while let Some(frame) = demuxer.next_payload(&mut buffer) {
                frames.push(frame.data.to_vec());
            }
        }

        (frames, buffer)
    }

    #[test]
    fn test_two_frames_then_empty_buffer() {
        let mut buffer = FrameBuffer::new();
        buffer.append(&stream(&[&[0x01, 0x02], &[0x03]], &[]));

        let mut demuxer = MarkerDemuxer::new();
        let first = demuxer.next_frame(&mut buffer).unwrap();
        assert_eq!(&first.data[..], &[0x01, 0x02]);
        assert_eq!(first.sequence, 0);

        let second = demuxer.next_frame(&mut buffer).unwrap();
        assert_eq!(&second.data[..], &[0x03]);
        assert_eq!(second.sequence, 1);

        assert!(demuxer.next_frame(&mut buffer).is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_lone_marker_yields_nothing_renderable() {
        let mut buffer = FrameBuffer::new();
        buffer.append(MARKER);

        let mut demuxer = MarkerDemuxer::new();
        assert!(demuxer.next_payload(&mut buffer).is_none());
        assert!(buffer.is_empty());
        assert_eq!(demuxer.frames_cut(), 1);
    }

    #[test]
    fn test_any_chunking_yields_same_frames() {
        let frame0: &[u8] = &[0xFF, 0xD8, 0xAA, 0xBB, 0xFF, 0xD9];
        let frame1: &[u8] = b"F-LUX_ not a marker";
        let frame2: &[u8] = &[0x10, 0x20, 0x30];
        let bytes = stream(&[frame0, frame1], frame2);

        for chunk in 1..=bytes.len() {
            let (frames, buffer) = feed(&bytes, chunk);
            assert_eq!(frames, vec![frame0.to_vec(), frame1.to_vec()], "chunk={}", chunk);
            assert_eq!(buffer.as_slice(), frame2, "chunk={}", chunk);
        }
    }

    #[test]
    fn test_zero_length_frames_are_skipped_in_order() {
        let bytes = stream(&[&[], &[0x01], &[], &[], &[0x02]], &[]);

        for chunk in [1, 3, 8, bytes.len()] {
            let (frames, buffer) = feed(&bytes, chunk);
            assert_eq!(frames, vec![vec![0x01], vec![0x02]]);
            assert!(buffer.is_empty());
        }
    }

    #[test]
    fn test_marker_split_across_chunks() {
        let mut buffer = FrameBuffer::new();
        let mut demuxer = MarkerDemuxer::new();

        buffer.append(b"jpegFLUX");
        assert!(demuxer.next_frame(&mut buffer).is_none());
        assert_eq!(buffer.len(), 8);

        buffer.append(b"_EOFnext");
        let frame = demuxer.next_frame(&mut buffer).unwrap();
        assert_eq!(&frame.data[..], b"jpeg");
        assert_eq!(buffer.as_slice(), b"next");
    }

    #[test]
    fn test_deferred_extraction_keeps_accumulating() {
        // Renderer busy: bytes pile up, nothing is lost or reordered
        let mut buffer = FrameBuffer::new();
        let mut demuxer = MarkerDemuxer::new();

        buffer.append(&stream(&[b"a"], b""));
        buffer.append(&stream(&[b"b"], b""));
        buffer.append(&stream(&[b"c"], b"d"));

        let cut: Vec<_> = std::iter::from_fn(|| demuxer.next_payload(&mut buffer))
            .map(|f| f.data)
            .collect();
        assert_eq!(cut, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
        assert_eq!(buffer.as_slice(), b"d");
    }

    #[test]
    fn test_custom_marker() {
        let mut buffer = FrameBuffer::new();
        let mut demuxer = MarkerDemuxer::with_marker(Bytes::from_static(b"||"));
        buffer.append(b"one||two||");

        assert_eq!(demuxer.marker(), b"||");
        assert_eq!(&demuxer.next_frame(&mut buffer).unwrap().data[..], b"one");
        assert_eq!(&demuxer.next_frame(&mut buffer).unwrap().data[..], b"two");
        assert!(buffer.is_empty());
    }
}
