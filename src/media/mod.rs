//! Byte stream framing
//!
//! Inbound socket messages are appended to a [`FrameBuffer`]; the
//! [`MarkerDemuxer`] cuts complete [`Frame`]s out of it at each marker.

pub mod buffer;
pub mod demux;

pub use buffer::FrameBuffer;
pub use demux::{Frame, MarkerDemuxer};
