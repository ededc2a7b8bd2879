//! Per-session counters

use std::time::Duration;

use crate::render::RenderOutcome;

/// Session-level statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Total payload bytes received in binary messages
    pub bytes_received: u64,
    /// Number of binary messages received
    pub messages_received: u64,
    /// Non-binary messages that were ignored
    pub messages_ignored: u64,
    /// Frames installed on the display target
    pub frames_rendered: u64,
    /// Zero-length frames skipped
    pub empty_frames: u64,
    /// Frames that failed to decode
    pub decode_failures: u64,
    /// Largest buffer size observed
    pub peak_buffer_size: usize,
    /// Time spent in the open state
    pub open_duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one inbound binary message and the buffer size after it
    pub fn record_message(&mut self, len: usize, buffered: usize) {
        self.messages_received += 1;
        self.bytes_received += len as u64;
        self.peak_buffer_size = self.peak_buffer_size.max(buffered);
    }

    /// Record the result of a render
    pub fn record_render(&mut self, outcome: &RenderOutcome) {
        match outcome {
            RenderOutcome::Installed { .. } => self.frames_rendered += 1,
            RenderOutcome::Failed { .. } => self.decode_failures += 1,
        }
    }

    /// Frames per second over the open duration
    pub fn frame_rate(&self) -> f64 {
        let secs = self.open_duration.as_secs_f64();
        if secs > 0.0 {
            self.frames_rendered as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::render::ResourceId;

    #[test]
    fn test_record_message() {
        let mut stats = SessionStats::new();
        stats.record_message(100, 100);
        stats.record_message(50, 30);

        assert_eq!(stats.messages_received, 2);
        assert_eq!(stats.bytes_received, 150);
        assert_eq!(stats.peak_buffer_size, 100);
    }

    #[test]
    fn test_record_render() {
        let mut stats = SessionStats::new();
        stats.record_render(&RenderOutcome::Installed {
            id: ResourceId(1),
            sequence: 0,
            replaced: None,
        });
        stats.record_render(&RenderOutcome::Failed {
            sequence: 1,
            error: DecodeError::Aborted,
        });

        assert_eq!(stats.frames_rendered, 1);
        assert_eq!(stats.decode_failures, 1);
    }

    #[test]
    fn test_frame_rate() {
        let mut stats = SessionStats::new();
        assert_eq!(stats.frame_rate(), 0.0);

        stats.frames_rendered = 50;
        stats.open_duration = Duration::from_secs(10);
        assert_eq!(stats.frame_rate(), 5.0);
    }
}
