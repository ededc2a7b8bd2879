//! Protocol constants

use std::time::Duration;

/// Frame delimiter. Guaranteed by the server never to occur inside a payload.
pub const MARKER: &[u8; MARKER_SIZE] = b"FLUX_EOF";

/// Marker length in bytes
pub const MARKER_SIZE: usize = 8;

/// Port the stream service listens on when the host page gives none
pub const DEFAULT_PORT: u16 = 8765;

/// Default host for the stream service
pub const DEFAULT_HOST: &str = "localhost";

/// How long the liveness probe waits for the connection to open
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Separator between room code and participant name in a channel identifier
pub const CHANNEL_SEPARATOR: char = '/';
