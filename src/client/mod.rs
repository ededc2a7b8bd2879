//! Stream service client
//!
//! Connection settings shared by every channel on a page, and the liveness
//! probe used to report whether the service is reachable.

pub mod config;
pub mod probe;

pub use config::StreamConfig;
pub use probe::{probe, probe_service};
