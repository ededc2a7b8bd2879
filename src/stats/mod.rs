//! Statistics for channel sessions

pub mod metrics;

pub use metrics::SessionStats;
