//! Session registry
//!
//! Discovers display targets that carry a channel descriptor, runs one
//! [`ChannelSession`](crate::session::ChannelSession) per target and tears
//! all of them down together.
//!
//! ```text
//!                    SessionRegistry
//!             ┌──────────────────────────────┐
//!             │ service status (probe)       │
//!             │ entries: [SessionEntry {     │
//!             │     target, session,         │
//!             │ }]                           │
//!             └──────┬───────────────┬───────┘
//!                    ▼               ▼
//!             [ChannelSession] [ChannelSession]
//!                    │               │
//!                 target A        target B
//! ```

pub mod entry;
pub mod store;

pub use entry::SessionEntry;
pub use store::SessionRegistry;
