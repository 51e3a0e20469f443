//! Core library for fis - upstream fetching, index aggregation, response
//! caching, and the branch/version directory.
//!
//! # Architecture
//!
//! - [`upstream`] talks to the download tree: it fetches and parses
//!   `Packages` indexes, `feeds.conf` feed lists, and `profiles.json`
//!   target metadata.
//! - [`aggregate`] merges those documents into the two externally visible
//!   index shapes (whole-target and per-architecture).
//! - [`cache`] memoizes responses for a bounded time, keyed by request
//!   path.
//! - [`store`] and [`directory`] read branch/version membership from the
//!   shared store and assemble the directory listing.

pub mod aggregate;
pub mod cache;
pub mod directory;
pub mod kmod;
pub mod store;
pub mod upstream;

pub use aggregate::{AggregateError, Aggregator};
pub use cache::ResponseCache;
pub use store::{BranchStore, FileStore, MemoryStore, StoreError};
pub use upstream::{UpstreamClient, UpstreamError};

/// User Agent string for upstream requests
pub const USER_AGENT: &str = concat!("fis-core/", env!("CARGO_PKG_VERSION"));
