//! Download provider abstraction.
//!
//! This module provides a `DownloadProvider` trait for remote (debrid)
//! download services, the TorBox client, and the cache status resolver
//! that interprets the provider's loosely specified availability answers.

pub mod cache;
mod torbox;
mod types;

pub use cache::{interpret_cached_response, record_is_cached, CacheStatusMap, CacheStatusResolver};
pub use torbox::TorBoxClient;
pub use types::*;
