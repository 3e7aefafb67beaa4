//! Torrent search abstraction.
//!
//! This module provides a `Searcher` trait for querying a torrent aggregator
//! (Jackett) and the ranking engine that orders its raw candidates.

mod jackett;
pub mod ranking;
mod types;

pub use jackett::JackettSearcher;
pub use ranking::{human_size, rank_candidates, score_candidate, score_quality, score_size};
pub use types::*;
