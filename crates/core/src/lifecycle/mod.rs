//! Download lifecycle tracking.
//!
//! A download is created on the remote provider, recorded locally under a
//! fresh id, and reconciled against the provider's job listing whenever its
//! status is requested. Completed and errored records are frozen.

mod jobs;
mod store;
mod tracker;
mod types;

pub use jobs::{classify_job, created_job_id, find_job, job_entries, job_id, snapshot_of};
pub use store::{DownloadStore, MemoryDownloadStore, StoreError};
pub use tracker::{DownloadSubscription, DownloadTracker, DEFAULT_LIST_LIMIT, DEFAULT_POLL_INTERVAL};
pub use types::*;
