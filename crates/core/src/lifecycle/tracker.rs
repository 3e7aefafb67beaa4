//! Download tracker implementation.
//!
//! Creates provider jobs, keeps one local record per job, and reconciles
//! records against the provider's job listing on demand. Pushing updates to
//! a subscriber is a loop over the same on-demand reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::magnet::{extract_info_hash, is_magnet};
use crate::metrics::{JOBS_CREATED, STATUS_POLLS, STATUS_TRANSITIONS, SUBSCRIPTIONS_ACTIVE};
use crate::provider::{CreateJobRequest, DownloadProvider};

use super::jobs::{created_job_id, find_job, job_entries, snapshot_of};
use super::store::DownloadStore;
use super::types::{
    AddDownloadOutcome, AddDownloadRequest, DownloadEvent, DownloadRecord, LifecycleError,
};

/// Default interval between polls of a subscription.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default page size when listing provider jobs.
pub const DEFAULT_LIST_LIMIT: u32 = 1000;

/// Buffered events per subscription before the poller waits.
const SUBSCRIPTION_BUFFER: usize = 8;

/// Tracks downloads created on the remote provider.
///
/// Cheap to clone; clones share the same store and provider.
#[derive(Clone)]
pub struct DownloadTracker {
    store: Arc<dyn DownloadStore>,
    provider: Arc<dyn DownloadProvider>,
    poll_interval: Duration,
    list_limit: u32,
}

impl DownloadTracker {
    pub fn new(store: Arc<dyn DownloadStore>, provider: Arc<dyn DownloadProvider>) -> Self {
        Self {
            store,
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Set the interval between subscription polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many jobs are requested from the provider listing.
    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit;
        self
    }

    /// Create a provider job for a magnet and start tracking it.
    ///
    /// Nothing is stored when job creation fails. A failing cache pre-check
    /// only drops the `cached` field from the outcome.
    pub async fn add(
        &self,
        request: AddDownloadRequest,
    ) -> Result<AddDownloadOutcome, LifecycleError> {
        let magnet = request.magnet.trim();
        if magnet.is_empty() {
            return Err(LifecycleError::Validation("magnet is required".to_string()));
        }
        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if !is_magnet(magnet) {
            debug!(descriptor = %magnet, "Not a magnet link, skipping cache pre-check");
        }

        let cached = match extract_info_hash(magnet) {
            Some(hash) if self.provider.has_credential() => {
                match self.provider.check_cached(&hash).await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        debug!(hash = %hash, error = %e, "Cache pre-check failed");
                        None
                    }
                }
            }
            _ => None,
        };

        let mut job =
            CreateJobRequest::new(magnet).with_add_only_if_cached(request.only_cached);
        if let Some(name) = &name {
            job = job.with_name(name.clone());
        }

        let response = match self.provider.create_job(&job).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Job creation failed");
                JOBS_CREATED.with_label_values(&["failed"]).inc();
                return Err(e.into());
            }
        };

        let local_id = Uuid::new_v4().to_string();
        let record = DownloadRecord::new(
            local_id.clone(),
            magnet,
            name,
            created_job_id(&response),
        );
        info!(
            local_id = %local_id,
            upstream_id = ?record.upstream_id,
            info_hash = ?record.info_hash,
            "Tracking new download"
        );
        self.store.insert(record).await?;
        JOBS_CREATED.with_label_values(&["success"]).inc();

        Ok(AddDownloadOutcome {
            local_id,
            cached,
            provider_response: response,
        })
    }

    /// Current state of a record, reconciled with the provider listing.
    ///
    /// Terminal records are returned without contacting the provider. A
    /// listing failure or an unmatched record returns the stored state.
    pub async fn status(&self, local_id: &str) -> Result<DownloadRecord, LifecycleError> {
        let record = self
            .store
            .get(local_id)
            .await
            .ok_or_else(|| LifecycleError::NotFound(local_id.to_string()))?;

        if record.is_terminal() {
            STATUS_POLLS.with_label_values(&["terminal"]).inc();
            return Ok(record);
        }

        let listing = match self.provider.list_jobs(0, self.list_limit).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(local_id = %local_id, error = %e, "Failed to list provider jobs");
                STATUS_POLLS.with_label_values(&["failed"]).inc();
                return Ok(record);
            }
        };

        let entries = job_entries(&listing);
        let Some(entry) = find_job(
            &entries,
            record.upstream_id.as_deref(),
            record.info_hash.as_deref(),
        ) else {
            debug!(local_id = %local_id, jobs = entries.len(), "Download not in provider listing");
            STATUS_POLLS.with_label_values(&["unmatched"]).inc();
            return Ok(record);
        };

        STATUS_POLLS.with_label_values(&["matched"]).inc();
        let updated = self
            .store
            .apply_snapshot(local_id, snapshot_of(entry))
            .await?;

        if updated.status != record.status {
            info!(
                local_id = %local_id,
                from = record.status.as_str(),
                to = updated.status.as_str(),
                "Download status changed"
            );
            STATUS_TRANSITIONS
                .with_label_values(&[record.status.as_str(), updated.status.as_str()])
                .inc();
        }

        Ok(updated)
    }

    /// All tracked records, newest first. Never contacts the provider.
    pub async fn list(&self) -> Vec<DownloadRecord> {
        self.store.list().await
    }

    /// Start pushing updates for a record.
    ///
    /// The first poll happens immediately. Each poll yields one
    /// [`DownloadEvent::Update`]; after a terminal update a single
    /// [`DownloadEvent::Done`] follows and the subscription ends. Dropping the
    /// subscription stops polling.
    pub async fn subscribe(&self, local_id: &str) -> Result<DownloadSubscription, LifecycleError> {
        if self.store.get(local_id).await.is_none() {
            return Err(LifecycleError::NotFound(local_id.to_string()));
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let task = tokio::spawn(run_subscription(self.clone(), local_id.to_string(), tx));

        Ok(DownloadSubscription { receiver: rx, task })
    }
}

/// A live stream of updates for one record.
pub struct DownloadSubscription {
    receiver: mpsc::Receiver<DownloadEvent>,
    task: JoinHandle<()>,
}

impl DownloadSubscription {
    /// Next event, or `None` once the subscription has ended.
    pub async fn next(&mut self) -> Option<DownloadEvent> {
        self.receiver.recv().await
    }

    /// Adapt into a [`futures::Stream`].
    pub fn into_stream(self) -> impl futures::Stream<Item = DownloadEvent> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|event| (event, sub))
        })
    }
}

impl Drop for DownloadSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keeps the active-subscription gauge honest even if the task is aborted.
struct ActiveSubscription;

impl ActiveSubscription {
    fn enter() -> Self {
        SUBSCRIPTIONS_ACTIVE.inc();
        Self
    }
}

impl Drop for ActiveSubscription {
    fn drop(&mut self) {
        SUBSCRIPTIONS_ACTIVE.dec();
    }
}

async fn run_subscription(
    tracker: DownloadTracker,
    local_id: String,
    tx: mpsc::Sender<DownloadEvent>,
) {
    let _active = ActiveSubscription::enter();
    debug!(local_id = %local_id, "Subscription started");

    loop {
        match tracker.status(&local_id).await {
            Ok(record) => {
                let terminal = record.is_terminal();
                if tx.send(DownloadEvent::Update(record)).await.is_err() {
                    break;
                }
                if terminal {
                    let _ = tx.send(DownloadEvent::Done).await;
                    break;
                }
            }
            Err(e) => warn!(local_id = %local_id, error = %e, "Subscription poll failed"),
        }

        tokio::select! {
            _ = tx.closed() => break,
            _ = tokio::time::sleep(tracker.poll_interval) => {}
        }
    }

    debug!(local_id = %local_id, "Subscription ended");
}
