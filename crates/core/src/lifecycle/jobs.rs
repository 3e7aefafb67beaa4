//! Reading the provider's job listing.
//!
//! Like the cache check, the listing endpoint has no stable schema: the job
//! array may be the body itself or sit under one of a few envelope keys, ids
//! may be numbers or strings, and completion is signalled in several ways.

use serde_json::Value;

use crate::provider::cache::is_truthy;

use super::{DownloadStatus, JobSnapshot};

/// Envelope keys that may hold job arrays, read in order.
const LIST_KEYS: &[&str] = &["results", "torrents", "data"];

/// Provider status strings that mean the job failed.
const ERROR_STATES: &[&str] = &["error", "failed"];

/// Pull the job entries out of a listing body.
///
/// A bare array and every envelope array are concatenated, so a body that
/// splits jobs across `results` and `torrents` is read whole. Unrecognized
/// shapes yield no entries.
pub fn job_entries(listing: &Value) -> Vec<&Value> {
    let mut entries: Vec<&Value> = Vec::new();
    if let Some(items) = listing.as_array() {
        entries.extend(items);
    }
    for key in LIST_KEYS {
        if let Some(items) = listing.get(*key).and_then(Value::as_array) {
            entries.extend(items);
        }
    }
    entries
}

/// Normalize a provider id (number or string) to a string.
fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(
            n.as_u64()
                .map(|v| v.to_string())
                .or_else(|| n.as_i64().map(|v| v.to_string()))
                .unwrap_or_else(|| n.to_string()),
        ),
        _ => None,
    }
}

/// Id of a job entry in the listing.
pub fn job_id(entry: &Value) -> Option<String> {
    entry.get("id").and_then(normalize_id)
}

/// Job id from a creation response: `id` or `torrent_id`, at the top level
/// or inside a `data` envelope.
pub fn created_job_id(response: &Value) -> Option<String> {
    let from = |obj: &Value| {
        obj.get("id")
            .and_then(normalize_id)
            .or_else(|| obj.get("torrent_id").and_then(normalize_id))
    };
    from(response).or_else(|| response.get("data").and_then(from))
}

/// Find the entry describing a tracked download.
///
/// A known upstream id wins; otherwise the info hash is compared
/// case-insensitively.
pub fn find_job<'a>(
    entries: &[&'a Value],
    upstream_id: Option<&str>,
    info_hash: Option<&str>,
) -> Option<&'a Value> {
    if let Some(id) = upstream_id {
        if let Some(entry) = entries
            .iter()
            .find(|e| job_id(e).as_deref() == Some(id))
        {
            return Some(*entry);
        }
    }

    let hash = info_hash?;
    entries.iter().copied().find(|e| {
        e.get("hash")
            .and_then(Value::as_str)
            .is_some_and(|h| h.eq_ignore_ascii_case(hash))
    })
}

/// Map a provider entry onto the local status set.
pub fn classify_job(entry: &Value) -> DownloadStatus {
    let state = entry
        .get("status")
        .or_else(|| entry.get("download_state"))
        .and_then(Value::as_str)
        .map(str::to_lowercase);

    let progress = entry.get("progress").and_then(Value::as_f64);
    if progress.is_some_and(|p| p >= 100.0)
        || entry.get("completed").is_some_and(is_truthy)
        || state.as_deref() == Some("completed")
    {
        return DownloadStatus::Completed;
    }

    if entry.get("error").is_some_and(is_truthy)
        || state.as_deref().is_some_and(|s| ERROR_STATES.contains(&s))
    {
        return DownloadStatus::Error;
    }

    DownloadStatus::Downloading
}

/// Classify an entry into a snapshot ready to apply to a record.
pub fn snapshot_of(entry: &Value) -> JobSnapshot {
    JobSnapshot {
        status: classify_job(entry),
        upstream_id: job_id(entry),
        raw: entry.clone(),
    }
}
