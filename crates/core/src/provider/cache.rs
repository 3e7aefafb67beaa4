//! Cache status resolution.
//!
//! The provider's "checkcached" response schema is only loosely documented,
//! so the body is read through an ordered list of shape matchers. Each one
//! recognizes a single layout and yields `(hash, cached)` pairs; pairs are
//! merged in order, later matchers overriding earlier ones. A body no matcher
//! recognizes yields no information, which callers read as "not cached".

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::metrics::CACHE_LOOKUPS;

use super::DownloadProvider;

/// Info hash (lowercase) to "instantly available" flag. Absent means unknown.
pub type CacheStatusMap = HashMap<String, bool>;

/// Extracts `(hash, cached)` pairs from one response layout.
type ShapeMatcher = fn(&Value, &HashSet<String>) -> Vec<(String, bool)>;

/// Recognized layouts, tried in order.
const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("direct_keys", match_direct_keys),
    ("results_object", match_results_object),
    ("results_array", match_results_array),
    ("data_object", match_data_object),
    ("data_array", match_data_array),
];

/// Flags whose truthiness marks a record as cached.
const CACHED_FLAGS: &[&str] = &["cached", "is_cached", "isCached", "cache", "found"];

static HASH_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-f0-9]{32,40}|[a-z2-7]{32})$").expect("valid hash key regex")
});

/// Answers which info hashes the provider can serve instantly.
///
/// Never fails: a disabled provider, a transport error or an unreadable body
/// all degrade to an empty map.
pub struct CacheStatusResolver {
    provider: Arc<dyn DownloadProvider>,
}

impl CacheStatusResolver {
    pub fn new(provider: Arc<dyn DownloadProvider>) -> Self {
        Self { provider }
    }

    /// Resolve cache status for a batch of info hashes (case-insensitive,
    /// duplicates ignored) with at most one provider request.
    pub async fn resolve<I, S>(&self, info_hashes: I) -> CacheStatusMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<String> = info_hashes
            .into_iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .filter(|h| !h.is_empty() && seen.insert(h.clone()))
            .collect();

        if unique.is_empty() || !self.provider.has_credential() {
            CACHE_LOOKUPS.with_label_values(&["skipped"]).inc();
            return CacheStatusMap::new();
        }

        let body = match self.provider.check_cached_batch(&unique).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Bulk cache check failed, continuing without cache info"
                );
                CACHE_LOOKUPS.with_label_values(&["failed"]).inc();
                return CacheStatusMap::new();
            }
        };

        let statuses = interpret_cached_response(&body, &seen);
        debug!(
            requested = unique.len(),
            located = statuses.len(),
            cached = statuses.values().filter(|c| **c).count(),
            "Bulk cache check complete"
        );
        CACHE_LOOKUPS.with_label_values(&["ok"]).inc();
        statuses
    }
}

/// Interpret a cache-check response body.
///
/// `requested` holds the lowercase hashes that were asked for; top-level keys
/// matching one of them are accepted even when they don't look like a hash.
pub fn interpret_cached_response(body: &Value, requested: &HashSet<String>) -> CacheStatusMap {
    let mut out = CacheStatusMap::new();
    if !body.is_object() {
        return out;
    }

    for (shape, matcher) in SHAPE_MATCHERS {
        let found = matcher(body, requested);
        if !found.is_empty() {
            debug!(shape = *shape, entries = found.len(), "Cache response shape matched");
        }
        out.extend(found);
    }
    out
}

/// Whether a single record carries any "cached" indicator.
pub fn record_is_cached(record: &Value) -> bool {
    let Some(obj) = record.as_object() else {
        return false;
    };

    CACHED_FLAGS
        .iter()
        .any(|flag| obj.get(*flag).is_some_and(is_truthy))
        || obj.get("status").and_then(Value::as_str) == Some("cached")
        || obj.get("available") == Some(&Value::Bool(true))
}

/// Loose truthiness, as the provider's flags are not consistently typed.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn keyed_entries(obj: &Map<String, Value>, requested: &HashSet<String>) -> Vec<(String, bool)> {
    obj.iter()
        .filter_map(|(key, record)| {
            let hash = key.to_lowercase();
            (HASH_KEY.is_match(key) || requested.contains(&hash))
                .then(|| (hash, record_is_cached(record)))
        })
        .collect()
}

fn array_entries(items: &[Value]) -> Vec<(String, bool)> {
    items
        .iter()
        .filter_map(|item| {
            let hash = item.get("hash")?.as_str()?;
            Some((hash.to_lowercase(), record_is_cached(item)))
        })
        .collect()
}

fn match_direct_keys(body: &Value, requested: &HashSet<String>) -> Vec<(String, bool)> {
    body.as_object()
        .map(|obj| keyed_entries(obj, requested))
        .unwrap_or_default()
}

fn match_results_object(body: &Value, requested: &HashSet<String>) -> Vec<(String, bool)> {
    body.get("results")
        .and_then(Value::as_object)
        .map(|obj| keyed_entries(obj, requested))
        .unwrap_or_default()
}

fn match_results_array(body: &Value, _requested: &HashSet<String>) -> Vec<(String, bool)> {
    body.get("results")
        .and_then(Value::as_array)
        .map(|items| array_entries(items))
        .unwrap_or_default()
}

fn match_data_object(body: &Value, requested: &HashSet<String>) -> Vec<(String, bool)> {
    body.get("data")
        .and_then(Value::as_object)
        .map(|obj| keyed_entries(obj, requested))
        .unwrap_or_default()
}

fn match_data_array(body: &Value, _requested: &HashSet<String>) -> Vec<(String, bool)> {
    body.get("data")
        .and_then(Value::as_array)
        .map(|items| array_entries(items))
        .unwrap_or_default()
}
