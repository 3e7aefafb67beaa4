//! Candidate ranking.
//!
//! Score = seeders * 2 + quality (from the title) + size sanity. The order is
//! a stable descending sort, so equal scores keep the aggregator's order.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{Candidate, RankedCandidate};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Releases at or below this size are treated as probable fakes.
const MIN_PLAUSIBLE_GB: f64 = 0.7;
const MAX_SIZE_BONUS: f64 = 8.0;
const SMALL_SIZE_PENALTY: f64 = -10.0;
const SEEDER_WEIGHT: f64 = 2.0;

fn title_regex(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("valid title regex")
}

static RES_2160: Lazy<Regex> = Lazy::new(|| title_regex(r"2160p|4k"));
static RES_1080: Lazy<Regex> = Lazy::new(|| title_regex(r"1080p"));
static RES_720: Lazy<Regex> = Lazy::new(|| title_regex(r"720p"));
static REMUX: Lazy<Regex> = Lazy::new(|| title_regex(r"remux"));
static BLURAY: Lazy<Regex> = Lazy::new(|| title_regex(r"blu-?ray|b[dr]rip"));
static MODERN_CODEC: Lazy<Regex> = Lazy::new(|| title_regex(r"\b(h\.?265|x265|hevc)\b"));
static LEGACY_CODEC: Lazy<Regex> = Lazy::new(|| title_regex(r"\b(h\.?264|x264|avc)\b"));
static LOW_QUALITY: Lazy<Regex> = Lazy::new(|| title_regex(r"\b(cam|telesync|ts|hdcam)\b"));

/// Quality sub-score from release title keywords.
///
/// Resolution tiers are exclusive (the highest match wins); source, codec
/// and capture adjustments are cumulative.
pub fn score_quality(title: &str) -> f64 {
    let mut score = if RES_2160.is_match(title) {
        60.0
    } else if RES_1080.is_match(title) {
        35.0
    } else if RES_720.is_match(title) {
        15.0
    } else {
        0.0
    };

    if REMUX.is_match(title) {
        score += 18.0;
    }
    if BLURAY.is_match(title) {
        score += 10.0;
    }
    if MODERN_CODEC.is_match(title) {
        score += 6.0;
    }
    if LEGACY_CODEC.is_match(title) {
        score += 3.0;
    }
    if LOW_QUALITY.is_match(title) {
        score -= 40.0;
    }

    score
}

/// Size sub-score: a capped bonus for plausible sizes, a penalty otherwise.
pub fn score_size(size_bytes: Option<u64>) -> f64 {
    let size_gb = size_bytes.unwrap_or(0) as f64 / BYTES_PER_GB;
    if size_gb > MIN_PLAUSIBLE_GB {
        size_gb.min(MAX_SIZE_BONUS)
    } else {
        SMALL_SIZE_PENALTY
    }
}

/// Total score for a single candidate.
pub fn score_candidate(candidate: &Candidate) -> f64 {
    candidate.seeders as f64 * SEEDER_WEIGHT
        + score_quality(&candidate.title)
        + score_size(candidate.size_bytes)
}

/// Drop candidates without a magnet and order the rest by score, best first.
pub fn rank_candidates(candidates: Vec<Candidate>) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter(|c| c.descriptor().is_some())
        .map(|candidate| {
            let score = score_candidate(&candidate);
            RankedCandidate { candidate, score }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Human readable size, e.g. "1.50 GB". Unknown or zero sizes render as "-".
pub fn human_size(size_bytes: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let bytes = match size_bytes {
        Some(b) if b > 0 => b,
        _ => return "-".to_string(),
    };

    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }

    if idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[idx])
    }
}
