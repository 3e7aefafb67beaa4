//! Info-hash extraction from magnet links.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static BTIH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)xt=urn:btih:([^&]+)").expect("valid btih regex"));

/// Extract the info hash from a magnet link, lowercased.
///
/// Returns `None` when the descriptor has no `xt=urn:btih:` parameter or the
/// parameter is empty. A missing hash is not an error: the candidate just
/// can't be deduplicated or cache-checked.
pub fn extract_info_hash(descriptor: &str) -> Option<String> {
    let captures = BTIH_PARAM.captures(descriptor)?;
    let hash = captures.get(1)?.as_str().trim();
    if hash.is_empty() {
        return None;
    }
    Some(hash.to_lowercase())
}

/// Whether the descriptor uses the `magnet:` scheme.
pub fn is_magnet(descriptor: &str) -> bool {
    descriptor
        .trim_start()
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("magnet:"))
}
