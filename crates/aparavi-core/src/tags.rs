//! Tag name normalization.
//!
//! The tagging endpoints reject names containing filesystem-reserved
//! characters, so every inbound batch is cleaned before it reaches the
//! wire: trim, truncate to 100 characters, strip the reserved set. Names
//! that end up empty are dropped from the batch.

/// Characters stripped from tag names.
const FORBIDDEN_CHARS: &[char] = &['<', '>', '"', '\\', '|', '*', '?', '/'];

/// Maximum tag name length after trimming.
const MAX_TAG_LEN: usize = 100;

/// Normalize one tag name: trim, truncate, strip reserved characters.
///
/// Returns `None` when nothing survives cleaning.
pub fn clean_tag_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    let truncated: String = trimmed.chars().take(MAX_TAG_LEN).collect();
    let cleaned: String = truncated
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect();
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Normalize a batch, dropping names that clean to nothing.
///
/// An empty result is NOT an error here; operations that require at least
/// one surviving name enforce that themselves so partial-tolerant callers
/// can share this helper.
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter_map(|name| clean_tag_name(name))
        .collect()
}
