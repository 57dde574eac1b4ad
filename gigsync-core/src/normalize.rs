//! Normalization helpers shared by source adapters
//!
//! Adapters scrape wildly different markup; these helpers turn the raw text
//! they pull out into the canonical forms the marketplace expects.

use sha2::{Digest, Sha256};
use url::Url;

/// Collapses whitespace runs into single spaces and trims the ends
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps free-form job type text onto a canonical job type
///
/// One of `full-time`, `part-time`, `contract`, `freelance`, `internship` or
/// `temporary`. Unknown or empty input falls back to `full-time`.
pub fn normalize_job_type(raw: &str) -> &'static str {
    let lower = raw.to_lowercase();

    if lower.contains("part") {
        "part-time"
    } else if lower.contains("intern") {
        "internship"
    } else if lower.contains("freelance") {
        "freelance"
    } else if lower.contains("contract") {
        "contract"
    } else if lower.contains("temp") {
        "temporary"
    } else {
        "full-time"
    }
}

/// Derives a stable external id from a listing URL
///
/// Trailing slashes and fragments do not change the id.
pub fn external_id_from_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let canonical = without_fragment.trim_end_matches('/');

    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(&digest[..8])
}

/// Resolves `link` against `base`
///
/// Absolute links are returned unchanged. Returns `None` when `base` is not
/// a valid URL or the join fails.
pub fn absolute_url(base: &str, link: &str) -> Option<String> {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        return Some(link.to_string());
    }

    let base = Url::parse(base).ok()?;
    base.join(link).ok().map(String::from)
}

/// Splits a delimited skills string
///
/// Accepts `,`, `;` and `|` as separators. Duplicates are dropped
/// case-insensitively, keeping the first spelling.
pub fn split_skills(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();

    raw.split([',', ';', '|'])
        .map(clean_text)
        .filter(|skill| !skill.is_empty())
        .filter(|skill| seen.insert(skill.to_lowercase()))
        .collect()
}
