//! Listing validation
//!
//! Quality gate applied to every scraped listing before it is reconciled.
//! Rejected listings are reported back with every reason that applies.

use chrono::{DateTime, Utc};
use url::Url;

use crate::domain::Listing;

/// Minimum description length, in characters, after trimming
pub const MIN_DESCRIPTION_LEN: usize = 20;

const SPAM_PHRASES: [&str; 7] = [
    "click here now",
    "make money fast",
    "100% free",
    "act now",
    "limited time offer",
    "no experience needed earn $$$",
    "work from home earn thousands",
];

/// A single reason a listing was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingTitle,
    MissingCompany,
    DescriptionTooShort,
    InvalidApplyUrl,
    MissingExternalId,
    MissingSource,
    Spam,
    DeadlinePassed,
    BlankCategory,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ValidationIssue::MissingTitle => "title is required",
            ValidationIssue::MissingCompany => "company is required",
            ValidationIssue::DescriptionTooShort => "description must be at least 20 characters",
            ValidationIssue::InvalidApplyUrl => "apply URL must be an absolute http(s) URL",
            ValidationIssue::MissingExternalId => "external id is required",
            ValidationIssue::MissingSource => "source is required",
            ValidationIssue::Spam => "content looks like spam",
            ValidationIssue::DeadlinePassed => "deadline has already passed",
            ValidationIssue::BlankCategory => "category cannot be blank",
        };
        f.write_str(msg)
    }
}

/// A listing that failed validation, with every reason
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub listing: Listing,
    pub issues: Vec<ValidationIssue>,
}

impl Rejection {
    /// Reasons joined for logging
    pub fn reasons(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Outcome of validating a whole snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub valid: Vec<Listing>,
    pub rejected: Vec<Rejection>,
}

/// Checks one listing against the quality rules as of `now`
pub fn validate(listing: &Listing, now: DateTime<Utc>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if listing.title.trim().is_empty() {
        issues.push(ValidationIssue::MissingTitle);
    }
    if listing.company.trim().is_empty() {
        issues.push(ValidationIssue::MissingCompany);
    }
    if listing.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        issues.push(ValidationIssue::DescriptionTooShort);
    }
    if !is_http_url(&listing.apply_url) {
        issues.push(ValidationIssue::InvalidApplyUrl);
    }
    if listing.external_id.trim().is_empty() {
        issues.push(ValidationIssue::MissingExternalId);
    }
    if listing.source.trim().is_empty() {
        issues.push(ValidationIssue::MissingSource);
    }
    if contains_spam(&listing.title) || contains_spam(&listing.description) {
        issues.push(ValidationIssue::Spam);
    }
    if listing.deadline.is_some_and(|deadline| deadline < now) {
        issues.push(ValidationIssue::DeadlinePassed);
    }
    if listing.category.trim().is_empty() {
        issues.push(ValidationIssue::BlankCategory);
    }

    issues
}

/// Splits a snapshot into valid listings and rejections, preserving order
pub fn validate_batch(listings: Vec<Listing>, now: DateTime<Utc>) -> ValidationReport {
    let mut report = ValidationReport::default();

    for listing in listings {
        let issues = validate(&listing, now);
        if issues.is_empty() {
            report.valid.push(listing);
        } else {
            report.rejected.push(Rejection { listing, issues });
        }
    }

    report
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn contains_spam(text: &str) -> bool {
    let lower = text.to_lowercase();
    SPAM_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
