//! # Pattern Analyzer
//!
//! Parses and validates the three-segment query language, classifies it
//! into exact/pattern/multi-provider, and normalizes provider-name casing.

use crate::glob;
use serde::{Deserialize, Serialize};

/// One malformed aspect of a query. Multiple errors can apply to the same
/// query; the analyzer collects all of them rather than stopping at the
/// first, so a caller sees every problem in one pass instead of fixing
/// issues one at a time across repeated runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PatternValidationError {
    #[error("query must have exactly three non-empty segments separated by '/', got {segment_count}")]
    InvalidPatternShape { segment_count: usize },

    #[error("segment {position} ('{segment}') contains characters outside the allowed set")]
    InvalidCharacters { position: usize, segment: String },

    #[error("segment {position} is empty")]
    EmptySegment { position: usize },

    #[error("explicit provider name '{name}' is empty")]
    EmptyProvider { name: String },
}

/// Result of parsing and classifying a three-segment query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternAnalysis {
    /// Explicit `--provider` value, lowercased. `None` when the caller did
    /// not pass one.
    pub provider_segment: Option<String>,
    pub org_segment: String,
    pub middle_segment: String,
    pub repo_segment: String,
    /// True iff no segment contains a wildcard.
    pub is_exact: bool,
    /// True iff any segment contains `*` or `?`.
    pub is_pattern: bool,
    /// True iff `provider_segment` is absent and `is_pattern`.
    pub is_multi_provider: bool,
    /// Canonical `org/middle/repo` form with the segments as given
    /// (provider casing normalized separately).
    pub normalized: String,
    pub validation_errors: Vec<PatternValidationError>,
}

impl PatternAnalysis {
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }
}

const ALLOWED_EXTRA_CHARS: &[char] = &['.', '_', ' ', '*', '?', '-', '%'];

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_EXTRA_CHARS.contains(&c)
}

/// Parse and validate a raw query string against an optional explicit
/// provider name. Always returns a result; validity is conveyed through
/// `validation_errors`, never a `Result::Err`.
pub fn analyze(query: &str, explicit_provider: Option<&str>) -> PatternAnalysis {
    let mut errors = Vec::new();

    let segments: Vec<&str> = if query.is_empty() {
        Vec::new()
    } else {
        query.split('/').collect()
    };

    if segments.len() != 3 {
        errors.push(PatternValidationError::InvalidPatternShape {
            segment_count: segments.len(),
        });
    }

    // Validate whatever segments are present even when the shape is wrong,
    // so callers see every problem in one pass.
    for (i, seg) in segments.iter().enumerate() {
        if seg.is_empty() {
            errors.push(PatternValidationError::EmptySegment { position: i });
            continue;
        }
        if seg.chars().any(|c| !is_allowed_char(c)) {
            errors.push(PatternValidationError::InvalidCharacters {
                position: i,
                segment: seg.to_string(),
            });
        }
    }

    let org_segment = segments.first().copied().unwrap_or("").to_string();
    let middle_segment = segments.get(1).copied().unwrap_or("").to_string();
    let repo_segment = segments.get(2).copied().unwrap_or("").to_string();

    let provider_segment = match explicit_provider {
        Some(p) if p.is_empty() => {
            errors.push(PatternValidationError::EmptyProvider {
                name: p.to_string(),
            });
            None
        }
        Some(p) => Some(p.to_lowercase()),
        None => None,
    };

    let is_pattern = [&org_segment, &middle_segment, &repo_segment]
        .into_iter()
        .any(|s| glob::is_glob(s));
    let is_exact = !is_pattern;
    let is_multi_provider = provider_segment.is_none() && is_pattern;

    let normalized = format!("{}/{}/{}", org_segment, middle_segment, repo_segment);

    PatternAnalysis {
        provider_segment,
        org_segment,
        middle_segment,
        repo_segment,
        is_exact,
        is_pattern,
        is_multi_provider,
        normalized,
        validation_errors: errors,
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
