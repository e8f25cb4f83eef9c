//! Turns whatever the user pasted into a candidate transaction digest.

use shared::domain::{DigestIssue, TransactionDigest};

use crate::error::ExplainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub identifier: String,
    pub issue: Option<DigestIssue>,
}

impl Normalized {
    pub fn into_digest(self) -> Result<TransactionDigest, ExplainError> {
        if let Some(issue) = self.issue {
            return Err(ExplainError::InputValidation(issue.to_string()));
        }
        TransactionDigest::parse(self.identifier)
            .map_err(|issue| ExplainError::InputValidation(issue.to_string()))
    }
}

/// Trims the input and, for explorer links, keeps only the last path segment
/// (query and fragment are dropped first).
///
/// Address-shaped or short candidates are returned together with the issue so
/// the caller decides whether to block the request.
pub fn normalize(raw: &str) -> Normalized {
    let trimmed = raw.trim();
    let identifier = if looks_like_url(trimmed) {
        let path = trimmed.split(['?', '#']).next().unwrap_or_default();
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .unwrap_or_default()
    } else {
        trimmed
    };

    Normalized {
        identifier: identifier.to_string(),
        issue: TransactionDigest::check(identifier),
    }
}

fn looks_like_url(input: &str) -> bool {
    input.contains('/') || input.contains("http")
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
