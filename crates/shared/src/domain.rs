use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Marker that object ids and account addresses start with.
pub const ADDRESS_PREFIX: &str = "0x";
/// Shortest string accepted as a transaction digest.
pub const MIN_DIGEST_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DigestIssue {
    #[error(
        "It looks like you pasted an Object ID or Address (starts with '0x'). Please enter a Transaction Digest."
    )]
    AddressLike,
    #[error("The digest seems too short. Please check your input.")]
    TooShort { len: usize },
}

/// A validated Sui transaction digest.
///
/// Only constructed through [`TransactionDigest::parse`], so holding one means
/// the address and length checks already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionDigest(String);

impl TransactionDigest {
    pub fn parse(candidate: impl Into<String>) -> Result<Self, DigestIssue> {
        let candidate = candidate.into();
        match Self::check(&candidate) {
            Some(issue) => Err(issue),
            None => Ok(Self(candidate)),
        }
    }

    pub fn check(candidate: &str) -> Option<DigestIssue> {
        if candidate.starts_with(ADDRESS_PREFIX) {
            return Some(DigestIssue::AddressLike);
        }
        let len = candidate.chars().count();
        if len < MIN_DIGEST_LEN {
            return Some(DigestIssue::TooShort { len });
        }
        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_base58_digest() {
        let digest = TransactionDigest::parse("5CbvS9Ngf1pXo4h1Wkn8uSGeTZQ2S9pxtTcYxZKqfvZE")
            .expect("valid digest");
        assert_eq!(
            digest.to_string(),
            "5CbvS9Ngf1pXo4h1Wkn8uSGeTZQ2S9pxtTcYxZKqfvZE"
        );
    }

    #[test]
    fn address_marker_wins_over_length() {
        assert_eq!(TransactionDigest::check("0x2"), Some(DigestIssue::AddressLike));
    }

    #[test]
    fn short_candidates_report_their_length() {
        assert_eq!(
            TransactionDigest::check("ABC123"),
            Some(DigestIssue::TooShort { len: 6 })
        );
        assert_eq!(
            TransactionDigest::check(""),
            Some(DigestIssue::TooShort { len: 0 })
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let digest = TransactionDigest::parse("A".repeat(MIN_DIGEST_LEN)).expect("valid digest");
        assert_eq!(
            serde_json::to_value(&digest).expect("serialize"),
            serde_json::json!("A".repeat(MIN_DIGEST_LEN))
        );
    }
}
