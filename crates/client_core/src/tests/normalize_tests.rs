use super::*;

const DIGEST: &str = "5CbvS9Ngf1pXo4h1Wkn8uSGeTZQ2S9pxtTcYxZKqfvZE";

#[test]
fn clean_digest_is_returned_unchanged() {
    let normalized = normalize(DIGEST);
    assert_eq!(normalized.identifier, DIGEST);
    assert_eq!(normalized.issue, None);
    assert_eq!(normalize(&normalized.identifier), normalized);
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    let normalized = normalize(&format!("  \t{DIGEST}\n"));
    assert_eq!(normalized.identifier, DIGEST);
    assert_eq!(normalized.issue, None);
}

#[test]
fn explorer_url_keeps_last_segment_without_query_or_fragment() {
    let normalized = normalize("https://explorer.example/tx/ABC123?tab=events");
    assert_eq!(normalized.identifier, "ABC123");
    assert_eq!(normalized.issue, Some(DigestIssue::TooShort { len: 6 }));

    let normalized = normalize(&format!("https://suiscan.xyz/mainnet/tx/{DIGEST}#events"));
    assert_eq!(normalized.identifier, DIGEST);
    assert_eq!(normalized.issue, None);
}

#[test]
fn trailing_slash_is_ignored() {
    let normalized = normalize(&format!("suivision.xyz/txblock/{DIGEST}/"));
    assert_eq!(normalized.identifier, DIGEST);
}

#[test]
fn address_shaped_input_is_flagged_and_kept() {
    let address = "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf";
    let normalized = normalize(address);
    assert_eq!(normalized.identifier, address);
    assert_eq!(normalized.issue, Some(DigestIssue::AddressLike));

    let normalized = normalize(&format!("https://suiscan.xyz/mainnet/object/{address}"));
    assert_eq!(normalized.identifier, address);
    assert_eq!(normalized.issue, Some(DigestIssue::AddressLike));
}

#[test]
fn short_candidates_are_flagged_for_every_length_below_threshold() {
    for len in 0..shared::domain::MIN_DIGEST_LEN {
        let candidate = "A".repeat(len);
        let normalized = normalize(&candidate);
        assert_eq!(normalized.identifier, candidate);
        assert_eq!(normalized.issue, Some(DigestIssue::TooShort { len }));
    }
}

#[test]
fn into_digest_surfaces_issue_as_validation_error() {
    let err = normalize("0xabc").into_digest().expect_err("address rejected");
    assert!(matches!(err, ExplainError::InputValidation(ref msg) if msg.contains("Object ID")));

    let digest = normalize(DIGEST).into_digest().expect("valid digest");
    assert_eq!(digest.as_str(), DIGEST);
}

#[test]
fn url_without_path_segments_yields_empty_candidate() {
    let normalized = normalize("/?q=1");
    assert_eq!(normalized.identifier, "");
    assert_eq!(normalized.issue, Some(DigestIssue::TooShort { len: 0 }));
}
