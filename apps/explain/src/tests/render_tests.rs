use super::*;

use std::sync::Arc;

use async_trait::async_trait;
use client_core::{
    ExplainError, ExplanationSource, FragmentStream, LedgerSource, SessionController,
};
use futures::{stream, StreamExt};
use serde_json::json;
use shared::domain::TransactionDigest;

const DIGEST: &str = "5CbvS9Ngf1pXo4h1Wkn8uSGeTZQ2S9pxtTcYxZKqfvZE";

fn sample_record() -> serde_json::Value {
    json!({
        "digest": DIGEST,
        "timestampMs": "1700000000000",
        "effects": {
            "status": {"status": "success"},
            "executedEpoch": "412",
            "gasUsed": {
                "computationCost": "750000",
                "storageCost": "2896800",
                "storageRebate": "1648920",
                "nonRefundableStorageFee": "16656"
            }
        }
    })
}

struct FixedLedger(Result<serde_json::Value, ExplainError>);

#[async_trait]
impl LedgerSource for FixedLedger {
    async fn fetch_record(
        &self,
        _digest: &TransactionDigest,
    ) -> Result<TransactionRecord, ExplainError> {
        self.0.clone().map(TransactionRecord::from_value)
    }
}

struct FixedExplainer(Vec<&'static str>);

#[async_trait]
impl ExplanationSource for FixedExplainer {
    async fn stream_explanation(
        &self,
        _record: &TransactionRecord,
    ) -> Result<FragmentStream, ExplainError> {
        let items: Vec<Result<String, ExplainError>> =
            self.0.iter().map(|f| Ok(f.to_string())).collect();
        Ok(stream::iter(items).boxed())
    }
}

async fn render_session(
    ledger: FixedLedger,
    fragments: Vec<&'static str>,
    input: &str,
) -> String {
    let controller = SessionController::new(Arc::new(ledger), Arc::new(FixedExplainer(fragments)));
    let mut events = controller.subscribe();
    controller.submit(input).await;

    let mut renderer = Renderer::new(false);
    let mut out = Vec::new();
    while let Ok(snapshot) = events.try_recv() {
        renderer.render(&snapshot, &mut out).expect("render");
        renderer.render(&snapshot, &mut out).expect("render twice");
    }
    String::from_utf8(out).expect("utf8")
}

#[test]
fn summary_shows_status_net_fee_epoch_and_time() {
    let summary = render_summary(&TransactionRecord::from_value(sample_record()));
    assert_eq!(
        summary,
        "Status: Success\nNet gas fee: 0.001998 SUI\nEpoch: 412\nTime: 2023-11-14 22:13:20 UTC\n"
    );
}

#[test]
fn summary_marks_missing_fields_unknown_and_shows_failure_reason() {
    let record = TransactionRecord::from_value(json!({
        "effects": {"status": {"status": "failure", "error": "InsufficientGas"}}
    }));
    assert_eq!(
        render_summary(&record),
        "Status: Failed (InsufficientGas)\nNet gas fee: Unknown\nEpoch: Unknown\n"
    );
}

#[tokio::test]
async fn renders_each_fragment_once_in_order() {
    let output = render_session(
        FixedLedger(Ok(sample_record())),
        vec!["### Summary\n", "You paid ", "gas."],
        DIGEST,
    )
    .await;

    assert_eq!(
        output,
        format!(
            "Fetching transaction {DIGEST} ...\n\
             Status: Success\nNet gas fee: 0.001998 SUI\nEpoch: 412\nTime: 2023-11-14 22:13:20 UTC\n\n\
             ### Summary\nYou paid gas.\n"
        )
    );
}

#[tokio::test]
async fn renders_failure_message() {
    let output = render_session(
        FixedLedger(Err(ExplainError::NotFound)),
        Vec::new(),
        DIGEST,
    )
    .await;

    assert_eq!(
        output,
        format!(
            "Fetching transaction {DIGEST} ...\n\
             error: Transaction not found. Please check the digest and try again.\n"
        )
    );
}

#[tokio::test]
async fn input_errors_render_without_fetch_banner() {
    let output = render_session(FixedLedger(Ok(sample_record())), Vec::new(), "0xabc").await;
    assert!(output.starts_with("error: It looks like you pasted an Object ID"));
}
