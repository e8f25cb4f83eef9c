//! Ledger Record Fetcher: one `sui_getTransactionBlock` round trip per call.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::TransactionDigest,
    protocol::{JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS_CODE},
    record::TransactionRecord,
};
use tracing::{debug, warn};

use crate::error::ExplainError;

#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn fetch_record(
        &self,
        digest: &TransactionDigest,
    ) -> Result<TransactionRecord, ExplainError>;
}

/// Talks to a Sui full node, or to a relay that forwards to one.
pub struct LedgerClient {
    http: Client,
    rpc_url: String,
}

impl LedgerClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), rpc_url)
    }

    pub fn with_client(http: Client, rpc_url: impl Into<String>) -> Self {
        Self {
            http,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl LedgerSource for LedgerClient {
    async fn fetch_record(
        &self,
        digest: &TransactionDigest,
    ) -> Result<TransactionRecord, ExplainError> {
        debug!(%digest, rpc_url = %self.rpc_url, "fetching transaction block");
        let res = self
            .http
            .post(&self.rpc_url)
            .json(&JsonRpcRequest::get_transaction(digest))
            .send()
            .await
            .map_err(|err| {
                warn!(%digest, error = %err, "ledger request failed");
                ExplainError::from(err)
            })?;

        let status = res.status();
        if !status.is_success() {
            warn!(%digest, status = status.as_u16(), "ledger node answered with error status");
            return Err(ExplainError::network(
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        let body = res.bytes().await?;
        let envelope: JsonRpcResponse = serde_json::from_slice(&body).map_err(|err| {
            ExplainError::remote(
                Some(status.as_u16()),
                format!("malformed ledger response: {err}"),
            )
        })?;
        interpret_response(envelope)
    }
}

/// Maps a decoded JSON-RPC envelope onto a record or one of the lookup errors.
pub fn interpret_response(envelope: JsonRpcResponse) -> Result<TransactionRecord, ExplainError> {
    if let Some(error) = envelope.error {
        if error.code == Some(INVALID_PARAMS_CODE) {
            return Err(ExplainError::InvalidIdentifierFormat);
        }
        let message = error
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Failed to fetch transaction".to_string());
        return Err(ExplainError::remote(None, message));
    }

    match envelope.result {
        Some(result) if !result.is_null() => Ok(TransactionRecord::from_value(result)),
        _ => Err(ExplainError::NotFound),
    }
}

#[cfg(test)]
#[path = "tests/ledger_tests.rs"]
mod tests;
