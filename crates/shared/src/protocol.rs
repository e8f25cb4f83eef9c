//! Wire envelopes for the ledger node (JSON-RPC 2.0) and the chat-completion service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TransactionDigest;

pub const JSONRPC_VERSION: &str = "2.0";
pub const GET_TRANSACTION_METHOD: &str = "sui_getTransactionBlock";
/// JSON-RPC "invalid params"; the node answers with it for malformed digests.
pub const INVALID_PARAMS_CODE: i64 = -32602;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQueryOptions {
    pub show_input: bool,
    pub show_effects: bool,
    pub show_events: bool,
    pub show_object_changes: bool,
    pub show_balance_changes: bool,
}

impl TransactionQueryOptions {
    /// Every `show*` flag on, so the node returns the largest record it can.
    pub fn full() -> Self {
        Self {
            show_input: true,
            show_effects: true,
            show_events: true,
            show_object_changes: true,
            show_balance_changes: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: P,
}

pub type GetTransactionParams<'a> = (&'a TransactionDigest, TransactionQueryOptions);

impl<'a> JsonRpcRequest<GetTransactionParams<'a>> {
    pub fn get_transaction(digest: &'a TransactionDigest) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: 1,
            method: GET_TRANSACTION_METHOD,
            params: (digest, TransactionQueryOptions::full()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// One `data:` event of a streamed chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// `choices[0].delta.content`, when present.
    pub fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.delta.content
    }
}
