use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadGateway,
    GatewayTimeout,
    Internal,
}

/// JSON body the relay answers with when it cannot produce an upstream reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn node_unreachable() -> Self {
        Self::new(
            ErrorCode::GatewayTimeout,
            "Gateway timeout - Sui node unreachable",
        )
    }
}
