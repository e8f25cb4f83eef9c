use thiserror::Error;

/// Everything that can stop a submission from reaching `Done`.
///
/// The `Display` text is what the session shows to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplainError {
    #[error("{0}")]
    InputValidation(String),
    #[error("{}", network_message(*status, message))]
    Network { status: Option<u16>, message: String },
    #[error(
        "Invalid Transaction Digest format. Ensure you are not pasting an Object ID or Address."
    )]
    InvalidIdentifierFormat,
    #[error("Transaction not found. Please check the digest and try again.")]
    NotFound,
    #[error("{}", remote_message(*status, message))]
    Remote { status: Option<u16>, message: String },
}

impl ExplainError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } | Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ExplainError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

fn network_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Network error (HTTP {status}): {message}"),
        None => format!("Network error: {message}"),
    }
}

fn remote_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Remote error (HTTP {status}): {message}"),
        None => message.to_string(),
    }
}
