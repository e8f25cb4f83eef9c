//! Client side of the Sui transaction explainer: input normalization, the
//! ledger fetcher, the streamed explanation, and the session that ties them
//! together.

pub mod config;
pub mod error;
pub mod explain;
pub mod ledger;
pub mod normalize;
pub mod session;
pub mod sse;

pub use config::{load_settings, load_settings_from, ClientSettings};
pub use error::ExplainError;
pub use explain::{build_prompt, ChatExplainer, ChatSettings, ExplanationSource, FragmentStream};
pub use ledger::{LedgerClient, LedgerSource};
pub use normalize::{normalize, Normalized};
pub use session::{Phase, SessionController, SessionState};
