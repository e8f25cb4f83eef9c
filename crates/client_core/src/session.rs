//! Session Controller: drives normalize -> fetch -> stream and owns the one
//! mutable [`SessionState`].
//!
//! State only changes through the transition methods on `SessionState`, always
//! under the controller's lock. Every change is broadcast as a snapshot, so
//! presentation code never holds anything it could mutate.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use futures::StreamExt;
use serde::Serialize;
use shared::record::TransactionRecord;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{explain::ExplanationSource, ledger::LedgerSource, normalize::normalize};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a valid transaction digest.";
const SNAPSHOT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    FetchingRecord,
    StreamingExplanation,
    Done,
    Failed,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingRecord => "fetching transaction",
            Self::StreamingExplanation => "generating explanation",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_busy(self) -> bool {
        matches!(self, Self::FetchingRecord | Self::StreamingExplanation)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    request: u64,
    identifier: String,
    record: Option<TransactionRecord>,
    explanation: String,
    phase: Phase,
    error_message: Option<String>,
}

impl SessionState {
    fn new(request: u64, identifier: impl Into<String>) -> Self {
        Self {
            request,
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Submission number this state belongs to; 0 before the first submit.
    pub fn request(&self) -> u64 {
        self.request
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn record(&self) -> Option<&TransactionRecord> {
        self.record.as_ref()
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    fn set_identifier(&mut self, identifier: String) {
        self.identifier = identifier;
    }

    fn begin_fetch(&mut self) {
        self.record = None;
        self.explanation.clear();
        self.error_message = None;
        self.phase = Phase::FetchingRecord;
    }

    fn record_loaded(&mut self, record: TransactionRecord) -> bool {
        if self.phase != Phase::FetchingRecord {
            return false;
        }
        self.record = Some(record);
        self.phase = Phase::StreamingExplanation;
        true
    }

    fn append_fragment(&mut self, fragment: &str) -> bool {
        if self.phase != Phase::StreamingExplanation {
            return false;
        }
        self.explanation.push_str(fragment);
        true
    }

    fn complete(&mut self) -> bool {
        if self.phase != Phase::StreamingExplanation {
            return false;
        }
        self.phase = Phase::Done;
        true
    }

    fn fail(&mut self, message: impl Into<String>) -> bool {
        if matches!(self.phase, Phase::Done | Phase::Failed) {
            return false;
        }
        self.record = None;
        self.explanation.clear();
        self.error_message = Some(message.into());
        self.phase = Phase::Failed;
        true
    }
}

pub struct SessionController {
    ledger: Arc<dyn LedgerSource>,
    explainer: Arc<dyn ExplanationSource>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionState>,
    next_request: AtomicU64,
}

impl SessionController {
    pub fn new(ledger: Arc<dyn LedgerSource>, explainer: Arc<dyn ExplanationSource>) -> Self {
        let (events, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            ledger,
            explainer,
            state: Mutex::new(SessionState::default()),
            events,
            next_request: AtomicU64::new(0),
        }
    }

    /// One snapshot per state change, in order. A lagging receiver can fall
    /// back to [`SessionController::snapshot`].
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Runs one submission to completion and returns the state at the point
    /// it stopped driving it.
    ///
    /// A newer submit supersedes this one: from then on none of its
    /// transitions apply, and its fragment stream is dropped at the next
    /// fragment.
    pub async fn submit(&self, raw: &str) -> SessionState {
        let request = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.run(request, raw)
            .instrument(info_span!("submit", request))
            .await;
        self.snapshot().await
    }

    async fn run(&self, request: u64, raw: &str) {
        let raw = raw.trim();
        if !self.begin(request, raw).await {
            return;
        }
        if raw.is_empty() {
            self.apply(request, |s| s.fail(EMPTY_INPUT_MESSAGE)).await;
            return;
        }

        let normalized = normalize(raw);
        if normalized.identifier != raw && normalized.issue.is_none() {
            let identifier = normalized.identifier.clone();
            self.apply(request, |s| {
                s.set_identifier(identifier);
                true
            })
            .await;
        }
        let digest = match normalized.into_digest() {
            Ok(digest) => digest,
            Err(err) => {
                info!(error = %err, "input rejected");
                self.apply(request, |s| s.fail(err.to_string())).await;
                return;
            }
        };

        if !self
            .apply(request, |s| {
                s.begin_fetch();
                true
            })
            .await
        {
            return;
        }

        let record = match self.ledger.fetch_record(&digest).await {
            Ok(record) => record,
            Err(err) => {
                warn!(%digest, error = %err, "transaction fetch failed");
                self.apply(request, |s| s.fail(err.to_string())).await;
                return;
            }
        };
        info!(%digest, "transaction record loaded");
        if !self
            .apply(request, |s| s.record_loaded(record.clone()))
            .await
        {
            return;
        }

        let mut fragments = match self.explainer.stream_explanation(&record).await {
            Ok(fragments) => fragments,
            Err(err) => {
                warn!(%digest, error = %err, "explanation request failed");
                self.apply(request, |s| s.fail(err.to_string())).await;
                return;
            }
        };

        let mut received = 0usize;
        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    if !self.apply(request, |s| s.append_fragment(&fragment)).await {
                        debug!(%digest, "submission superseded; dropping explanation stream");
                        return;
                    }
                    received += 1;
                }
                Err(err) => {
                    warn!(%digest, error = %err, "explanation stream failed");
                    self.apply(request, |s| s.fail(err.to_string())).await;
                    return;
                }
            }
        }

        if self.apply(request, SessionState::complete).await {
            info!(%digest, fragments = received, "explanation complete");
        }
    }

    /// Replaces the whole state for a new submission unless a newer one
    /// already took over.
    async fn begin(&self, request: u64, identifier: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.request > request {
            return false;
        }
        *state = SessionState::new(request, identifier);
        let _ = self.events.send(state.clone());
        true
    }

    /// Applies `transition` if the state still belongs to `request` and the
    /// transition accepts the current phase. Returns whether it was applied.
    async fn apply(
        &self,
        request: u64,
        transition: impl FnOnce(&mut SessionState) -> bool,
    ) -> bool {
        let mut state = self.state.lock().await;
        if state.request != request || !transition(&mut state) {
            return false;
        }
        let _ = self.events.send(state.clone());
        true
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
