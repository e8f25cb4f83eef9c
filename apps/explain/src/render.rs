//! Terminal rendering of session snapshots.
//!
//! Snapshots may be skipped (a lagging subscriber) or repeated, so the
//! renderer diffs against what it already printed instead of assuming it sees
//! every transition.

use std::io::{self, Write};

use client_core::{Phase, SessionState};
use shared::record::{format_sui, ExecutionStatus, TransactionRecord};

#[derive(Debug, Default)]
pub struct Renderer {
    show_raw: bool,
    request: u64,
    announced: Option<Phase>,
    summary_shown: bool,
    printed: usize,
}

impl Renderer {
    pub fn new(show_raw: bool) -> Self {
        Self {
            show_raw,
            ..Self::default()
        }
    }

    pub fn render(&mut self, state: &SessionState, out: &mut impl Write) -> io::Result<()> {
        if state.request() != self.request {
            *self = Self {
                show_raw: self.show_raw,
                request: state.request(),
                ..Self::default()
            };
        }

        let phase = state.phase();
        let phase_changed = self.announced != Some(phase);
        if phase_changed && phase == Phase::FetchingRecord {
            writeln!(out, "Fetching transaction {} ...", state.identifier())?;
        }

        if let Some(record) = state.record().filter(|_| !self.summary_shown) {
            write!(out, "{}", render_summary(record))?;
            if self.show_raw {
                writeln!(out, "{}", serde_json::to_string_pretty(record.as_value())?)?;
            }
            writeln!(out)?;
            self.summary_shown = true;
        }

        let explanation = state.explanation();
        if explanation.len() > self.printed {
            write!(out, "{}", &explanation[self.printed..])?;
            self.printed = explanation.len();
        }

        if phase_changed {
            match phase {
                Phase::Done => writeln!(out)?,
                Phase::Failed => {
                    if self.printed > 0 {
                        writeln!(out)?;
                    }
                    writeln!(
                        out,
                        "error: {}",
                        state.error_message().unwrap_or("unknown failure")
                    )?;
                }
                _ => {}
            }
            self.announced = Some(phase);
        }

        out.flush()
    }
}

/// Status, net gas fee and epoch, one per line.
pub fn render_summary(record: &TransactionRecord) -> String {
    let status = match record.status() {
        Some(ExecutionStatus::Failure { error: Some(error) }) => format!("Failed ({error})"),
        Some(status) => status.label().to_string(),
        None => "Unknown".to_string(),
    };
    let gas = record
        .gas_used()
        .map(|gas| format!("{} SUI", format_sui(gas.net_fee())))
        .unwrap_or_else(|| "Unknown".to_string());
    let epoch = record
        .epoch()
        .map(|epoch| epoch.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut summary = format!("Status: {status}\nNet gas fee: {gas}\nEpoch: {epoch}\n");
    if let Some(ts) = record.timestamp() {
        summary.push_str(&format!("Time: {}\n", ts.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    summary
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
