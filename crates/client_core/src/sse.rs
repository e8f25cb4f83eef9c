//! Decoding of the chat service's server-sent event stream into text fragments.

use std::{collections::VecDeque, pin::Pin};

use futures::{stream, Stream, StreamExt};
use shared::protocol::ChatCompletionChunk;
use tracing::{debug, trace};

use crate::{error::ExplainError, explain::FragmentStream};

pub const DATA_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental line splitter and `data:` payload parser.
///
/// Bytes are buffered until a newline arrives, so lines split across
/// transport chunks are decoded whole. Lines whose payload is not a valid
/// completion chunk are counted and otherwise ignored.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    buffer: Vec<u8>,
    skipped: usize,
    done: bool,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one transport chunk; returns the fragments of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.done {
            return fragments;
        }

        self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.decode_line(&line[..pos], &mut fragments);
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        fragments
    }

    /// Decodes a trailing line that was never newline-terminated.
    pub fn finish(&mut self) -> Vec<String> {
        let mut fragments = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line, &mut fragments);
        }
        fragments
    }

    /// Whether the `[DONE]` sentinel was seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of `data:` lines dropped because they did not parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line(&mut self, raw: &[u8], fragments: &mut Vec<String>) {
        let text = String::from_utf8_lossy(raw);
        let line = text.strip_suffix('\r').unwrap_or(&text);
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let payload = payload.strip_prefix(' ').unwrap_or(payload);
        if payload.trim() == DONE_SENTINEL {
            self.done = true;
            return;
        }

        match serde_json::from_str::<ChatCompletionChunk>(payload) {
            Ok(chunk) => {
                if let Some(content) = chunk.into_content().filter(|c| !c.is_empty()) {
                    fragments.push(content);
                }
            }
            Err(err) => {
                self.skipped += 1;
                trace!(error = %err, "skipping malformed event-stream line");
            }
        }
    }
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    decoder: EventStreamDecoder,
    pending: VecDeque<String>,
    closed: bool,
}

/// Wraps a byte stream as a lazy sequence of fragments.
///
/// The sequence ends at `[DONE]`, at the end of the body, or after yielding a
/// single transport error. The body is dropped as soon as the sequence ends or
/// the returned stream is dropped.
pub fn decode_event_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ExplainError> + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        decoder: EventStreamDecoder::new(),
        pending: VecDeque::new(),
        closed: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.closed || state.decoder.is_done() {
                debug!(
                    skipped_lines = state.decoder.skipped(),
                    done_sentinel = state.decoder.is_done(),
                    "explanation stream finished"
                );
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let fragments = state.decoder.push(chunk.as_ref());
                    state.pending.extend(fragments);
                }
                Some(Err(err)) => {
                    state.closed = true;
                    return Some((Err(err.into()), state));
                }
                None => {
                    state.closed = true;
                    let fragments = state.decoder.finish();
                    state.pending.extend(fragments);
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "tests/sse_tests.rs"]
mod tests;
