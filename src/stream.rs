//! Server-sent event stream consumer.
//!
//! DESIGN
//! ======
//! The backend answers with a chunked body of newline-separated lines; a line
//! starting with `data: ` carries a JSON payload `{"chunk": "..."}`. Network
//! packets split frames (and UTF-8 code points) arbitrarily, so
//! [`FrameDecoder`] keeps every byte after the last newline pending until the
//! next packet arrives.
//!
//! Splitting happens on raw bytes: `\n` never occurs inside a multi-byte
//! UTF-8 sequence, so a code point split across packets is reassembled before
//! its line is decoded.
//!
//! ERROR HANDLING
//! ==============
//! A malformed frame is logged and skipped; the stream carries on. Only a
//! failure of the underlying byte stream ends the delta sequence early.

use std::collections::VecDeque;

use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use tracing::{debug, warn};

/// Prefix of a line carrying a JSON payload.
pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Deserialize)]
struct FramePayload {
    #[serde(default)]
    chunk: Option<String>,
}

// =============================================================================
// FRAME DECODER
// =============================================================================

/// Incremental line decoder turning raw body bytes into text deltas.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    malformed: usize,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next packet. Returns the deltas of every line completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete
            .split(|b| *b == b'\n')
            .filter_map(|line| self.decode_line(line))
            .collect()
    }

    /// Flush at end of stream: a retained partial line is decoded once as if
    /// it had been newline-terminated.
    pub fn finish(&mut self) -> Vec<String> {
        let tail = std::mem::take(&mut self.pending);
        if tail.is_empty() {
            return Vec::new();
        }
        debug!(bytes = tail.len(), "stream: flushing unterminated final line");
        self.decode_line(&tail).into_iter().collect()
    }

    /// Number of `data:` lines whose payload failed to parse so far.
    #[must_use]
    pub fn malformed_frames(&self) -> usize {
        self.malformed
    }

    /// Bytes currently held back waiting for a newline.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<String> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let payload = line.strip_prefix(DATA_PREFIX.as_bytes())?;
        let text = String::from_utf8_lossy(payload);
        match serde_json::from_str::<FramePayload>(&text) {
            Ok(FramePayload { chunk: Some(chunk) }) if !chunk.is_empty() => Some(chunk),
            Ok(_) => None,
            Err(e) => {
                self.malformed += 1;
                warn!(error = %e, line_len = line.len(), "stream: malformed frame skipped");
                None
            }
        }
    }
}

// =============================================================================
// DELTA STREAM
// =============================================================================

struct DeltaState<S> {
    inner: S,
    decoder: FrameDecoder,
    ready: VecDeque<String>,
    finished: bool,
}

/// Adapt a byte stream into a lazy stream of text deltas.
///
/// The sequence ends when `inner` ends. An error from `inner` is yielded once
/// and ends the sequence; deltas decoded before it have already been yielded.
pub fn deltas<S, B, E>(inner: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    let state = DeltaState { inner, decoder: FrameDecoder::new(), ready: VecDeque::new(), finished: false };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(delta) = st.ready.pop_front() {
                return Some((Ok(delta), st));
            }
            if st.finished {
                return None;
            }
            match st.inner.next().await {
                Some(Ok(bytes)) => {
                    let decoded = st.decoder.push(bytes.as_ref());
                    st.ready.extend(decoded);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(e), st));
                }
                None => {
                    st.finished = true;
                    let tail = st.decoder.finish();
                    st.ready.extend(tail);
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
