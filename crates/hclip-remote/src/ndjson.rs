//! Newline-delimited JSON decoding over a chunked byte stream.

use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;

use crate::error::RemoteError;
use crate::service::RecordStream;

/// Longest record line accepted before the stream is rejected.
pub const MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

struct DecodeState<S> {
    chunks: Pin<Box<S>>,
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no newline
    scanned: usize,
    max_line: usize,
    done: bool,
}

/// Decode a stream of byte chunks into one JSON value per non-blank line.
///
/// Records are yielded as soon as their terminating newline arrives. A
/// trailing line without a newline is parsed at end of input. A line longer
/// than [`MAX_LINE_BYTES`] ends the stream with an error.
pub fn decode_ndjson<S, B, E>(chunks: S) -> RecordStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<RemoteError> + Send + 'static,
{
    decode_with_limit(chunks, MAX_LINE_BYTES)
}

fn decode_with_limit<S, B, E>(chunks: S, max_line: usize) -> RecordStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<RemoteError> + Send + 'static,
{
    let state = DecodeState {
        chunks: Box::pin(chunks),
        buf: Vec::new(),
        scanned: 0,
        max_line,
        done: false,
    };

    stream::try_unfold(state, |mut state| async move {
        loop {
            let newline = state.buf[state.scanned..].iter().position(|b| *b == b'\n');
            if let Some(offset) = newline {
                let line: Vec<u8> = state.buf.drain(..=state.scanned + offset).collect();
                state.scanned = 0;
                if let Some(value) = parse_line(&line)? {
                    return Ok(Some((value, state)));
                }
                continue;
            }
            state.scanned = state.buf.len();

            if state.buf.len() > state.max_line {
                return Err(RemoteError::InvalidResponse(format!(
                    "record line exceeds {} bytes",
                    state.max_line
                )));
            }

            if state.done {
                if state.buf.is_empty() {
                    return Ok(None);
                }
                let rest = std::mem::take(&mut state.buf);
                return match parse_line(&rest)? {
                    Some(value) => Ok(Some((value, state))),
                    None => Ok(None),
                };
            }

            match state.chunks.next().await {
                Some(chunk) => {
                    let chunk = chunk.map_err(Into::<RemoteError>::into)?;
                    state.buf.extend_from_slice(chunk.as_ref());
                }
                None => state.done = true,
            }
        }
    })
    .boxed()
}

fn parse_line(line: &[u8]) -> Result<Option<Value>, RemoteError> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(line)?))
}
