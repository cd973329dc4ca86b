//! Server-sent event decoding.
//!
//! The body of a streaming response is a sequence of newline-terminated
//! lines. Lines starting with `data: ` carry one JSON document each, except
//! `data: [DONE]` which ends the stream. Every other line is ignored.

use futures::Stream;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::codec::Decodable;
use crate::errors::{DecodeError, WebserviceResult};

use super::client::DEFAULT_MAX_BODY_SIZE;

const DATA_PREFIX: &[u8] = b"data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Classification of one complete line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A `data: ` line; holds the trimmed payload.
    Data(&'a str),
    /// Anything else: blank keep-alives, comments, `event:`/`id:` fields.
    Ignored,
}

impl<'a> LineKind<'a> {
    /// Classifies a line with its terminator already removed.
    pub fn classify(line: &'a [u8]) -> Result<Self, DecodeError> {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Ok(LineKind::Ignored);
        };

        let payload = std::str::from_utf8(payload).map_err(|e| DecodeError::InvalidUtf8 {
            offset: DATA_PREFIX.len() + e.valid_up_to(),
        })?;

        Ok(LineKind::Data(payload.trim()))
    }
}

/// One decoded unit of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<T> {
    /// A decoded event.
    Event(T),
    /// The `[DONE]` sentinel.
    Done,
}

/// Decoder lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No bytes seen yet.
    Idle,
    /// Accepting chunks.
    Receiving,
    /// Sentinel seen or input ended cleanly.
    Completed,
    /// An event failed to decode.
    Failed,
}

/// Incremental line decoder.
///
/// Chunks are appended with [`push`](Self::push); complete lines are pulled
/// one at a time with [`next_frame`](Self::next_frame). A line split across
/// chunks stays buffered until its newline arrives, up to the line ceiling.
#[derive(Debug)]
pub struct EventDecoder<T> {
    buffer: Vec<u8>,
    /// Start of the first unconsumed line.
    consumed: usize,
    /// Bytes past `consumed` already known to contain no newline.
    scanned: usize,
    max_line: usize,
    state: DecoderState,
    _output: PhantomData<fn() -> T>,
}

impl<T: Decodable> EventDecoder<T> {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            consumed: 0,
            scanned: 0,
            max_line: DEFAULT_MAX_BODY_SIZE,
            state: DecoderState::Idle,
            _output: PhantomData,
        }
    }

    /// Sets the longest line, in bytes, the decoder will buffer.
    pub fn with_max_line(mut self, limit: usize) -> Self {
        self.max_line = limit;
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Returns true once no further frames will be produced.
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, DecoderState::Completed | DecoderState::Failed)
    }

    /// Number of buffered bytes not yet part of a complete line.
    pub fn pending_len(&self) -> usize {
        self.buffer.len() - self.consumed
    }

    /// Appends a raw chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.is_terminated() {
            return;
        }
        self.state = DecoderState::Receiving;

        if self.consumed > 0 {
            self.buffer.drain(..self.consumed);
            self.consumed = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Extracts and decodes the next complete line that carries a frame.
    ///
    /// Returns `None` when more input is needed or the decoder has terminated.
    pub fn next_frame(&mut self) -> Option<Result<Frame<T>, DecodeError>> {
        loop {
            if self.is_terminated() {
                return None;
            }

            let search_from = self.consumed + self.scanned;
            let Some(offset) = self.buffer[search_from..].iter().position(|b| *b == b'\n') else {
                self.scanned = self.pending_len();
                if self.scanned > self.max_line {
                    return Some(Err(self.overflow()));
                }
                return None;
            };

            let start = self.consumed;
            let end = search_from + offset;
            if end - start > self.max_line {
                return Some(Err(self.overflow()));
            }
            self.consumed = end + 1;
            self.scanned = 0;

            let mut line = &self.buffer[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }

            let payload = match LineKind::classify(line) {
                Ok(LineKind::Ignored) => continue,
                Ok(LineKind::Data(payload)) => payload,
                Err(e) => {
                    self.state = DecoderState::Failed;
                    return Some(Err(e));
                }
            };

            if payload == DONE_SENTINEL {
                tracing::debug!("Stream sentinel received");
                self.state = DecoderState::Completed;
                return Some(Ok(Frame::Done));
            }

            return Some(match T::decode(payload.as_bytes()) {
                Ok(event) => Ok(Frame::Event(event)),
                Err(e) => {
                    self.state = DecoderState::Failed;
                    Err(e)
                }
            });
        }
    }

    fn overflow(&mut self) -> DecodeError {
        self.state = DecoderState::Failed;
        self.buffer.clear();
        self.consumed = 0;
        self.scanned = 0;
        DecodeError::Overflow {
            limit: self.max_line,
        }
    }

    /// Marks end of input.
    ///
    /// A trailing fragment without a newline is discarded; its length is
    /// returned so callers can report it.
    pub fn finish(&mut self) -> usize {
        if self.is_terminated() {
            return 0;
        }

        let dropped = self.pending_len();
        if dropped > 0 {
            tracing::warn!(bytes = dropped, "Discarding unterminated trailing line");
        }
        self.buffer.clear();
        self.consumed = 0;
        self.scanned = 0;
        self.state = DecoderState::Completed;
        dropped
    }
}

impl<T: Decodable> Default for EventDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

type BoxEventStream<T> = Pin<Box<dyn Stream<Item = WebserviceResult<T>> + Send>>;

/// Lazily decoded event stream returned by
/// [`Webservice::execute_streaming`](crate::Webservice::execute_streaming).
///
/// Nothing is sent until the first poll. Dropping the stream stops reading
/// and releases the connection. After an error the stream ends.
pub struct EventStream<T> {
    inner: BoxEventStream<T>,
}

impl<T> EventStream<T> {
    pub(crate) fn new(inner: BoxEventStream<T>) -> Self {
        Self { inner }
    }
}

impl<T> Stream for EventStream<T> {
    type Item = WebserviceResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<T> std::fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}
