use std::io::{self, ErrorKind};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::WireError;

const LENGTH_PREFIX_BYTES: usize = 4;

/// Tunables for a [`FramerState`], matching the "Tunable constants" named in
/// the specification's external-interfaces section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramerConfig {
    /// Largest single message (payload, excluding the length prefix) this
    /// framer will enqueue or accept.
    pub max_message_len: usize,
    /// Outbound queue high-water mark, in bytes, above which [`FramerState::write`]
    /// reports [`WriteOutcome::WritesOff`].
    pub outbound_high_water: usize,
    /// Maximum number of frames drained by a single [`FramerState::process`] call.
    pub process_batch_cap: usize,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            max_message_len: 16 * 1024 * 1024,
            outbound_high_water: 4 * 1024 * 1024,
            process_batch_cap: 64,
        }
    }
}

/// Result of [`FramerState::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes were read but no complete frame is buffered yet.
    OkMore,
    /// At least one complete inbound frame is now buffered; schedule processing.
    NeedProcess,
    /// The peer closed the connection or a read error occurred.
    Disconnect,
}

/// Result of [`FramerState::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing left to write.
    None,
    /// Some bytes remain queued; schedule another write.
    More,
    /// The outbound queue is above the high-water mark; pause writes.
    WritesOff,
    /// The peer closed the connection or a write error occurred.
    Disconnect,
}

/// Per-connection framer state: buffered inbound bytes, a queue of outbound
/// length-prefixed frames, and message/byte counters used by the operator
/// status dump.
///
/// A `FramerState` only understands length-prefixed framing; it has no
/// knowledge of [`crate::Message`] or any other message schema. This mirrors
/// the specification's separation between the frame-level "Framer adapter"
/// (C1) and the message-level wire protocol consumed by the adapter crate.
#[derive(Debug)]
pub struct FramerState {
    config: FramerConfig,
    inbound: BytesMut,
    outbound: BytesMut,
    closed: bool,
    pub(crate) messages_in: u64,
    pub(crate) messages_out: u64,
    pub(crate) bytes_in: u64,
    pub(crate) bytes_out: u64,
}

impl FramerState {
    /// Creates an empty framer using `config`.
    #[must_use]
    pub fn new(config: FramerConfig) -> Self {
        Self {
            config,
            inbound: BytesMut::new(),
            outbound: BytesMut::new(),
            closed: false,
            messages_in: 0,
            messages_out: 0,
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    /// Total bytes received so far (operator status dump).
    #[must_use]
    pub const fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Total bytes actually written to the peer so far (operator status dump).
    #[must_use]
    pub const fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Total complete frames handed to a [`Self::process`] handler so far.
    #[must_use]
    pub const fn messages_in(&self) -> u64 {
        self.messages_in
    }

    /// Total frames enqueued via [`Self::enqueue`] so far.
    #[must_use]
    pub const fn messages_out(&self) -> u64 {
        self.messages_out
    }

    /// Bytes currently queued for the peer but not yet drained.
    #[must_use]
    pub fn outbound_pending(&self) -> usize {
        self.outbound.len()
    }

    fn has_complete_frame(&self) -> bool {
        self.peek_frame_len().is_some()
    }

    fn peek_frame_len(&self) -> Option<usize> {
        if self.inbound.len() < LENGTH_PREFIX_BYTES {
            return None;
        }
        let len = u32::from_be_bytes(self.inbound[..LENGTH_PREFIX_BYTES].try_into().unwrap()) as usize;
        if self.inbound.len() >= LENGTH_PREFIX_BYTES + len {
            Some(len)
        } else {
            None
        }
    }

    fn take_frame(&mut self) -> Option<BytesMut> {
        let len = self.peek_frame_len()?;
        self.inbound.advance(LENGTH_PREFIX_BYTES);
        Some(self.inbound.split_to(len))
    }

    /// Reads as many bytes as are currently available (non-blocking) from
    /// `reader`, buffering them for later [`Self::process`] calls.
    pub fn read<R: io::Read>(&mut self, reader: &mut R) -> ReadOutcome {
        let mut scratch = [0u8; 8192];
        loop {
            match reader.read(&mut scratch) {
                Ok(0) => return ReadOutcome::Disconnect,
                Ok(n) => {
                    self.inbound.put_slice(&scratch[..n]);
                    self.bytes_in += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => break,
                Err(_) => return ReadOutcome::Disconnect,
            }
        }
        if self.has_complete_frame() {
            ReadOutcome::NeedProcess
        } else {
            ReadOutcome::OkMore
        }
    }

    /// Feeds already-available bytes directly into the inbound buffer,
    /// bypassing any actual I/O. Used by tests and by callers that already
    /// own the bytes (e.g. a `tokio` read future resolved elsewhere).
    pub fn feed(&mut self, bytes: &[u8]) -> ReadOutcome {
        self.inbound.put_slice(bytes);
        self.bytes_in += bytes.len() as u64;
        if self.has_complete_frame() {
            ReadOutcome::NeedProcess
        } else {
            ReadOutcome::OkMore
        }
    }

    /// Invokes `handler` once per complete buffered frame, up to the
    /// configured batch cap. Returns `true` if frames remain buffered
    /// (the caller should re-schedule processing).
    pub fn process(&mut self, mut handler: impl FnMut(&[u8])) -> bool {
        let mut handled = 0usize;
        while handled < self.config.process_batch_cap {
            match self.take_frame() {
                Some(frame) => {
                    handler(&frame);
                    self.messages_in += 1;
                    handled += 1;
                }
                None => break,
            }
        }
        self.has_complete_frame()
    }

    /// Appends a length-prefixed frame to the outbound queue.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MessageTooLarge`] if `frame` exceeds the
    /// configured maximum, or [`WireError::Closed`] if the connection has
    /// already been observed to be closed by a prior [`Self::read`] or
    /// [`Self::write`] call.
    pub fn enqueue(&mut self, frame: &[u8]) -> Result<usize, WireError> {
        if self.closed {
            return Err(WireError::Closed);
        }
        if frame.len() > self.config.max_message_len {
            return Err(WireError::MessageTooLarge(frame.len()));
        }
        self.outbound.put_u32(frame.len() as u32);
        self.outbound.put_slice(frame);
        self.messages_out += 1;
        Ok(LENGTH_PREFIX_BYTES + frame.len())
    }

    /// Writes as many queued bytes as possible (non-blocking) to `writer`.
    pub fn write<W: io::Write>(&mut self, writer: &mut W) -> WriteOutcome {
        while !self.outbound.is_empty() {
            match writer.write(&self.outbound) {
                Ok(0) => {
                    self.closed = true;
                    return WriteOutcome::Disconnect;
                }
                Ok(n) => {
                    self.outbound.advance(n);
                    self.bytes_out += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => break,
                Err(_) => {
                    self.closed = true;
                    return WriteOutcome::Disconnect;
                }
            }
        }
        self.write_outcome_for_backlog()
    }

    fn write_outcome_for_backlog(&self) -> WriteOutcome {
        if self.outbound.is_empty() {
            WriteOutcome::None
        } else if self.outbound.len() > self.config.outbound_high_water {
            WriteOutcome::WritesOff
        } else {
            WriteOutcome::More
        }
    }

    /// Drains up to `max_bytes` queued outbound bytes into a fresh buffer,
    /// for callers (such as the `tokio` integration) that perform the actual
    /// write themselves and report back how much was accepted via
    /// [`Self::reclaim_unwritten`].
    pub fn drain_outbound(&mut self, max_bytes: usize) -> Vec<u8> {
        let n = max_bytes.min(self.outbound.len());
        let chunk = self.outbound.split_to(n);
        chunk.to_vec()
    }

    /// Returns bytes that an async writer could not accept back to the front
    /// of the outbound queue, and updates byte counters for the bytes that
    /// were actually written.
    pub fn reclaim_unwritten(&mut self, written: &[u8], unwritten: &[u8]) -> WriteOutcome {
        self.bytes_out += written.len() as u64;
        if !unwritten.is_empty() {
            let mut merged = BytesMut::with_capacity(unwritten.len() + self.outbound.len());
            merged.put_slice(unwritten);
            merged.put_slice(&self.outbound);
            self.outbound = merged;
        }
        self.write_outcome_for_backlog()
    }

    /// Marks the connection closed, as observed by an external I/O layer
    /// (e.g. a `tokio` socket error). Subsequent [`Self::enqueue`] calls fail.
    pub fn mark_closed(&mut self) {
        self.closed = true;
    }
}
