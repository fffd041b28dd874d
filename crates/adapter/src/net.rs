//! Bridges a connection's [`wire::FramerState`] to a real `tokio` socket.
//!
//! Per §5's scope line, the event loop itself (timers, readiness
//! scheduling) belongs to the caller: a `tokio::task::spawn_local` task on a
//! single-threaded `LocalSet`, selecting between socket readiness and the
//! fixed delays in [`crate::config::AdapterConfig`]. This module supplies
//! only the two non-blocking-equivalent operations that readiness triggers
//! — one read, one write — plus thin wrappers around the two fixed delays.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;

use wire::{FramerState, ReadOutcome, WriteOutcome};

/// Default chunk size drained from the outbound queue per [`write_once`] call.
const WRITE_CHUNK: usize = 64 * 1024;

/// Performs one readiness-triggered read: issues a single `AsyncRead::read`
/// against `stream` and feeds whatever came back to `framer`.
///
/// This differs from [`FramerState::read`], which loops a synchronous fd
/// until it would block; here the caller's event loop is what decides when
/// to call again, so a single read per wakeup is correct.
///
/// # Errors
///
/// Propagates the underlying I/O error without touching `framer`.
pub async fn read_once<S>(framer: &mut FramerState, stream: &mut S) -> io::Result<ReadOutcome>
where
    S: AsyncRead + Unpin,
{
    let mut scratch = [0u8; 8192];
    let n = stream.read(&mut scratch).await?;
    if n == 0 {
        return Ok(ReadOutcome::Disconnect);
    }
    Ok(framer.feed(&scratch[..n]))
}

/// Drains up to [`WRITE_CHUNK`] bytes of `framer`'s outbound queue and
/// writes them once to `stream`, reclaiming whatever wasn't accepted.
///
/// # Errors
///
/// On a write error, the drained bytes are pushed back onto `framer`'s
/// outbound queue (via [`FramerState::reclaim_unwritten`]) before the error
/// is returned, so no data is lost.
pub async fn write_once<S>(framer: &mut FramerState, stream: &mut S) -> io::Result<WriteOutcome>
where
    S: AsyncWrite + Unpin,
{
    let chunk = framer.drain_outbound(WRITE_CHUNK);
    if chunk.is_empty() {
        return Ok(WriteOutcome::None);
    }
    match stream.write(&chunk).await {
        Ok(n) => Ok(framer.reclaim_unwritten(&chunk[..n], &chunk[n..])),
        Err(err) => {
            framer.reclaim_unwritten(&[], &chunk);
            Err(err)
        }
    }
}

/// Suspends for [`crate::config::AdapterConfig::conn_init_retry_delay`]
/// before the caller retries a deferred `CONN_INIT`.
pub async fn conn_init_retry_delay(delay: Duration) {
    sleep(delay).await;
}

/// Suspends for [`crate::config::AdapterConfig::writes_on_delay`] before the
/// caller fires `WRITES_ON` on a backpressured adapter.
pub async fn writes_on_delay(delay: Duration) {
    sleep(delay).await;
}
