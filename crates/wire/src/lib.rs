#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `wire` provides the layers the backend-adapter protocol needs below the
//! connection state machine: a frame-level [`FramerState`] (buffering,
//! batching, and flow control over length-prefixed byte frames), a
//! message-level [`Message`] codec (the typed discriminated union exchanged
//! with backend clients), and a [`MessageCodec`] adapter for driving a real
//! async socket through `tokio_util::codec::Framed`.
//!
//! # Design
//!
//! [`FramerState`] and [`Message::encode`]/[`Message::decode`] are
//! deliberately independent: the former never looks inside a frame, the
//! latter never touches a socket. A caller feeds raw bytes in, gets raw frame
//! bytes out of [`FramerState::process`], and decodes those with
//! [`Message::decode`]. [`MessageCodec`] composes the same two concerns
//! behind the standard `tokio_util` `Decoder`/`Encoder` traits for callers
//! that want to drive an actual `tokio::net::TcpStream` rather than handle
//! readiness by hand.
//!
//! # Invariants
//!
//! - `Message::decode(&Message::encode(&m)) == Ok(m)` for every message `m`.
//! - [`FramerState`]'s outbound byte count equals enqueued bytes minus
//!   drained/written bytes.
//! - [`MessageCodec`] and [`FramerState`] agree on wire format: the same
//!   bytes decode to the same [`Message`] through either path.

mod codec;
mod error;
mod framer;
mod message;

pub use codec::{MessageCodec, DEFAULT_MAX_MESSAGE_LEN};
pub use error::WireError;
pub use framer::{FramerConfig, FramerState, ReadOutcome, WriteOutcome};
pub use message::{CfgDataItem, Message};
