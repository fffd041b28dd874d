use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while framing bytes or encoding/decoding a [`crate::Message`].
#[derive(Debug, Error, Clone)]
pub enum WireError {
    /// Underlying I/O failure from the transport a [`crate::MessageCodec`] is
    /// layered over. Wrapped in an [`Arc`] so `WireError` stays `Clone` for
    /// use in `tokio_util::codec::Framed`'s `Stream`/`Sink` items.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
    /// A frame or field ran past the end of the available bytes.
    #[error("truncated message")]
    Truncated,
    /// A decoded message left unconsumed bytes in its frame.
    #[error("trailing bytes after decoding message")]
    TrailingBytes,
    /// A length-prefixed string was not valid UTF-8.
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,
    /// The leading discriminant byte did not match any known message kind.
    #[error("unknown message tag {0}")]
    UnknownTag(u8),
    /// An outbound message exceeded the configured maximum frame size.
    #[error("message of {0} bytes exceeds the configured maximum frame size")]
    MessageTooLarge(usize),
    /// The connection's outbound queue is closed; the frame was not enqueued.
    #[error("connection is closed")]
    Closed,
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl PartialEq for WireError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind() && a.to_string() == b.to_string(),
            (Self::Truncated, Self::Truncated)
            | (Self::TrailingBytes, Self::TrailingBytes)
            | (Self::InvalidUtf8, Self::InvalidUtf8)
            | (Self::Closed, Self::Closed) => true,
            (Self::UnknownTag(a), Self::UnknownTag(b)) => a == b,
            (Self::MessageTooLarge(a), Self::MessageTooLarge(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for WireError {}
