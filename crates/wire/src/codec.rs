use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::WireError;
use crate::message::Message;

/// Default maximum encoded message length accepted by [`MessageCodec`],
/// matching [`crate::FramerConfig::default`]'s `max_message_len`.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

/// `tokio_util::codec` adapter for [`Message`], for driving a real async
/// socket through `tokio_util::codec::Framed` rather than the sans-io
/// [`crate::FramerState`].
///
/// Uses the identical 4-byte big-endian length prefix as [`crate::FramerState`],
/// so a connection handled through `Framed<TcpStream, MessageCodec>` and one
/// driven by hand through `FramerState` are wire-compatible.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    max_message_len: usize,
}

impl MessageCodec {
    /// Builds a codec that rejects frames longer than `max_message_len`.
    #[must_use]
    pub const fn new(max_message_len: usize) -> Self {
        Self { max_message_len }
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_LEN)
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, WireError> {
        if src.len() < 4 {
            return Ok(None);
        }
        let len = u32::from_be_bytes(src[..4].try_into().expect("checked 4 bytes")) as usize;
        if len > self.max_message_len {
            return Err(WireError::MessageTooLarge(len));
        }
        if src.len() < 4 + len {
            src.reserve(4 + len - src.len());
            return Ok(None);
        }
        src.advance(4);
        let frame = src.split_to(len);
        Message::decode(&frame).map(Some)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = WireError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), WireError> {
        let encoded = item.encode();
        if encoded.len() > self.max_message_len {
            return Err(WireError::MessageTooLarge(encoded.len()));
        }
        let len = u32::try_from(encoded.len()).expect("checked against max_message_len");
        dst.reserve(4 + encoded.len());
        dst.put_u32(len);
        dst.extend_from_slice(&encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_yields_the_same_message() {
        let mut codec = MessageCodec::default();
        let mut buf = BytesMut::new();
        let msg = Message::TxnReq {
            txn_id: 42,
            create: true,
        };
        codec.encode(msg.clone(), &mut buf).expect("encode");
        let decoded = codec.decode(&mut buf).expect("decode").expect("complete frame");
        assert_eq!(decoded, msg);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_returns_none_on_partial_frame() {
        let mut codec = MessageCodec::default();
        let mut buf = BytesMut::new();
        codec
            .encode(Message::SubscrReply, &mut buf)
            .expect("encode");
        let mut partial = buf.split_to(buf.len() - 1);
        assert_eq!(codec.decode(&mut partial).expect("decode"), None);
    }

    #[test]
    fn decode_rejects_oversized_frame() {
        let mut codec = MessageCodec::new(4);
        let mut buf = BytesMut::new();
        buf.put_u32(100);
        buf.extend_from_slice(&[0u8; 4]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(WireError::MessageTooLarge(100))
        ));
    }

    #[test]
    fn encode_rejects_oversized_message() {
        let mut codec = MessageCodec::new(2);
        let mut buf = BytesMut::new();
        assert!(matches!(
            codec.encode(Message::SubscrReply, &mut buf),
            Err(WireError::MessageTooLarge(_))
        ));
    }
}
