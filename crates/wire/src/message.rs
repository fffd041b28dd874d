use crate::error::WireError;

/// One item of configuration data pushed to a client as part of a `CFG_DATA_REQ`.
///
/// `value` is the opaque serialized form of the datastore node at `xpath`; this
/// crate never interprets it, it only carries it across the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgDataItem {
    /// Instance path of the node this item describes.
    pub xpath: String,
    /// Serialized node value, opaque to the transport.
    pub value: Vec<u8>,
}

/// The discriminated union of messages exchanged between the management
/// daemon and a backend client, per the wire protocol table in the
/// specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// client→server: announce identity and (optionally) register patterns.
    SubscrReq {
        /// Human-readable client name, matched against the known client-id table.
        client_name: String,
        /// Whether this request also carries `xpath_reg`.
        subscribe_xpaths: bool,
        /// Patterns the client wishes to (re-)register; ignored by this core,
        /// which uses the static registry, but round-tripped for compatibility.
        xpath_reg: Vec<String>,
    },
    /// server→client: acknowledges `SubscrReq`. Fields are not consumed here.
    SubscrReply,
    /// server→client: begin or end a transaction with this client.
    TxnReq {
        /// Transaction identifier.
        txn_id: u64,
        /// `true` to create the transaction, `false` to destroy it.
        create: bool,
    },
    /// client→server: reply to `TxnReq`.
    TxnReply {
        /// Transaction identifier this reply concerns.
        txn_id: u64,
        /// Echoes the `create` flag of the request.
        create: bool,
        /// Whether the client accepted the request.
        success: bool,
    },
    /// server→client: push one batch of configuration data.
    CfgDataReq {
        /// Transaction identifier.
        txn_id: u64,
        /// Batch identifier, unique within the transaction.
        batch_id: u64,
        /// The items in this batch.
        data_req: Vec<CfgDataItem>,
        /// Whether this is the final batch of the transaction.
        end_of_data: bool,
    },
    /// client→server: reply to `CfgDataReq`.
    CfgDataReply {
        /// Transaction identifier.
        txn_id: u64,
        /// Batch identifier this reply concerns.
        batch_id: u64,
        /// Whether the client applied the batch successfully.
        success: bool,
        /// Error detail when `success` is `false`.
        error: Option<String>,
    },
    /// server→client: request the client commit/apply previously pushed data.
    CfgApplyReq {
        /// Transaction identifier.
        txn_id: u64,
    },
    /// client→server: reply to `CfgApplyReq`.
    CfgApplyReply {
        /// Transaction identifier.
        txn_id: u64,
        /// Whether the apply succeeded.
        success: bool,
        /// The batch ids covered by this apply.
        batch_ids: Vec<u64>,
        /// Error detail when `success` is `false`.
        error: Option<String>,
    },
    /// Reserved for future operational-state retrieval (request side).
    GetReq,
    /// Reserved for future operational-state retrieval (reply side).
    GetReply,
    /// Reserved for future out-of-band command execution (request side).
    CfgCmdReq,
    /// Reserved for future out-of-band command execution (reply side).
    CfgCmdReply,
    /// Reserved for future `show`-style introspection (request side).
    ShowCmdReq,
    /// Reserved for future `show`-style introspection (reply side).
    ShowCmdReply,
    /// Reserved for future unsolicited operational-state notifications.
    NotifyData,
}

impl Message {
    /// Encodes this message into its wire representation (no length prefix;
    /// framing is [`crate::FramerState`]'s job).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        match self {
            Message::SubscrReq {
                client_name,
                subscribe_xpaths,
                xpath_reg,
            } => {
                w.u8(0);
                w.string(client_name);
                w.bool(*subscribe_xpaths);
                w.strings(xpath_reg);
            }
            Message::SubscrReply => w.u8(1),
            Message::TxnReq { txn_id, create } => {
                w.u8(2);
                w.u64(*txn_id);
                w.bool(*create);
            }
            Message::TxnReply {
                txn_id,
                create,
                success,
            } => {
                w.u8(3);
                w.u64(*txn_id);
                w.bool(*create);
                w.bool(*success);
            }
            Message::CfgDataReq {
                txn_id,
                batch_id,
                data_req,
                end_of_data,
            } => {
                w.u8(4);
                w.u64(*txn_id);
                w.u64(*batch_id);
                w.cfg_data_items(data_req);
                w.bool(*end_of_data);
            }
            Message::CfgDataReply {
                txn_id,
                batch_id,
                success,
                error,
            } => {
                w.u8(5);
                w.u64(*txn_id);
                w.u64(*batch_id);
                w.bool(*success);
                w.opt_string(error);
            }
            Message::CfgApplyReq { txn_id } => {
                w.u8(6);
                w.u64(*txn_id);
            }
            Message::CfgApplyReply {
                txn_id,
                success,
                batch_ids,
                error,
            } => {
                w.u8(7);
                w.u64(*txn_id);
                w.bool(*success);
                w.u64s(batch_ids);
                w.opt_string(error);
            }
            Message::GetReq => w.u8(8),
            Message::GetReply => w.u8(9),
            Message::CfgCmdReq => w.u8(10),
            Message::CfgCmdReply => w.u8(11),
            Message::ShowCmdReq => w.u8(12),
            Message::ShowCmdReply => w.u8(13),
            Message::NotifyData => w.u8(14),
        }
        w.into_vec()
    }

    /// Decodes a message from a single complete frame's payload.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] if the tag is unknown, a field runs past the end
    /// of `bytes`, a string is not valid UTF-8, or bytes remain after the last
    /// field of the decoded variant.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes);
        let tag = r.u8()?;
        let msg = match tag {
            0 => Message::SubscrReq {
                client_name: r.string()?,
                subscribe_xpaths: r.bool()?,
                xpath_reg: r.strings()?,
            },
            1 => Message::SubscrReply,
            2 => Message::TxnReq {
                txn_id: r.u64()?,
                create: r.bool()?,
            },
            3 => Message::TxnReply {
                txn_id: r.u64()?,
                create: r.bool()?,
                success: r.bool()?,
            },
            4 => Message::CfgDataReq {
                txn_id: r.u64()?,
                batch_id: r.u64()?,
                data_req: r.cfg_data_items()?,
                end_of_data: r.bool()?,
            },
            5 => Message::CfgDataReply {
                txn_id: r.u64()?,
                batch_id: r.u64()?,
                success: r.bool()?,
                error: r.opt_string()?,
            },
            6 => Message::CfgApplyReq { txn_id: r.u64()? },
            7 => Message::CfgApplyReply {
                txn_id: r.u64()?,
                success: r.bool()?,
                batch_ids: r.u64s()?,
                error: r.opt_string()?,
            },
            8 => Message::GetReq,
            9 => Message::GetReply,
            10 => Message::CfgCmdReq,
            11 => Message::CfgCmdReply,
            12 => Message::ShowCmdReq,
            13 => Message::ShowCmdReply,
            14 => Message::NotifyData,
            other => return Err(WireError::UnknownTag(other)),
        };
        r.finish()?;
        Ok(msg)
    }

    /// A short name for the message kind, used in log lines.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Message::SubscrReq { .. } => "SUBSCR_REQ",
            Message::SubscrReply => "SUBSCR_REPLY",
            Message::TxnReq { .. } => "TXN_REQ",
            Message::TxnReply { .. } => "TXN_REPLY",
            Message::CfgDataReq { .. } => "CFG_DATA_REQ",
            Message::CfgDataReply { .. } => "CFG_DATA_REPLY",
            Message::CfgApplyReq { .. } => "CFG_APPLY_REQ",
            Message::CfgApplyReply { .. } => "CFG_APPLY_REPLY",
            Message::GetReq => "GET_REQ",
            Message::GetReply => "GET_REPLY",
            Message::CfgCmdReq => "CFG_CMD_REQ",
            Message::CfgCmdReply => "CFG_CMD_REPLY",
            Message::ShowCmdReq => "SHOW_CMD_REQ",
            Message::ShowCmdReply => "SHOW_CMD_REPLY",
            Message::NotifyData => "NOTIFY_DATA",
        }
    }
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn bool(&mut self, v: bool) {
        self.u8(u8::from(v));
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn bytes(&mut self, v: &[u8]) {
        self.u32(v.len() as u32);
        self.buf.extend_from_slice(v);
    }

    fn string(&mut self, v: &str) {
        self.bytes(v.as_bytes());
    }

    fn strings(&mut self, v: &[String]) {
        self.u32(v.len() as u32);
        for s in v {
            self.string(s);
        }
    }

    fn u64s(&mut self, v: &[u64]) {
        self.u32(v.len() as u32);
        for x in v {
            self.u64(*x);
        }
    }

    fn opt_string(&mut self, v: &Option<String>) {
        match v {
            Some(s) => {
                self.bool(true);
                self.string(s);
            }
            None => self.bool(false),
        }
    }

    fn cfg_data_items(&mut self, items: &[CfgDataItem]) {
        self.u32(items.len() as u32);
        for item in items {
            self.string(&item.xpath);
            self.bytes(&item.value);
        }
    }

    fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self.pos.checked_add(n).ok_or(WireError::Truncated)?;
        let slice = self.buf.get(self.pos..end).ok_or(WireError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn bool(&mut self) -> Result<bool, WireError> {
        Ok(self.u8()? != 0)
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("exactly 4 bytes");
        Ok(u32::from_be_bytes(bytes))
    }

    fn u64(&mut self) -> Result<u64, WireError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("exactly 8 bytes");
        Ok(u64::from_be_bytes(bytes))
    }

    fn bytes(&mut self) -> Result<Vec<u8>, WireError> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn string(&mut self) -> Result<String, WireError> {
        String::from_utf8(self.bytes()?).map_err(|_| WireError::InvalidUtf8)
    }

    fn strings(&mut self) -> Result<Vec<String>, WireError> {
        let n = self.u32()? as usize;
        (0..n).map(|_| self.string()).collect()
    }

    fn u64s(&mut self) -> Result<Vec<u64>, WireError> {
        let n = self.u32()? as usize;
        (0..n).map(|_| self.u64()).collect()
    }

    fn opt_string(&mut self) -> Result<Option<String>, WireError> {
        if self.bool()? {
            Ok(Some(self.string()?))
        } else {
            Ok(None)
        }
    }

    fn cfg_data_items(&mut self) -> Result<Vec<CfgDataItem>, WireError> {
        let n = self.u32()? as usize;
        (0..n)
            .map(|_| {
                Ok(CfgDataItem {
                    xpath: self.string()?,
                    value: self.bytes()?,
                })
            })
            .collect()
    }

    fn finish(self) -> Result<(), WireError> {
        if self.pos == self.buf.len() {
            Ok(())
        } else {
            Err(WireError::TrailingBytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(msg: Message) {
        let encoded = msg.encode();
        let decoded = Message::decode(&encoded).expect("decode");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn subscr_req_roundtrips() {
        roundtrip(Message::SubscrReq {
            client_name: "staticd".to_owned(),
            subscribe_xpaths: true,
            xpath_reg: vec!["/frr-vrf:lib/*".to_owned()],
        });
    }

    #[test]
    fn cfg_data_req_roundtrips_with_items_and_empty_list() {
        roundtrip(Message::CfgDataReq {
            txn_id: 7,
            batch_id: 1,
            data_req: vec![
                CfgDataItem {
                    xpath: "/frr-vrf:lib/vrf[name='default']".to_owned(),
                    value: vec![1, 2, 3],
                },
                CfgDataItem {
                    xpath: "/frr-vrf:lib/vrf[name='red']".to_owned(),
                    value: Vec::new(),
                },
            ],
            end_of_data: false,
        });
        roundtrip(Message::CfgDataReq {
            txn_id: 7,
            batch_id: 2,
            data_req: Vec::new(),
            end_of_data: true,
        });
    }

    #[test]
    fn cfg_apply_reply_roundtrips_with_and_without_error() {
        roundtrip(Message::CfgApplyReply {
            txn_id: 9,
            success: true,
            batch_ids: vec![1, 2, 3],
            error: None,
        });
        roundtrip(Message::CfgApplyReply {
            txn_id: 9,
            success: false,
            batch_ids: vec![1],
            error: Some("validation failed".to_owned()),
        });
    }

    #[test]
    fn unit_variants_roundtrip() {
        for msg in [
            Message::SubscrReply,
            Message::GetReq,
            Message::GetReply,
            Message::CfgCmdReq,
            Message::CfgCmdReply,
            Message::ShowCmdReq,
            Message::ShowCmdReply,
            Message::NotifyData,
        ] {
            roundtrip(msg);
        }
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        assert_eq!(Message::decode(&[255]), Err(WireError::UnknownTag(255)));
    }

    #[test]
    fn decode_rejects_truncated_message() {
        let encoded = Message::TxnReq {
            txn_id: 1,
            create: true,
        }
        .encode();
        assert_eq!(
            Message::decode(&encoded[..encoded.len() - 1]),
            Err(WireError::Truncated)
        );
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut encoded = Message::SubscrReply.encode();
        encoded.push(0);
        assert_eq!(Message::decode(&encoded), Err(WireError::TrailingBytes));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let mut encoded = vec![0u8]; // SubscrReq tag
        encoded.extend_from_slice(&4u32.to_be_bytes());
        encoded.extend_from_slice(&[0xff, 0xfe, 0xfd, 0xfc]);
        assert_eq!(Message::decode(&encoded), Err(WireError::InvalidUtf8));
    }
}
