use std::fmt;

use xpath::ClientId;

/// One row of the operator `status` dump (§6): per-adapter identity and
/// traffic counters, suitable for an eventual CLI to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterStatus {
    /// Adapter's current short name.
    pub name: String,
    /// OS file descriptor, or `-1` if already disconnected.
    pub fd: i32,
    /// Resolved client identity, or [`ClientId::Max`] if unresolved.
    pub id: ClientId,
    /// Derived reference count (armed events + registry membership).
    pub refcount: usize,
    /// Total inbound bytes seen by this adapter's framer.
    pub bytes_in: u64,
    /// Total outbound bytes written by this adapter's framer.
    pub bytes_out: u64,
    /// Total inbound frames decoded.
    pub messages_in: u64,
    /// Total outbound frames written.
    pub messages_out: u64,
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (fd={}, id={}, refcount={}) in={}b/{}msg out={}b/{}msg",
            self.name,
            self.fd,
            self.id.name(),
            self.refcount,
            self.bytes_in,
            self.messages_in,
            self.bytes_out,
            self.messages_out,
        )
    }
}
