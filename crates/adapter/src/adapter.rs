use rustc_hash::FxHashSet;
use xpath::ClientId;

/// Opaque handle identifying an adapter's slot in [`crate::registry::Registry`]'s
/// `slab::Slab`. Stable for the adapter's lifetime; reused only after the
/// slot is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterKey(pub(crate) usize);

/// Lifecycle state of a [`Adapter`], per the state diagram in §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Accepted, `CONN_INIT` not yet run or awaiting `SUBSCR_REQ`.
    Unidentified,
    /// `SUBSCR_REQ` resolved the client identity; `CONN_INIT` has not yet
    /// run (or is waiting on the config lock).
    Identified,
    /// `CONN_INIT` succeeded; the initial configuration sync is draining.
    Syncing,
    /// Sync complete; ordinary per-transaction traffic flows.
    Steady,
    /// `disconnect` has run; the adapter is inert and awaiting destruction.
    Disconnected,
}

/// Which event handles are currently armed for an adapter.
///
/// Stands in for the original design's per-event strong references: rather
/// than incrementing/decrementing a `refcount` field by hand, [`Adapter::refcount`]
/// derives the count from this struct plus registry membership, so it can
/// never drift out of sync with reality (see the design note on reference
/// counting in `DESIGN.md`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmedEvents {
    /// `CONN_INIT` scheduled (initial attempt or a retry).
    pub conn_init: bool,
    /// `CONN_READ` armed (the fd is watched for readability).
    pub read: bool,
    /// `CONN_WRITE` armed (the fd is watched for writability).
    pub write: bool,
    /// `PROC_MSG` scheduled to drain buffered frames.
    pub proc_msg: bool,
    /// `WRITES_ON` timer scheduled to clear backpressure.
    pub writes_on: bool,
}

impl ArmedEvents {
    /// Number of currently armed event handles.
    #[must_use]
    pub const fn count(self) -> usize {
        self.conn_init as usize
            + self.read as usize
            + self.write as usize
            + self.proc_msg as usize
            + self.writes_on as usize
    }
}

/// Per-adapter flags, per §3's `flags` bit-set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterFlags {
    /// Set when the framer reports `writes-off`; cleared by `WRITES_ON`.
    /// `flags.WRITES_OFF ⇒ no write event is armed` (§3 invariant).
    pub writes_off: bool,
}

/// One pending configuration change produced by the initial sync walk (C6),
/// keyed by `xpath` and ordered by `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    /// Strictly increasing, unique per adapter; assignment order is send order.
    pub seq: u64,
    /// Instance path of the changed node.
    pub xpath: String,
    /// Serialized node value, opaque to this crate.
    pub value: Vec<u8>,
}

/// One client connection's state (C4's data model), per §3.
#[derive(Debug)]
pub struct Adapter {
    key: Option<AdapterKey>,
    fd: i32,
    peer: String,
    name: String,
    id: ClientId,
    state: AdapterState,
    events: ArmedEvents,
    flags: AdapterFlags,
    framer: wire::FramerState,
    pending_cfg_changes: Vec<PendingChange>,
    pending_seen: FxHashSet<String>,
    next_seq: u64,
}

impl Adapter {
    /// Creates a new adapter for an accepted connection, per C4's `create`.
    /// The read event is armed immediately; `CONN_INIT` is left to the
    /// caller to schedule (see [`crate::context::Context::on_accept`]).
    #[must_use]
    pub fn new(fd: i32, peer: impl Into<String>, framer_config: wire::FramerConfig) -> Self {
        Self {
            key: None,
            fd,
            peer: peer.into(),
            name: format!("Unknown-FD-{fd}"),
            id: ClientId::Max,
            state: AdapterState::Unidentified,
            events: ArmedEvents {
                read: true,
                ..ArmedEvents::default()
            },
            flags: AdapterFlags::default(),
            framer: wire::FramerState::new(framer_config),
            pending_cfg_changes: Vec::new(),
            pending_seen: FxHashSet::default(),
            next_seq: 0,
        }
    }

    /// The registry slot this adapter occupies, once inserted.
    #[must_use]
    pub const fn key(&self) -> Option<AdapterKey> {
        self.key
    }

    pub(crate) fn set_key(&mut self, key: AdapterKey) {
        self.key = Some(key);
    }

    /// OS file descriptor; `-1` once disconnected.
    #[must_use]
    pub const fn fd(&self) -> i32 {
        self.fd
    }

    /// Remote peer address, opaque to this crate.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Current short identifier: `"Unknown-FD-<fd>"` until resolved.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current client identity; [`ClientId::Max`] while unresolved.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> AdapterState {
        self.state
    }

    /// Currently armed event handles.
    #[must_use]
    pub const fn events(&self) -> ArmedEvents {
        self.events
    }

    /// Mutable access to the armed-event bits, for the dispatch loop.
    pub(crate) fn events_mut(&mut self) -> &mut ArmedEvents {
        &mut self.events
    }

    /// Current flag bits.
    #[must_use]
    pub const fn flags(&self) -> AdapterFlags {
        self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut AdapterFlags {
        &mut self.flags
    }

    /// Mutable access to the per-connection framer state.
    pub fn framer_mut(&mut self) -> &mut wire::FramerState {
        &mut self.framer
    }

    /// Read-only access to the per-connection framer state.
    #[must_use]
    pub const fn framer(&self) -> &wire::FramerState {
        &self.framer
    }

    /// `true` once [`Adapter::state`] is past [`AdapterState::Unidentified`].
    #[must_use]
    pub const fn is_identified(&self) -> bool {
        !matches!(self.state, AdapterState::Unidentified | AdapterState::Disconnected)
    }

    /// Resolves this adapter's identity from a `SUBSCR_REQ`'s `client_name`,
    /// transitioning `Unidentified` → `Identified`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AdapterError::UnknownClientName`] (leaving
    /// state unchanged) if `name` does not map to a known [`ClientId`]; the
    /// caller disconnects in that case per §4.4.
    pub fn resolve_identity(&mut self, name: &str) -> Result<(), crate::error::AdapterError> {
        let id = ClientId::from_name(name);
        if id.is_unknown() {
            return Err(crate::error::AdapterError::UnknownClientName(name.to_owned()));
        }
        self.name = name.to_owned();
        self.id = id;
        self.state = AdapterState::Identified;
        Ok(())
    }

    /// Transitions `Identified` → `Syncing`, run once `CONN_INIT` succeeds.
    pub fn begin_sync(&mut self) {
        self.state = AdapterState::Syncing;
    }

    /// Transitions `Syncing` → `Steady`, run once the initial diff has drained.
    pub fn mark_steady(&mut self) {
        self.state = AdapterState::Steady;
    }

    /// `true` if `disconnect` has already run on this adapter.
    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self.state, AdapterState::Disconnected)
    }

    /// Marks this adapter disconnected: closes the logical fd, clears every
    /// armed event, and sets `WRITES_OFF`. Idempotent; a second call is a
    /// no-op, per §8's idempotence property.
    pub fn mark_disconnected(&mut self) {
        if self.is_disconnected() {
            return;
        }
        self.fd = -1;
        self.state = AdapterState::Disconnected;
        self.events = ArmedEvents::default();
        self.flags.writes_off = true;
        self.framer.mark_closed();
    }

    /// Derives this adapter's reference count from its armed events plus
    /// registry membership, rather than tracking a literal counter field.
    #[must_use]
    pub const fn refcount(&self, in_registry: bool) -> usize {
        self.events.count() + if in_registry { 1 } else { 0 }
    }

    /// Serializes `msg`, enqueues it via the framer, and requests a write
    /// event, per C4's `send` operation.
    ///
    /// Does not arm the write event while `flags.writes_off` is set: newly
    /// enqueued messages accumulate without blocking the producer (§5), but
    /// arming a write during backpressure would violate the §3 invariant
    /// `flags.WRITES_OFF ⇒ no write event is armed`. `Context::on_writes_on`
    /// re-arms the write once backpressure clears.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AdapterError::Disconnected`] if the connection
    /// is already closed; the caller (C7) treats this as "drop this adapter
    /// from the transaction's participants". Returns
    /// [`crate::error::AdapterError::Wire`] if the framer otherwise rejects
    /// the encoded frame (e.g. too large).
    pub fn send(&mut self, msg: &wire::Message) -> Result<(), crate::error::AdapterError> {
        let encoded = msg.encode();
        match self.framer.enqueue(&encoded) {
            Ok(_) => {}
            Err(wire::WireError::Closed) => return Err(crate::error::AdapterError::Disconnected),
            Err(err) => return Err(err.into()),
        }
        if !self.flags.writes_off {
            self.events.write = true;
        }
        Ok(())
    }

    /// Pushes a pending configuration change if `xpath` has not already been
    /// recorded for this adapter, assigning the next sequence number.
    /// Returns `true` if the change was newly recorded.
    pub fn push_pending_change(&mut self, xpath: String, value: Vec<u8>) -> bool {
        if self.pending_seen.contains(&xpath) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending_seen.insert(xpath.clone());
        self.pending_cfg_changes.push(PendingChange { seq, xpath, value });
        true
    }

    /// The pending configuration changes recorded so far, in `seq` order.
    #[must_use]
    pub fn pending_changes(&self) -> &[PendingChange] {
        &self.pending_cfg_changes
    }

    /// `true` if no sync walk has populated this adapter's change set yet,
    /// used by [`crate::sync::ConfigSyncDriver`] for at-most-once sync.
    #[must_use]
    pub fn pending_changes_is_empty(&self) -> bool {
        self.pending_cfg_changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_adapter() -> Adapter {
        Adapter::new(7, "127.0.0.1:9999", wire::FramerConfig::default())
    }

    #[test]
    fn new_adapter_seeds_unknown_name_and_arms_read() {
        let a = new_adapter();
        assert_eq!(a.name(), "Unknown-FD-7");
        assert_eq!(a.id(), ClientId::Max);
        assert!(a.events().read);
        assert_eq!(a.state(), AdapterState::Unidentified);
    }

    #[test]
    fn resolve_identity_accepts_known_name() {
        let mut a = new_adapter();
        assert!(a.resolve_identity("staticd").is_ok());
        assert_eq!(a.id(), ClientId::Staticd);
        assert_eq!(a.name(), "staticd");
        assert_eq!(a.state(), AdapterState::Identified);
    }

    #[test]
    fn resolve_identity_rejects_unknown_name() {
        let mut a = new_adapter();
        assert!(matches!(
            a.resolve_identity("bgpd"),
            Err(crate::error::AdapterError::UnknownClientName(name)) if name == "bgpd"
        ));
        assert_eq!(a.state(), AdapterState::Unidentified);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut a = new_adapter();
        a.mark_disconnected();
        let after_first = format!("{a:?}");
        a.mark_disconnected();
        assert_eq!(format!("{a:?}"), after_first);
        assert_eq!(a.fd(), -1);
        assert_eq!(a.events().count(), 0);
    }

    #[test]
    fn refcount_reflects_armed_events_and_registry_membership() {
        let mut a = new_adapter();
        assert_eq!(a.refcount(true), 2); // read armed + registry membership
        assert_eq!(a.refcount(false), 1);
        a.events_mut().write = true;
        assert_eq!(a.refcount(true), 3);
    }

    #[test]
    fn send_enqueues_and_arms_write() {
        let mut a = new_adapter();
        a.events_mut().write = false;
        a.send(&wire::Message::CfgApplyReq { txn_id: 1 }).expect("enqueue");
        assert!(a.events().write);
        assert!(a.framer().outbound_pending() > 0);
    }

    #[test]
    fn send_after_disconnect_fails() {
        let mut a = new_adapter();
        a.mark_disconnected();
        assert!(matches!(
            a.send(&wire::Message::CfgApplyReq { txn_id: 1 }),
            Err(crate::error::AdapterError::Disconnected)
        ));
    }

    #[test]
    fn send_does_not_arm_write_while_writes_off() {
        let mut a = new_adapter();
        a.flags_mut().writes_off = true;
        a.events_mut().write = false;
        a.send(&wire::Message::CfgApplyReq { txn_id: 1 }).expect("enqueue");
        assert!(!a.events().write, "must not arm a write while writes_off is set");
        assert!(a.framer().outbound_pending() > 0, "the message is still queued");
    }

    #[test]
    fn pending_changes_deduplicate_by_path_and_assign_increasing_seq() {
        let mut a = new_adapter();
        assert!(a.push_pending_change("/a".to_owned(), vec![1]));
        assert!(a.push_pending_change("/b".to_owned(), vec![2]));
        assert!(!a.push_pending_change("/a".to_owned(), vec![9]));
        let seqs: Vec<u64> = a.pending_changes().iter().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }
}
