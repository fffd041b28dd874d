use xpath::ClientId;

/// One node encountered while walking a subtree of the external datastore.
///
/// Implemented by the (out-of-crate) datastore; this crate only ever reads
/// `xpath`/`serialize` while building a [`crate::sync::ConfigSyncDriver`] change set.
pub trait DatastoreNode {
    /// The instance path of this node, in the form consumed by
    /// [`xpath::SubscriptionMap::resolve`].
    fn xpath(&self) -> &str;

    /// Serializes this node's value for transport in a `CfgDataReq` item.
    /// Opaque to this crate; never interpreted, only carried.
    fn serialize(&self) -> Vec<u8>;
}

/// The external datastore and its tree-diff iterator (`DS` in §1).
///
/// Out of scope to implement here; this crate only needs to walk a subtree
/// once per newly attached adapter (C6).
pub trait Datastore {
    /// The node type yielded while walking.
    type Node: DatastoreNode;

    /// Yields every node in the subtree rooted at `root_xpath`, in a stable
    /// order, so that sync sequence numbers are reproducible across walks of
    /// an unchanged datastore.
    fn walk(&self, root_xpath: &str) -> Vec<Self::Node>;
}

/// The external transaction manager (`TXN` in §1).
///
/// Owns transaction identifiers and correlates multi-client responses; this
/// crate only notifies it of connect/disconnect and of each decoded reply,
/// and polls it to learn whether a configuration transaction is active
/// anywhere in the system (gating `CONN_INIT`, per §4.4 and §5).
pub trait TxnSink {
    /// `true` if a configuration transaction is currently in progress across
    /// the whole system. Consulted by `CONN_INIT` before calling
    /// [`TxnSink::on_connect`].
    fn txn_in_progress(&self) -> bool;

    /// A newly identified adapter has reached the `IDENTIFIED` state and is
    /// ready to be driven through `CONN_INIT`.
    fn on_connect(&mut self, client: ClientId);

    /// An adapter has disconnected; remove it from any in-flight transaction.
    fn on_disconnect(&mut self, client: ClientId);

    /// Forwards a decoded `TXN_REPLY`.
    fn on_txn_reply(&mut self, client: ClientId, txn_id: u64, create: bool, success: bool);

    /// Forwards a decoded `CFG_DATA_REPLY`.
    fn on_cfg_data_reply(
        &mut self,
        client: ClientId,
        txn_id: u64,
        batch_id: u64,
        success: bool,
        error: Option<String>,
    );

    /// Forwards a decoded `CFG_APPLY_REPLY`.
    fn on_cfg_apply_reply(
        &mut self,
        client: ClientId,
        txn_id: u64,
        success: bool,
        batch_ids: Vec<u64>,
        error: Option<String>,
    );
}
