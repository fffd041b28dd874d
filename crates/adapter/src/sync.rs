use tracing::{debug, instrument};

use crate::adapter::{Adapter, PendingChange};
use crate::collaborators::{Datastore, DatastoreNode};

/// The config-sync driver (C6): on a newly steady adapter, walks the
/// datastore and filters it through the subscription map to build the set
/// of changes TXN should push to that client.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigSyncDriver;

impl ConfigSyncDriver {
    /// Returns `adapter`'s pending change set, computing it on first call
    /// (at-most-once sync per adapter, per §4.6) and returning the cached
    /// value on every subsequent call for the same adapter.
    #[instrument(skip(adapter, subscriptions, datastore), fields(adapter = %adapter.name()))]
    pub fn get_adapter_config<DS: Datastore>(
        adapter: &mut Adapter,
        subscriptions: &xpath::SubscriptionMap,
        datastore: &DS,
    ) -> &[PendingChange] {
        if adapter.pending_changes_is_empty() {
            let id = adapter.id();
            let mut emitted = 0usize;
            for node in datastore.walk("/") {
                let caps = subscriptions.resolve(node.xpath());
                if caps.contains_key(&id) && adapter.push_pending_change(node.xpath().to_owned(), node.serialize()) {
                    emitted += 1;
                }
            }
            debug!(emitted, "config-sync walk complete");
        }
        adapter.pending_changes()
    }
}
