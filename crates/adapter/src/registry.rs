use slab::Slab;
use xpath::ClientId;

use crate::adapter::{Adapter, AdapterKey};
use crate::status::AdapterStatus;

/// All live adapters (C5): an arena-indexed collection plus a `by_id[MAX]`
/// table for direct client-id lookup.
///
/// Adapters live in a `slab::Slab`, per the arena-indexed design discussed in
/// §9: a [`AdapterKey`] is a stable slot index, so event/timer tasks can
/// carry it instead of a raw pointer or an `Rc`, and a removed slot can never
/// be dereferenced through a stale key.
#[derive(Debug, Default)]
pub struct Registry {
    adapters: Slab<Adapter>,
    by_id: [Option<AdapterKey>; ClientId::COUNT],
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a newly created adapter, returning its stable key. This is
    /// the sole "registry membership" reference counted in
    /// [`Adapter::refcount`].
    pub fn insert(&mut self, mut adapter: Adapter) -> AdapterKey {
        let entry = self.adapters.vacant_entry();
        let key = AdapterKey(entry.key());
        adapter.set_key(key);
        entry.insert(adapter);
        key
    }

    /// Looks up an adapter by its registry key.
    #[must_use]
    pub fn get(&self, key: AdapterKey) -> Option<&Adapter> {
        self.adapters.get(key.0)
    }

    /// Mutably looks up an adapter by its registry key.
    pub fn get_mut(&mut self, key: AdapterKey) -> Option<&mut Adapter> {
        self.adapters.get_mut(key.0)
    }

    /// Linear scan for the adapter currently bound to `fd`.
    #[must_use]
    pub fn find_by_fd(&self, fd: i32) -> Option<AdapterKey> {
        self.adapters
            .iter()
            .find(|(_, a)| a.fd() == fd)
            .map(|(k, _)| AdapterKey(k))
    }

    /// Linear scan for the adapter currently bound to `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<AdapterKey> {
        self.adapters
            .iter()
            .find(|(_, a)| a.name() == name)
            .map(|(k, _)| AdapterKey(k))
    }

    /// Direct lookup in the `by_id` table. Returns `None` for
    /// [`ClientId::Max`] and for any id with no current entry.
    #[must_use]
    pub fn by_id(&self, id: ClientId) -> Option<AdapterKey> {
        let idx = id.table_index()?;
        self.by_id[idx]
    }

    /// Indexes `key` under its adapter's current [`ClientId`], displacing
    /// (but not disconnecting) whatever key previously occupied that slot.
    /// The caller is responsible for disconnecting the displaced adapter,
    /// per §4.4's `SUBSCR_REQ` handling.
    ///
    /// Returns the previously indexed key, if any, distinct from `key`.
    pub fn index_by_id(&mut self, id: ClientId, key: AdapterKey) -> Option<AdapterKey> {
        let idx = id.table_index()?;
        let previous = self.by_id[idx].replace(key);
        previous.filter(|&prev| prev != key)
    }

    /// Removes `key` from the `by_id` table and the adapter collection,
    /// returning the removed adapter. This is the "unlink exactly once, at
    /// disconnect" step from §9's resolved open question; calling this twice
    /// for the same key is a caller bug (the second call finds nothing).
    pub fn remove(&mut self, key: AdapterKey) -> Option<Adapter> {
        let adapter = self.adapters.try_remove(key.0)?;
        if let Some(idx) = adapter.id().table_index() {
            if self.by_id[idx] == Some(key) {
                self.by_id[idx] = None;
            }
        }
        Some(adapter)
    }

    /// Number of adapters currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// `true` if no adapters are currently held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Iterates over all live adapters and their keys.
    pub fn iter(&self) -> impl Iterator<Item = (AdapterKey, &Adapter)> {
        self.adapters.iter().map(|(k, a)| (AdapterKey(k), a))
    }

    /// The operator `status` dump: one row per live adapter (§6).
    #[must_use]
    pub fn status_snapshot(&self) -> Vec<AdapterStatus> {
        self.adapters
            .iter()
            .map(|(_, a)| AdapterStatus {
                name: a.name().to_owned(),
                fd: a.fd(),
                id: a.id(),
                refcount: a.refcount(true),
                bytes_in: a.framer().bytes_in(),
                bytes_out: a.framer().bytes_out(),
                messages_in: a.framer().messages_in(),
                messages_out: a.framer().messages_out(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(fd: i32, name: &str) -> Adapter {
        let mut a = Adapter::new(fd, "peer", wire::FramerConfig::default());
        let _ = a.resolve_identity(name);
        a
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut reg = Registry::new();
        let key = reg.insert(adapter(3, "staticd"));
        assert_eq!(reg.get(key).unwrap().fd(), 3);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn find_by_fd_and_name() {
        let mut reg = Registry::new();
        let key = reg.insert(adapter(5, "staticd"));
        assert_eq!(reg.find_by_fd(5), Some(key));
        assert_eq!(reg.find_by_name("staticd"), Some(key));
        assert_eq!(reg.find_by_fd(99), None);
    }

    #[test]
    fn index_by_id_reports_previous_distinct_key() {
        let mut reg = Registry::new();
        let a1 = reg.insert(adapter(7, "staticd"));
        assert_eq!(reg.index_by_id(ClientId::Staticd, a1), None);
        assert_eq!(reg.by_id(ClientId::Staticd), Some(a1));

        let a2 = reg.insert(adapter(9, "staticd"));
        let displaced = reg.index_by_id(ClientId::Staticd, a2);
        assert_eq!(displaced, Some(a1));
        assert_eq!(reg.by_id(ClientId::Staticd), Some(a2));
    }

    #[test]
    fn remove_clears_by_id_entry_only_if_it_still_points_here() {
        let mut reg = Registry::new();
        let a1 = reg.insert(adapter(7, "staticd"));
        reg.index_by_id(ClientId::Staticd, a1);
        let a2 = reg.insert(adapter(9, "staticd"));
        reg.index_by_id(ClientId::Staticd, a2);

        // a1 was displaced; removing it must not clobber a2's by_id entry.
        reg.remove(a1);
        assert_eq!(reg.by_id(ClientId::Staticd), Some(a2));

        reg.remove(a2);
        assert_eq!(reg.by_id(ClientId::Staticd), None);
    }

    #[test]
    fn by_id_is_none_for_max() {
        let reg = Registry::new();
        assert_eq!(reg.by_id(ClientId::Max), None);
    }

    #[test]
    fn status_snapshot_reports_one_row_per_adapter() {
        let mut reg = Registry::new();
        reg.insert(adapter(3, "staticd"));
        let snapshot = reg.status_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "staticd");
        assert_eq!(snapshot[0].fd, 3);
    }
}
