/// Closed enumeration of backend clients known to the management daemon.
///
/// `Max` is the sentinel used both as the table bound for by-id indexing and
/// as the "unknown / unassigned" value for an adapter whose identity has not
/// yet been resolved via `SUBSCR_REQ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientId {
    /// The static-route daemon.
    Staticd,
    /// Sentinel: unknown client, or table bound. Never a real subscriber.
    Max,
}

impl ClientId {
    /// All known (non-sentinel) client ids, in a stable order.
    pub const KNOWN: &'static [ClientId] = &[ClientId::Staticd];

    /// Number of known (non-sentinel) client ids; also the size needed for a
    /// `by_id` table indexed by `self as usize`.
    pub const COUNT: usize = Self::KNOWN.len();

    /// Resolves a human-readable client name to a [`ClientId`].
    ///
    /// Returns [`ClientId::Max`] for any name that is not a known client,
    /// matching the specification's "unresolved → `id = MAX`" contract.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "staticd" => ClientId::Staticd,
            _ => ClientId::Max,
        }
    }

    /// The canonical human-readable name for this client.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ClientId::Staticd => "staticd",
            ClientId::Max => "unknown",
        }
    }

    /// `true` for the sentinel value (unresolved / out-of-range).
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, ClientId::Max)
    }

    /// A dense index suitable for a `[T; ClientId::COUNT]` by-id table.
    /// Returns `None` for the sentinel.
    #[must_use]
    pub const fn table_index(self) -> Option<usize> {
        match self {
            ClientId::Staticd => Some(0),
            ClientId::Max => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrips_for_known_clients() {
        for &id in ClientId::KNOWN {
            assert_eq!(ClientId::from_name(id.name()), id);
        }
    }

    #[test]
    fn unknown_name_maps_to_max() {
        assert_eq!(ClientId::from_name("bgpd"), ClientId::Max);
        assert!(ClientId::Max.is_unknown());
        assert!(!ClientId::Staticd.is_unknown());
    }
}
