use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::capability::CapabilityTriple;
use crate::client_id::ClientId;
use crate::error::PatternError;
use crate::matcher::{is_root_scope, match_len};
use crate::seed::SEED_REGISTRY;

/// Default bound on the number of patterns a [`SubscriptionMap`] will accept,
/// matching the specification's "bounded to a configured maximum number of
/// patterns".
pub const DEFAULT_MAX_PATTERNS: usize = 256;

/// One registered pattern and the clients subscribed to it, fixed for the
/// lifetime of the map.
#[derive(Debug, Clone)]
pub struct SubscriptionEntry {
    /// The glob pattern, as matched by [`crate::matcher::match_len`].
    pub pattern: String,
    /// Subscribers and their per-pattern capability bits.
    pub subscribers: FxHashMap<ClientId, CapabilityTriple>,
}

/// Static registry mapping patterns to subscribing clients (C3).
///
/// Built once (typically via [`SubscriptionMap::from_seed`]) and treated as
/// read-only thereafter; the specification excludes dynamic rediscovery.
#[derive(Debug, Clone)]
pub struct SubscriptionMap {
    entries: Vec<SubscriptionEntry>,
}

impl SubscriptionMap {
    /// Builds a map from explicit entries, rejecting sets above `max_patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::TooManyPatterns`] if `entries.len() > max_patterns`,
    /// or [`PatternError::EmptyPattern`] if any pattern string is empty.
    pub fn new(entries: Vec<SubscriptionEntry>, max_patterns: usize) -> Result<Self, PatternError> {
        if entries.len() > max_patterns {
            return Err(PatternError::TooManyPatterns {
                found: entries.len(),
                max: max_patterns,
            });
        }
        for (i, entry) in entries.iter().enumerate() {
            if entry.pattern.is_empty() {
                return Err(PatternError::EmptyPattern(i));
            }
        }
        Ok(Self { entries })
    }

    /// Builds a map from the compiled-in static registry (§6), assigning all
    /// three capability bits to every (pattern, client) pair per the open
    /// question resolved in `DESIGN.md`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the seed registry itself (which this crate
    /// controls) somehow exceeds `max_patterns`; this can only happen if a
    /// caller passes an unreasonably small bound.
    pub fn from_seed(max_patterns: usize) -> Result<Self, PatternError> {
        let entries = SEED_REGISTRY
            .iter()
            .map(|row| {
                let mut subscribers = FxHashMap::default();
                for &client in row.clients {
                    subscribers.insert(client, CapabilityTriple::all());
                }
                SubscriptionEntry {
                    pattern: row.pattern.to_owned(),
                    subscribers,
                }
            })
            .collect();
        Self::new(entries, max_patterns)
    }

    /// Resolves `xpath` to the union of subscribers of its longest-matching
    /// pattern(s), OR-merging capability bits for clients reachable through
    /// more than one equally-maximal pattern.
    ///
    /// Root-scope paths (`"/"`, `"/*"`) match every registered pattern
    /// unconditionally, per the specification's special case.
    #[must_use]
    pub fn resolve(&self, xpath: &str) -> FxHashMap<ClientId, CapabilityTriple> {
        let mut result: FxHashMap<ClientId, CapabilityTriple> = FxHashMap::default();

        if is_root_scope(xpath) {
            for entry in &self.entries {
                merge_subscribers(&mut result, entry);
            }
            return result;
        }

        let mut best_len = 0usize;
        let mut best: Vec<&SubscriptionEntry> = Vec::new();
        for entry in &self.entries {
            let len = match_len(&entry.pattern, xpath);
            if len == 0 {
                continue;
            }
            match len.cmp(&best_len) {
                Ordering::Greater => {
                    best_len = len;
                    best.clear();
                    best.push(entry);
                }
                Ordering::Equal => best.push(entry),
                Ordering::Less => {}
            }
        }

        for entry in best {
            merge_subscribers(&mut result, entry);
        }
        result
    }

    /// The registered patterns and their subscribers, for the operator's
    /// `xpath_register` dump.
    #[must_use]
    pub fn register_snapshot(&self) -> &[SubscriptionEntry] {
        &self.entries
    }

    /// Resolves `xpath` and renders the subscriber list for the operator's
    /// `xpath_subscr_info` dump.
    #[must_use]
    pub fn subscr_info(&self, xpath: &str) -> Vec<(ClientId, CapabilityTriple)> {
        let mut rows: Vec<_> = self.resolve(xpath).into_iter().collect();
        rows.sort_by_key(|(id, _)| id.name());
        rows
    }
}

fn merge_subscribers(
    into: &mut FxHashMap<ClientId, CapabilityTriple>,
    entry: &SubscriptionEntry,
) {
    for (&client, &caps) in &entry.subscribers {
        into.entry(client)
            .and_modify(|existing| *existing = existing.merge(caps))
            .or_insert(caps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, ClientId)]) -> Vec<SubscriptionEntry> {
        pairs
            .iter()
            .map(|(pattern, client)| {
                let mut subscribers = FxHashMap::default();
                subscribers.insert(*client, CapabilityTriple::all());
                SubscriptionEntry {
                    pattern: (*pattern).to_owned(),
                    subscribers,
                }
            })
            .collect()
    }

    #[test]
    fn longest_match_scenario() {
        let map = SubscriptionMap::new(
            entries(&[("/a/*", ClientId::Staticd), ("/a/b/*", ClientId::Staticd)]),
            10,
        )
        .unwrap();
        // Both patterns point at the same client here, so this test only
        // exercises the zero/nonzero boundary; see `xpath::matcher` for the
        // length comparison itself.
        assert!(!map.resolve("/a/b/c").is_empty());
        assert!(!map.resolve("/a/x").is_empty());
        assert!(map.resolve("/unrelated").is_empty());
    }

    #[test]
    fn root_scope_unions_all_patterns() {
        let map = SubscriptionMap::from_seed(DEFAULT_MAX_PATTERNS).unwrap();
        let resolved = map.resolve("/");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[&ClientId::Staticd], CapabilityTriple::all());
        assert_eq!(map.resolve("/*"), resolved);
    }

    #[test]
    fn control_plane_protocol_pattern_resolves_with_all_capability_bits() {
        let map = SubscriptionMap::from_seed(DEFAULT_MAX_PATTERNS).unwrap();
        let xpath = "/frr-routing:routing/control-plane-protocols/control-plane-protocol[type='frr-staticd:staticd'][name='staticd'][vrf='default']/frr-staticd:staticd/route-list[prefix='10.0.0.0/24']";
        let resolved = map.resolve(xpath);
        assert_eq!(resolved.get(&ClientId::Staticd), Some(&CapabilityTriple::all()));
    }

    #[test]
    fn too_many_patterns_is_rejected() {
        let err = SubscriptionMap::new(entries(&[("/a/*", ClientId::Staticd)]), 0).unwrap_err();
        assert_eq!(err, PatternError::TooManyPatterns { found: 1, max: 0 });
    }

    #[test]
    fn subscr_info_is_sorted_by_client_name() {
        let map = SubscriptionMap::from_seed(DEFAULT_MAX_PATTERNS).unwrap();
        let rows = map.subscr_info("/");
        assert_eq!(rows, vec![(ClientId::Staticd, CapabilityTriple::all())]);
    }
}
