use crate::client_id::ClientId;

/// One row of the static subscription registry: a pattern and the clients
/// interested in it. Reproduced verbatim from the deployed registry so the
/// resolver stays compatible with the real static-route daemon bindings.
pub struct SeedRow {
    /// The registered glob pattern.
    pub pattern: &'static str,
    /// Clients subscribed to this pattern.
    pub clients: &'static [ClientId],
}

/// The process-wide static subscription registry. Re-derived only at
/// startup; the specification explicitly excludes dynamic rediscovery.
pub const SEED_REGISTRY: &[SeedRow] = &[
    SeedRow {
        pattern: "/frr-vrf:lib/*",
        clients: &[ClientId::Staticd],
    },
    SeedRow {
        pattern: "/frr-interface:lib/*",
        clients: &[ClientId::Staticd],
    },
    SeedRow {
        pattern: "/frr-routing:routing/control-plane-protocols/control-plane-protocol[type='frr-staticd:staticd'][name='staticd'][vrf='default']/frr-staticd:staticd/*",
        clients: &[ClientId::Staticd],
    },
];
