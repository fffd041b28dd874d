/// Per (pattern, client) capability bits.
///
/// The static registry this crate ships sets all three bits uniformly for
/// every registered (pattern, client) pair; the type still tracks them
/// individually because `resolve` consults them separately and a future,
/// richer registry may set them independently (see the open question
/// recorded in `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityTriple {
    /// Client wants to validate proposed configuration before apply.
    pub validate_config: bool,
    /// Client wants to be notified of committed configuration changes.
    pub notify_config: bool,
    /// Client owns (and should be asked for) operational data under this pattern.
    pub own_oper_data: bool,
}

impl CapabilityTriple {
    /// All three bits set. The static registry's seed subscriptions use this.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            validate_config: true,
            notify_config: true,
            own_oper_data: true,
        }
    }

    /// Bitwise-OR merge, used when the same client is reachable through more
    /// than one equally-maximal matching pattern.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            validate_config: self.validate_config || other.validate_config,
            notify_config: self.notify_config || other.notify_config,
            own_oper_data: self.own_oper_data || other.own_oper_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ors_each_bit_independently() {
        let a = CapabilityTriple {
            validate_config: true,
            notify_config: false,
            own_oper_data: false,
        };
        let b = CapabilityTriple {
            validate_config: false,
            notify_config: true,
            own_oper_data: false,
        };
        assert_eq!(
            a.merge(b),
            CapabilityTriple {
                validate_config: true,
                notify_config: true,
                own_oper_data: false,
            }
        );
    }
}
