use std::time::Duration;

/// Tunable constants for the client-adapter state machine (§6).
///
/// Grouped into a single struct with a [`Default`] impl, mirroring the
/// teacher's `RuntimeOptions`-style configuration structs (e.g.
/// `core::client::ClientConfig`): one place to read or override every knob,
/// rather than scattered constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Outbound queue high-water mark before `write` reports `writes-off`.
    pub outbound_high_water: usize,
    /// Maximum accepted encoded message length.
    pub max_message_len: usize,
    /// Maximum number of frames drained per `PROC_MSG` invocation.
    pub process_batch_cap: usize,
    /// Delay before retrying `CONN_INIT` when a config transaction is active.
    pub conn_init_retry_delay: Duration,
    /// Delay before the scheduled `PROC_MSG` re-run when frames remain buffered.
    pub proc_msg_delay: Duration,
    /// Delay before `WRITES_ON` fires after entering `writes-off`.
    pub writes_on_delay: Duration,
    /// Maximum number of patterns [`xpath::SubscriptionMap`] will accept.
    pub max_subscription_patterns: usize,
}

impl AdapterConfig {
    /// Default outbound high-water mark, bytes.
    pub const DEFAULT_OUTBOUND_HIGH_WATER: usize = 4 * 1024 * 1024;
    /// Default maximum message length, bytes.
    pub const DEFAULT_MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;
    /// Default frames-per-`PROC_MSG` cap.
    pub const DEFAULT_PROCESS_BATCH_CAP: usize = 64;
    /// Default `CONN_INIT` retry delay.
    pub const DEFAULT_CONN_INIT_RETRY_DELAY: Duration = Duration::from_millis(100);
    /// Default `PROC_MSG` re-run delay.
    pub const DEFAULT_PROC_MSG_DELAY: Duration = Duration::from_millis(10);
    /// Default `WRITES_ON` delay.
    pub const DEFAULT_WRITES_ON_DELAY: Duration = Duration::from_millis(50);
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            outbound_high_water: Self::DEFAULT_OUTBOUND_HIGH_WATER,
            max_message_len: Self::DEFAULT_MAX_MESSAGE_LEN,
            process_batch_cap: Self::DEFAULT_PROCESS_BATCH_CAP,
            conn_init_retry_delay: Self::DEFAULT_CONN_INIT_RETRY_DELAY,
            proc_msg_delay: Self::DEFAULT_PROC_MSG_DELAY,
            writes_on_delay: Self::DEFAULT_WRITES_ON_DELAY,
            max_subscription_patterns: xpath::DEFAULT_MAX_PATTERNS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_constants() {
        let config = AdapterConfig::default();
        assert_eq!(config.max_message_len, AdapterConfig::DEFAULT_MAX_MESSAGE_LEN);
        assert_eq!(config.max_subscription_patterns, xpath::DEFAULT_MAX_PATTERNS);
    }
}
