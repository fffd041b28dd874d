use thiserror::Error;

/// Errors raised by the client-adapter state machine and its collaborators.
///
/// Kept local to this crate, like `wire::WireError` and `xpath::PatternError`
/// are kept local to theirs, and converted at the boundary with `#[from]`
/// rather than folded into one workspace-wide error type.
///
/// Returned by every fallible public operation on [`crate::Adapter`] and
/// [`crate::txn::TxnFanout`]: [`crate::Adapter::resolve_identity`] (§4.4's
/// `SUBSCR_REQ` handling) and [`crate::Adapter::send`] (C4's `send`, which
/// C7's `TxnFanout` builders delegate to).
#[derive(Debug, Error)]
pub enum AdapterError {
    /// `SUBSCR_REQ` named a client unknown to [`xpath::ClientId::from_name`].
    #[error("unknown client name {0:?}")]
    UnknownClientName(String),
    /// The operation targets an adapter that has already disconnected.
    #[error("adapter is disconnected")]
    Disconnected,
    /// The wire codec rejected a frame for a reason other than the
    /// connection being closed (e.g. the frame exceeded the configured
    /// maximum length).
    #[error("wire protocol error: {0}")]
    Wire(#[from] wire::WireError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_client_name_message_includes_name() {
        let err = AdapterError::UnknownClientName("bgpd".to_owned());
        assert!(err.to_string().contains("bgpd"));
    }

    #[test]
    fn wire_error_converts_via_from() {
        let err: AdapterError = wire::WireError::MessageTooLarge(1).into();
        assert!(matches!(err, AdapterError::Wire(wire::WireError::MessageTooLarge(1))));
    }
}
