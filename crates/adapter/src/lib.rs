#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `adapter` implements the client-adapter core of the backend-adapter
//! protocol (C4–C7 in the design): one state machine per connected backend
//! client ([`Adapter`]), the registry that holds them all ([`Registry`]),
//! the config-sync walk that seeds a newly attached client's change set
//! ([`sync::ConfigSyncDriver`]), and the thin outbound surface an external
//! transaction manager drives clients through ([`txn::TxnFanout`]).
//! [`Context`] ties these to the [`xpath`] subscription map and owns the
//! two external collaborators this crate depends on but does not implement
//! ([`Datastore`], [`TxnSink`]).
//!
//! # Design
//!
//! Adapters live in a [`Context`]'s [`Registry`], itself a `slab::Slab`:
//! [`AdapterKey`] is a stable slot index rather than a reference-counted
//! pointer, so timer and readiness callbacks can carry it around freely (see
//! the design note on arena indexing in `DESIGN.md`). An adapter's
//! reference count is derived, not stored — [`Adapter::refcount`] sums its
//! armed event handles plus registry membership, so it can never drift out
//! of sync with the events actually scheduled against it.
//!
//! [`context`] provides the lifecycle entry points (`on_accept`,
//! `on_conn_init`, `on_readable`, `on_proc_msg`, `on_writable`,
//! `on_writes_on`, `disconnect`); [`dispatch`] implements the inbound
//! message routing those entry points call into; [`net`] bridges a
//! connection's framer state to a real `tokio` socket, leaving the actual
//! event loop (readiness selection, timer scheduling) to the caller.
//!
//! # Invariants
//!
//! - At most one adapter exists with a given name at any time (see
//!   [`dispatch`]'s `SUBSCR_REQ` handling).
//! - `flags.writes_off` implies no write event is armed.
//! - Registry membership and by-id indexing are removed exactly once, at
//!   `disconnect`, never at any other point in an adapter's lifetime.

mod adapter;
mod collaborators;
mod config;
mod context;
mod dispatch;
mod error;
mod net;
mod registry;
mod status;
mod sync;
mod txn;

pub use adapter::{Adapter, AdapterFlags, AdapterKey, AdapterState, ArmedEvents, PendingChange};
pub use collaborators::{Datastore, DatastoreNode, TxnSink};
pub use config::AdapterConfig;
pub use context::{ConnInitOutcome, Context, ReadableOutcome, WritableOutcome};
pub use error::AdapterError;
pub use net::{conn_init_retry_delay, read_once, write_once, writes_on_delay};
pub use registry::Registry;
pub use status::AdapterStatus;
pub use sync::ConfigSyncDriver;
pub use txn::TxnFanout;
