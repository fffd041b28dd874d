use std::io;

use tracing::{info, instrument};

use crate::adapter::{Adapter, AdapterKey};
use crate::collaborators::{Datastore, TxnSink};
use crate::config::AdapterConfig;
use crate::registry::Registry;

/// Outcome of [`Context::on_conn_init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnInitOutcome {
    /// A configuration transaction is active elsewhere, or this adapter is
    /// not yet identified; the caller should retry after
    /// [`AdapterConfig::conn_init_retry_delay`].
    Deferred,
    /// [`TxnSink::on_connect`] was called; the adapter entered `Syncing`.
    Connected,
    /// The adapter no longer exists (already disconnected).
    AdapterGone,
}

/// Outcome of [`Context::on_readable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadableOutcome {
    /// Bytes were read but no complete frame is buffered yet.
    OkMore,
    /// At least one complete frame is buffered; `PROC_MSG` was scheduled.
    NeedProcess,
    /// The adapter was disconnected as a result of this read.
    Disconnected,
    /// The adapter no longer exists.
    AdapterGone,
}

/// Outcome of [`Context::on_writable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritableOutcome {
    /// Nothing left to write; the write event was cleared.
    Idle,
    /// Bytes remain queued; the caller should re-arm the write event.
    More,
    /// The outbound queue crossed the high-water mark; writes are paused.
    WritesOff,
    /// The adapter was disconnected as a result of this write.
    Disconnected,
    /// The adapter no longer exists.
    AdapterGone,
}

/// Owns everything the backend-adapter core needs across its entry points:
/// the live [`Registry`], the process-wide [`xpath::SubscriptionMap`], the
/// tunable [`AdapterConfig`], and the two external collaborators (`DS`
/// implements [`Datastore`], `TX` implements [`TxnSink`]).
///
/// Threading an explicit `Context` through every entry point replaces the
/// "globals initialized once" idiom from the original design (see the note
/// on global mutable state in `DESIGN.md`) with an ordinary owned struct.
#[derive(Debug)]
pub struct Context<DS, TX> {
    pub(crate) registry: Registry,
    pub(crate) subscriptions: xpath::SubscriptionMap,
    pub(crate) config: AdapterConfig,
    pub(crate) datastore: DS,
    pub(crate) txn: TX,
}

impl<DS: Datastore, TX: TxnSink> Context<DS, TX> {
    /// Builds a context from its tunables and collaborators, compiling the
    /// static subscription registry against `config.max_subscription_patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`xpath::PatternError`] if the compiled-in seed registry
    /// somehow exceeds `config.max_subscription_patterns`.
    pub fn new(config: AdapterConfig, datastore: DS, txn: TX) -> Result<Self, xpath::PatternError> {
        let subscriptions = xpath::SubscriptionMap::from_seed(config.max_subscription_patterns)?;
        Ok(Self {
            registry: Registry::new(),
            subscriptions,
            config,
            datastore,
            txn,
        })
    }

    /// The live adapter registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the live adapter registry, for callers that drive
    /// an adapter through C7's outbound builders ([`crate::txn::TxnFanout`])
    /// directly rather than through a [`Context`] entry point.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The process-wide subscription map.
    #[must_use]
    pub const fn subscriptions(&self) -> &xpath::SubscriptionMap {
        &self.subscriptions
    }

    /// The tunable configuration this context was built with.
    #[must_use]
    pub const fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// The datastore collaborator.
    #[must_use]
    pub const fn datastore(&self) -> &DS {
        &self.datastore
    }

    /// The transaction-manager collaborator.
    #[must_use]
    pub const fn txn(&self) -> &TX {
        &self.txn
    }

    /// C4's `create(fd, peer)`: accepts a new connection, registers an
    /// `Unidentified` adapter with its read event armed.
    #[instrument(skip(self, peer))]
    pub fn on_accept(&mut self, fd: i32, peer: impl Into<String>) -> AdapterKey {
        let framer_config = wire::FramerConfig {
            max_message_len: self.config.max_message_len,
            outbound_high_water: self.config.outbound_high_water,
            process_batch_cap: self.config.process_batch_cap,
        };
        let adapter = Adapter::new(fd, peer, framer_config);
        let key = self.registry.insert(adapter);
        info!(fd, "adapter accepted");
        key
    }

    /// `CONN_INIT` handler (§4.4): gated on `TxnSink::txn_in_progress` and on
    /// the adapter having already been identified via `SUBSCR_REQ`.
    pub fn on_conn_init(&mut self, key: AdapterKey) -> ConnInitOutcome {
        if self.registry.get(key).is_none() {
            return ConnInitOutcome::AdapterGone;
        }
        if self.txn.txn_in_progress() {
            return ConnInitOutcome::Deferred;
        }
        let Some(adapter) = self.registry.get_mut(key) else {
            return ConnInitOutcome::AdapterGone;
        };
        if !adapter.is_identified() {
            return ConnInitOutcome::Deferred;
        }
        adapter.events_mut().conn_init = false;
        adapter.begin_sync();
        let id = adapter.id();
        self.txn.on_connect(id);
        ConnInitOutcome::Connected
    }

    /// `CONN_READ` handler: reads available bytes and schedules `PROC_MSG`
    /// when a complete frame is buffered.
    pub fn on_readable<R: io::Read>(&mut self, key: AdapterKey, reader: &mut R) -> ReadableOutcome {
        let Some(adapter) = self.registry.get_mut(key) else {
            return ReadableOutcome::AdapterGone;
        };
        match adapter.framer_mut().read(reader) {
            wire::ReadOutcome::Disconnect => {
                self.disconnect(key);
                ReadableOutcome::Disconnected
            }
            wire::ReadOutcome::NeedProcess => {
                adapter.events_mut().proc_msg = true;
                ReadableOutcome::NeedProcess
            }
            wire::ReadOutcome::OkMore => ReadableOutcome::OkMore,
        }
    }

    /// `PROC_MSG` handler: drains buffered frames through
    /// [`Context::dispatch_message`], up to the framer's batch cap. Returns
    /// `true` if frames remain buffered and `PROC_MSG` should be rescheduled.
    pub fn on_proc_msg(&mut self, key: AdapterKey) -> bool {
        let Some(adapter) = self.registry.get_mut(key) else {
            return false;
        };
        let mut frames = Vec::new();
        let more = adapter.framer_mut().process(|bytes| frames.push(bytes.to_vec()));
        for frame in frames {
            match wire::Message::decode(&frame) {
                Ok(msg) => self.dispatch_message(key, msg),
                Err(err) => {
                    tracing::warn!(?err, len = frame.len(), "undecodable frame dropped");
                }
            }
        }
        more
    }

    /// `CONN_WRITE` handler: drains the outbound queue, entering or leaving
    /// backpressure per §4.4's branch table.
    pub fn on_writable<W: io::Write>(&mut self, key: AdapterKey, writer: &mut W) -> WritableOutcome {
        let Some(adapter) = self.registry.get_mut(key) else {
            return WritableOutcome::AdapterGone;
        };
        match adapter.framer_mut().write(writer) {
            wire::WriteOutcome::None => {
                adapter.events_mut().write = false;
                WritableOutcome::Idle
            }
            wire::WriteOutcome::More => WritableOutcome::More,
            wire::WriteOutcome::WritesOff => {
                adapter.flags_mut().writes_off = true;
                adapter.events_mut().write = false;
                adapter.events_mut().writes_on = true;
                tracing::warn!("adapter entered writes-off backpressure");
                WritableOutcome::WritesOff
            }
            wire::WriteOutcome::Disconnect => {
                self.disconnect(key);
                WritableOutcome::Disconnected
            }
        }
    }

    /// `WRITES_ON` handler: clears `WRITES_OFF` and re-arms a write if the
    /// outbound queue is still non-empty. Returns `true` if a write was armed.
    pub fn on_writes_on(&mut self, key: AdapterKey) -> bool {
        let Some(adapter) = self.registry.get_mut(key) else {
            return false;
        };
        adapter.flags_mut().writes_off = false;
        adapter.events_mut().writes_on = false;
        let pending = adapter.framer().outbound_pending() > 0;
        if pending {
            adapter.events_mut().write = true;
        }
        pending
    }

    /// C4's `disconnect()`: closes the adapter, notifies TXN, and unlinks it
    /// from the registry and by-id index. Idempotent: a second call on an
    /// already-removed key is a no-op.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, key: AdapterKey) {
        let Some(adapter) = self.registry.get_mut(key) else {
            return;
        };
        if adapter.is_disconnected() {
            return;
        }
        let id = adapter.id();
        adapter.mark_disconnected();
        self.txn.on_disconnect(id);
        self.registry.remove(key);
        info!("adapter disconnected");
    }
}
