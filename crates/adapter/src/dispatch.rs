use tracing::{debug, error, info, instrument, trace};
use wire::Message;

use crate::adapter::AdapterKey;
use crate::collaborators::{Datastore, TxnSink};
use crate::context::Context;

impl<DS: Datastore, TX: TxnSink> Context<DS, TX> {
    /// C4's inbound dispatch: routes one decoded message to its handler.
    ///
    /// Every `Message` variant is matched explicitly — there is no catch-all
    /// arm — so that a new variant added to [`wire::Message`] fails to
    /// compile here instead of silently falling through.
    #[instrument(skip(self, msg), fields(kind = msg.kind_name()))]
    pub fn dispatch_message(&mut self, key: AdapterKey, msg: Message) {
        match msg {
            Message::SubscrReq { client_name, .. } => self.handle_subscr_req(key, &client_name),
            Message::TxnReply {
                txn_id,
                create,
                success,
            } => {
                if let Some(id) = self.registry.get(key).map(crate::adapter::Adapter::id) {
                    self.txn.on_txn_reply(id, txn_id, create, success);
                }
            }
            Message::CfgDataReply {
                txn_id,
                batch_id,
                success,
                error,
            } => {
                if let Some(id) = self.registry.get(key).map(crate::adapter::Adapter::id) {
                    self.txn.on_cfg_data_reply(id, txn_id, batch_id, success, error);
                }
            }
            Message::CfgApplyReply {
                txn_id,
                success,
                batch_ids,
                error,
            } => {
                if let Some(id) = self.registry.get(key).map(crate::adapter::Adapter::id) {
                    self.txn.on_cfg_apply_reply(id, txn_id, success, batch_ids, error);
                }
            }
            Message::GetReply | Message::CfgCmdReply | Message::ShowCmdReply | Message::NotifyData => {
                debug!(kind = msg.kind_name(), "accepted but unhandled reply kind");
            }
            Message::SubscrReply
            | Message::TxnReq { .. }
            | Message::CfgDataReq { .. }
            | Message::CfgApplyReq { .. }
            | Message::GetReq
            | Message::CfgCmdReq
            | Message::ShowCmdReq => {
                trace!(kind = msg.kind_name(), "ignoring server-direction message received from a client");
            }
        }
    }

    /// `SUBSCR_REQ` handling (§4.4): resolves identity, disconnects on an
    /// unknown name, displaces any adapter previously indexed under the same
    /// client id, and sweeps for any other live adapter sharing the name
    /// (covers a reconnect racing ahead of the old connection's half-close).
    fn handle_subscr_req(&mut self, key: AdapterKey, client_name: &str) {
        let result = match self.registry.get_mut(key) {
            Some(adapter) => adapter.resolve_identity(client_name),
            None => return,
        };
        if let Err(err) = result {
            error!(client_name, %err, "unknown client name on SUBSCR_REQ; disconnecting");
            self.disconnect(key);
            return;
        }

        let id = self
            .registry
            .get(key)
            .map_or(xpath::ClientId::Max, crate::adapter::Adapter::id);

        if let Some(displaced) = self.registry.index_by_id(id, key) {
            info!(?displaced, "displacing previous adapter indexed under this client id");
            self.disconnect(displaced);
        }

        let stale: Vec<AdapterKey> = self
            .registry
            .iter()
            .filter(|&(other, adapter)| other != key && adapter.name() == client_name)
            .map(|(other, _)| other)
            .collect();
        for other in stale {
            info!(?other, "disconnecting stale adapter sharing this client name");
            self.disconnect(other);
        }

        if let Some(adapter) = self.registry.get_mut(key) {
            adapter.events_mut().conn_init = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wire::Message;
    use xpath::ClientId;

    use crate::collaborators::{Datastore, DatastoreNode, TxnSink};
    use crate::config::AdapterConfig;
    use crate::context::Context;

    struct NoNode;
    impl DatastoreNode for NoNode {
        fn xpath(&self) -> &str {
            ""
        }
        fn serialize(&self) -> Vec<u8> {
            Vec::new()
        }
    }

    struct EmptyDatastore;
    impl Datastore for EmptyDatastore {
        type Node = NoNode;
        fn walk(&self, _root_xpath: &str) -> Vec<NoNode> {
            Vec::new()
        }
    }

    #[derive(Default, Clone)]
    struct RecordingTxn {
        connected: Rc<RefCell<Vec<ClientId>>>,
        disconnected: Rc<RefCell<Vec<ClientId>>>,
        txn_replies: Rc<RefCell<Vec<(ClientId, u64, bool, bool)>>>,
    }

    impl TxnSink for RecordingTxn {
        fn txn_in_progress(&self) -> bool {
            false
        }
        fn on_connect(&mut self, client: ClientId) {
            self.connected.borrow_mut().push(client);
        }
        fn on_disconnect(&mut self, client: ClientId) {
            self.disconnected.borrow_mut().push(client);
        }
        fn on_txn_reply(&mut self, client: ClientId, txn_id: u64, create: bool, success: bool) {
            self.txn_replies.borrow_mut().push((client, txn_id, create, success));
        }
        fn on_cfg_data_reply(
            &mut self,
            _client: ClientId,
            _txn_id: u64,
            _batch_id: u64,
            _success: bool,
            _error: Option<String>,
        ) {
        }
        fn on_cfg_apply_reply(
            &mut self,
            _client: ClientId,
            _txn_id: u64,
            _success: bool,
            _batch_ids: Vec<u64>,
            _error: Option<String>,
        ) {
        }
    }

    fn context() -> Context<EmptyDatastore, RecordingTxn> {
        Context::new(AdapterConfig::default(), EmptyDatastore, RecordingTxn::default()).expect("context")
    }

    #[test]
    fn subscr_req_with_unknown_name_disconnects_the_adapter() {
        let mut ctx = context();
        let key = ctx.on_accept(7, "peer-a");
        ctx.dispatch_message(
            key,
            Message::SubscrReq {
                client_name: "bgpd".to_owned(),
                subscribe_xpaths: false,
                xpath_reg: Vec::new(),
            },
        );
        assert!(ctx.registry().get(key).is_none());
    }

    #[test]
    fn subscr_req_with_known_name_identifies_and_arms_conn_init() {
        let mut ctx = context();
        let key = ctx.on_accept(7, "peer-a");
        ctx.dispatch_message(
            key,
            Message::SubscrReq {
                client_name: "staticd".to_owned(),
                subscribe_xpaths: false,
                xpath_reg: Vec::new(),
            },
        );
        let adapter = ctx.registry().get(key).expect("still present");
        assert_eq!(adapter.id(), ClientId::Staticd);
        assert!(adapter.events().conn_init);
    }

    #[test]
    fn reconnect_displaces_previous_adapter_for_the_same_client_id() {
        let mut ctx = context();
        let first = ctx.on_accept(7, "peer-a");
        ctx.dispatch_message(
            first,
            Message::SubscrReq {
                client_name: "staticd".to_owned(),
                subscribe_xpaths: false,
                xpath_reg: Vec::new(),
            },
        );
        let second = ctx.on_accept(9, "peer-b");
        ctx.dispatch_message(
            second,
            Message::SubscrReq {
                client_name: "staticd".to_owned(),
                subscribe_xpaths: false,
                xpath_reg: Vec::new(),
            },
        );

        assert!(ctx.registry().get(first).is_none());
        assert!(ctx.registry().get(second).is_some());
        assert_eq!(ctx.registry().by_id(ClientId::Staticd), Some(second));
    }

    #[test]
    fn txn_reply_forwards_to_txn_sink() {
        let mut ctx = context();
        let key = ctx.on_accept(7, "peer-a");
        ctx.dispatch_message(
            key,
            Message::SubscrReq {
                client_name: "staticd".to_owned(),
                subscribe_xpaths: false,
                xpath_reg: Vec::new(),
            },
        );
        ctx.dispatch_message(
            key,
            Message::TxnReply {
                txn_id: 1,
                create: true,
                success: true,
            },
        );
        assert_eq!(
            ctx.txn().txn_replies.borrow().as_slice(),
            &[(ClientId::Staticd, 1, true, true)]
        );
    }

    #[test]
    fn unhandled_reply_kinds_and_server_direction_messages_do_not_panic() {
        let mut ctx = context();
        let key = ctx.on_accept(7, "peer-a");
        for msg in [
            Message::GetReply,
            Message::CfgCmdReply,
            Message::ShowCmdReply,
            Message::NotifyData,
            Message::SubscrReply,
            Message::GetReq,
            Message::CfgCmdReq,
            Message::ShowCmdReq,
            Message::TxnReq { txn_id: 1, create: true },
            Message::CfgApplyReq { txn_id: 1 },
        ] {
            ctx.dispatch_message(key, msg);
        }
        assert!(ctx.registry().get(key).is_some());
    }
}
