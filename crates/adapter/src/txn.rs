use wire::{CfgDataItem, Message};

use crate::adapter::Adapter;
use crate::error::AdapterError;

/// Thin adapter over C4's outbound message builders (C7): the only surface
/// the external transaction manager uses to drive a client through a
/// configuration transaction.
///
/// Every method returns `Err(AdapterError::Disconnected)` when the adapter's
/// connection has already closed, matching §4.7's "negative status
/// indicates drop this adapter from the txn's participants" contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct TxnFanout;

impl TxnFanout {
    /// Opens a transaction: `send_txn_req(txn_id, create = true)`.
    pub fn create_txn(adapter: &mut Adapter, txn_id: u64) -> Result<(), AdapterError> {
        adapter.send(&Message::TxnReq { txn_id, create: true })
    }

    /// Closes a transaction: `send_txn_req(txn_id, create = false)`.
    pub fn destroy_txn(adapter: &mut Adapter, txn_id: u64) -> Result<(), AdapterError> {
        adapter.send(&Message::TxnReq {
            txn_id,
            create: false,
        })
    }

    /// Pushes one batch of configuration data.
    pub fn send_cfg_data_create_req(
        adapter: &mut Adapter,
        txn_id: u64,
        batch_id: u64,
        data_req: Vec<CfgDataItem>,
        end_of_data: bool,
    ) -> Result<(), AdapterError> {
        adapter.send(&Message::CfgDataReq {
            txn_id,
            batch_id,
            data_req,
            end_of_data,
        })
    }

    /// Requests the client commit/apply previously pushed batches.
    pub fn send_cfg_apply_req(adapter: &mut Adapter, txn_id: u64) -> Result<(), AdapterError> {
        adapter.send(&Message::CfgApplyReq { txn_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> Adapter {
        Adapter::new(7, "peer", wire::FramerConfig::default())
    }

    #[test]
    fn create_txn_sends_txn_req_with_create_true() {
        let mut a = adapter();
        TxnFanout::create_txn(&mut a, 1).expect("send");
        assert!(a.framer().outbound_pending() > 0);
    }

    #[test]
    fn destroy_txn_sends_txn_req_with_create_false() {
        let mut a = adapter();
        TxnFanout::destroy_txn(&mut a, 1).expect("send");
        assert!(a.framer().outbound_pending() > 0);
    }

    #[test]
    fn send_cfg_data_create_req_carries_items() {
        let mut a = adapter();
        TxnFanout::send_cfg_data_create_req(
            &mut a,
            1,
            0,
            vec![CfgDataItem {
                xpath: "/frr-vrf:lib/vrf[name='default']".to_owned(),
                value: vec![1, 2, 3],
            }],
            true,
        )
        .expect("send");
        assert!(a.framer().outbound_pending() > 0);
    }

    #[test]
    fn operations_on_closed_adapter_report_disconnected() {
        let mut a = adapter();
        a.mark_disconnected();
        assert!(matches!(TxnFanout::create_txn(&mut a, 1), Err(AdapterError::Disconnected)));
        assert!(matches!(TxnFanout::destroy_txn(&mut a, 1), Err(AdapterError::Disconnected)));
        assert!(matches!(
            TxnFanout::send_cfg_apply_req(&mut a, 1),
            Err(AdapterError::Disconnected)
        ));
    }
}
