//! In-memory storage adapter for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::*;
use metaexit_types::{MetaExitError, Result};

/// In-memory storage adapter (for testing and ephemeral use).
pub struct MemoryStore {
    withdrawals: Mutex<HashMap<String, WithdrawalRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            withdrawals: Mutex::new(HashMap::new()),
        }
    }

    fn withdrawals(&self) -> Result<MutexGuard<'_, HashMap<String, WithdrawalRecord>>> {
        self.withdrawals
            .lock()
            .map_err(|_| MetaExitError::Store("withdrawal store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn upsert_withdrawal(&self, record: &WithdrawalRecord) -> Result<()> {
        let mut store = self.withdrawals()?;
        store.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_withdrawal(&self, id: &str) -> Result<Option<WithdrawalRecord>> {
        let store = self.withdrawals()?;
        Ok(store.get(id).cloned())
    }

    async fn list_withdrawals(&self, query: &ListWithdrawalsQuery) -> Result<Vec<WithdrawalRecord>> {
        let store = self.withdrawals()?;
        let mut filtered: Vec<WithdrawalRecord> = store
            .values()
            .filter(|r| {
                if let Some(stage) = query.stage {
                    if r.stage != stage { return false; }
                }
                if query.resumable_only && !r.is_resumable() {
                    return false;
                }
                true
            })
            .cloned()
            .collect();
        filtered.sort_by_key(|r| r.created_at);
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaexit_types::{BridgeOptions, SignedIntent};

    fn record(id: &str, stage: WithdrawalStage, burn_tx_hash: Option<&str>) -> WithdrawalRecord {
        WithdrawalRecord {
            id: id.into(),
            stage,
            amount: "1000000000000000000".into(),
            gas_budget: "21000".into(),
            options: BridgeOptions::default(),
            relayer: None,
            burn_signer: Some("0x00000000000000000000000000000000000000b0".into()),
            gas_intent: Some(SignedIntent {
                intent: "0xsig".into(),
                fn_sig: "0xa9059cbb".into(),
                data_to_sign_str: "{}".into(),
                from: "0x00000000000000000000000000000000000000b0".into(),
                contract_address: "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619".into(),
            }),
            burn_intent: None,
            burn_tx_hash: burn_tx_hash.map(str::to_string),
            checkpoint_attempts: 0,
            exit_intent: None,
            exit_result: None,
            error: None,
            created_at: id.len() as u64,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store.upsert_withdrawal(&record("a", WithdrawalStage::Started, None)).await.unwrap();
        store.upsert_withdrawal(&record("a", WithdrawalStage::BurnRelayed, Some("0xb"))).await.unwrap();

        let got = store.get_withdrawal("a").await.unwrap().unwrap();
        assert_eq!(got.stage, WithdrawalStage::BurnRelayed);
        assert!(store.get_withdrawal("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_resumable() {
        let store = MemoryStore::new();
        store.upsert_withdrawal(&record("a", WithdrawalStage::Failed, None)).await.unwrap();
        store.upsert_withdrawal(&record("bb", WithdrawalStage::Failed, Some("0xb"))).await.unwrap();
        store.upsert_withdrawal(&record("ccc", WithdrawalStage::Completed, Some("0xc"))).await.unwrap();

        // in flight: burn relayed, exit not yet sent
        store.upsert_withdrawal(&record("dddd", WithdrawalStage::BurnRelayed, Some("0xd"))).await.unwrap();
        store.upsert_withdrawal(&record("eeeee", WithdrawalStage::ExitSigned, Some("0xe"))).await.unwrap();

        let query = ListWithdrawalsQuery { resumable_only: true, ..Default::default() };
        let resumable = store.list_withdrawals(&query).await.unwrap();
        assert_eq!(resumable.len(), 1);
        assert_eq!(resumable[0].id, "bb");

        let failed = ListWithdrawalsQuery { stage: Some(WithdrawalStage::Failed), ..Default::default() };
        assert_eq!(store.list_withdrawals(&failed).await.unwrap().len(), 2);
    }
}
