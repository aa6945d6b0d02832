//! Per-withdrawal working state.
//!
//! Every `withdraw` call owns a fresh session; nothing here is shared
//! between concurrent withdrawals.

use std::time::{SystemTime, UNIX_EPOCH};

use ethereum_types::U256;
use serde_json::Value;
use uuid::Uuid;

use metaexit_bridge::BridgeOptions;
use metaexit_relay::RelayerInfo;
use metaexit_store::{WithdrawalRecord, WithdrawalStage};
use metaexit_types::{parse_amount, Hex, MetaExitError, Result, SignedIntent};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct WithdrawalSession {
    pub id: String,
    pub stage: WithdrawalStage,
    pub amount: U256,
    pub gas_budget: U256,
    pub options: BridgeOptions,
    pub relayer: Option<RelayerInfo>,
    pub gas_intent: Option<SignedIntent>,
    pub burn_intent: Option<SignedIntent>,
    pub burn_signer: Option<Hex>,
    pub burn_tx_hash: Option<Hex>,
    pub checkpoint_attempts: u32,
    pub exit_intent: Option<SignedIntent>,
    pub exit_result: Option<Value>,
    pub error: Option<String>,
    pub created_at: u64,
}

impl WithdrawalSession {
    pub fn new(amount: U256, gas_budget: U256, options: BridgeOptions) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stage: WithdrawalStage::Started,
            amount,
            gas_budget,
            options,
            relayer: None,
            gas_intent: None,
            burn_intent: None,
            burn_signer: None,
            burn_tx_hash: None,
            checkpoint_attempts: 0,
            exit_intent: None,
            exit_result: None,
            error: None,
            created_at: now_secs(),
        }
    }

    /// Rebuild a session from its stored record.
    pub fn from_record(record: &WithdrawalRecord) -> Result<Self> {
        Ok(Self {
            id: record.id.clone(),
            stage: record.stage,
            amount: parse_amount(&record.amount)?,
            gas_budget: parse_amount(&record.gas_budget)?,
            options: record.options.clone(),
            relayer: record.relayer.clone().map(|address| RelayerInfo { address }),
            gas_intent: record.gas_intent.clone(),
            burn_intent: record.burn_intent.clone(),
            burn_signer: record.burn_signer.clone(),
            burn_tx_hash: record.burn_tx_hash.clone(),
            checkpoint_attempts: record.checkpoint_attempts,
            exit_intent: record.exit_intent.clone(),
            exit_result: record.exit_result.clone(),
            error: record.error.clone(),
            created_at: record.created_at,
        })
    }

    pub fn to_record(&self) -> WithdrawalRecord {
        WithdrawalRecord {
            id: self.id.clone(),
            stage: self.stage,
            amount: self.amount.to_string(),
            gas_budget: self.gas_budget.to_string(),
            options: self.options.clone(),
            relayer: self.relayer.as_ref().map(|r| r.address.clone()),
            burn_signer: self.burn_signer.clone(),
            gas_intent: self.gas_intent.clone(),
            burn_intent: self.burn_intent.clone(),
            burn_tx_hash: self.burn_tx_hash.clone(),
            checkpoint_attempts: self.checkpoint_attempts,
            exit_intent: self.exit_intent.clone(),
            exit_result: self.exit_result.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: now_secs(),
        }
    }

    /// The paired gas-funding intent; every relay bundle carries it.
    pub fn gas_intent(&self) -> Result<&SignedIntent> {
        self.gas_intent
            .as_ref()
            .ok_or_else(|| MetaExitError::Other(format!("session {} has no gas-funding intent", self.id)))
    }

    pub fn burn_relayed(&self) -> bool {
        self.burn_tx_hash.is_some()
    }
}
