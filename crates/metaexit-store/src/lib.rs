//! Storage adapter trait and implementations for withdrawal records.
//!
//! Defines the `SessionStore` trait that all storage backends must implement.
//! Provides a `MemoryStore` for testing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use metaexit_types::{BridgeOptions, Hex, Result, SignedIntent};

pub mod memory;

pub use memory::MemoryStore;

/// Progress of one withdrawal, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStage {
    Started,
    RelayerDiscovered,
    GasFundingSigned,
    BurnSigned,
    BurnRelayed,
    Checkpointed,
    ExitSigned,
    Completed,
    Failed,
}

/// Snapshot of a withdrawal session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: String,
    pub stage: WithdrawalStage,
    pub amount: String, // decimal
    pub gas_budget: String, // decimal
    /// Caller options, replayed when the exit leg is resumed.
    #[serde(default)]
    pub options: BridgeOptions,
    pub relayer: Option<Hex>,
    pub burn_signer: Option<Hex>,
    pub gas_intent: Option<SignedIntent>,
    pub burn_intent: Option<SignedIntent>,
    pub burn_tx_hash: Option<Hex>,
    pub checkpoint_attempts: u32,
    pub exit_intent: Option<SignedIntent>,
    pub exit_result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl WithdrawalRecord {
    /// The withdrawal failed after its burn was relayed. Records in any
    /// other stage belong to a withdrawal that is still running or done.
    pub fn is_resumable(&self) -> bool {
        self.stage == WithdrawalStage::Failed
            && self.burn_tx_hash.is_some()
            && self.burn_signer.is_some()
            && self.gas_intent.is_some()
    }
}

/// Query for listing withdrawal records.
#[derive(Debug, Clone, Default)]
pub struct ListWithdrawalsQuery {
    pub stage: Option<WithdrawalStage>,
    pub resumable_only: bool,
}

/// The core storage adapter trait.
///
/// All methods are async to support both in-memory and persistent backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    // --- Lifecycle ---
    async fn init(&self) -> Result<()> { Ok(()) }
    async fn close(&self) -> Result<()> { Ok(()) }

    // --- Withdrawals ---
    async fn upsert_withdrawal(&self, record: &WithdrawalRecord) -> Result<()>;
    async fn get_withdrawal(&self, id: &str) -> Result<Option<WithdrawalRecord>>;
    async fn list_withdrawals(&self, query: &ListWithdrawalsQuery) -> Result<Vec<WithdrawalRecord>>;
}
