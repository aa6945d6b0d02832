//! Withdrawal progress events for an injected observer.

use metaexit_store::WithdrawalStage;
use metaexit_types::Hex;

/// Withdrawal event for progress reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawEvent {
    Started { session_id: String },
    RelayerDiscovered { session_id: String, relayer: Hex },
    GasFundingSigned { session_id: String, from: Hex },
    BurnSigned { session_id: String, signer: Hex },
    BurnRelayed { session_id: String, burn_tx_hash: Hex },
    CheckpointAttempt { session_id: String, attempt: u32, error: String },
    Checkpointed { session_id: String, attempts: u32 },
    ExitSigned { session_id: String },
    ExitRelayed { session_id: String },
    Failed { session_id: String, stage: WithdrawalStage, message: String },
}

/// Callback type for withdrawal events.
pub type WithdrawEventHandler = Box<dyn Fn(WithdrawEvent) + Send + Sync>;
