//! Bridge collaborator boundary and checkpoint polling.
//!
//! The bridge encodes burn calls and builds exit proofs; this crate only
//! defines what the withdrawal flow needs from it and how long it waits
//! for a burn to be checkpointed.

use async_trait::async_trait;
use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use metaexit_types::{Hex, Result};

pub use metaexit_types::BridgeOptions;

pub mod checkpoint;

pub use checkpoint::{CheckpointPoller, CheckpointedExit, PollConfig, RetryHandler};

/// Encoded burn call and the addresses it was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnCall {
    pub data: Hex,
    pub from: Hex,
    pub to: Hex,
}

/// Encoded exit call carrying the checkpoint-inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCall {
    pub data: Hex,
}

/// Burn/exit call construction for the PoS bridge.
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn burn_erc20(&self, token: &str, amount: U256, options: &BridgeOptions) -> Result<BurnCall>;

    /// Build the exit call for a relayed burn.
    ///
    /// Fails while the burn is not yet checkpointed. Return
    /// `MetaExitError::InvalidBurn` when the hash can never produce a proof.
    async fn exit_erc20(&self, burn_tx_hash: &str, options: &BridgeOptions) -> Result<ExitCall>;
}
