//! Relay service payloads and client.
//!
//! - Discover the current relayer's receiving address
//! - Submit burn and exit bundles, each paired with the gas-funding intent

use serde::{Deserialize, Serialize};
use metaexit_types::{Hex, SignedIntent};

pub mod relay_client;

pub use relay_client::RelayClient;

/// Relay status response. `address` is absent while no relayer is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerStatus {
    pub address: Option<Hex>,
}

/// Relayer resolved for one withdrawal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerInfo {
    pub address: Hex,
}

/// POST /burn body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnBundle {
    pub burn_tx: SignedIntent,
    pub gas_tx: SignedIntent,
}

/// POST /exit body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitBundle {
    pub exit_tx: SignedIntent,
    pub gas_tx: SignedIntent,
}

/// Relay acknowledgment of a burn: the child-chain transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReceipt {
    pub result: Hex,
}
