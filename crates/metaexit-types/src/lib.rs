use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 0x-prefixed hex string (e.g. "0x1234...").
pub type Hex = String;

/// Domain salt of the child chain (chain id 137, left-padded to 32 bytes).
pub const CHILD_CHAIN_SALT: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000089";

/// Domain salt of the root chain (chain id 1, left-padded to 32 bytes).
pub const ROOT_CHAIN_SALT: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Wrapped Ether on the child chain.
pub const DEFAULT_CHILD_TOKEN: &str = "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619";
pub const DEFAULT_CHILD_TOKEN_NAME: &str = "Wrapped Ether";

/// RootChainManager proxy on the root chain.
pub const DEFAULT_ROOT_CHAIN_MANAGER: &str = "0xA0c68C638235ee32657e8f720a23ceC1bFc77C77";

/// EIP-712 domain name the root chain manager verifies exits under.
pub const ROOT_CHAIN_MANAGER_NAME: &str = "RootChainManager";

/// Meta-exit SDK error types.
#[derive(Debug, Error)]
pub enum MetaExitError {
    #[error("failed to read nonce: {0}")]
    NonceRead(String),

    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    #[error("relayer unavailable: {0}")]
    RelayerUnavailable(String),

    #[error("relay submission failed: {0}")]
    RelaySubmission(String),

    #[error("burn not checkpointed yet: {0}")]
    CheckpointNotReady(String),

    #[error("invalid burn transaction: {0}")]
    InvalidBurn(String),

    #[error("checkpoint not reached after {attempts} attempts")]
    CheckpointTimeout { attempts: u32 },

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("withdrawal session not found: {0}")]
    SessionNotFound(String),

    #[error("withdrawal session {0} cannot be resumed")]
    SessionNotResumable(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MetaExitError>;

/// Which chain a verifying contract lives on.
///
/// Selects the domain salt and the chain read interface together, so a
/// signature can never pair one chain's salt with the other chain's nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainDomain {
    Child,
    Root,
}

/// Per-deployment constants of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainDomainConfig {
    pub child_token: Hex,
    pub child_token_name: String,
    pub root_chain_manager: Hex,
    pub child_salt: Hex,
    pub root_salt: Hex,
}

impl Default for ChainDomainConfig {
    fn default() -> Self {
        Self {
            child_token: DEFAULT_CHILD_TOKEN.to_string(),
            child_token_name: DEFAULT_CHILD_TOKEN_NAME.to_string(),
            root_chain_manager: DEFAULT_ROOT_CHAIN_MANAGER.to_string(),
            child_salt: CHILD_CHAIN_SALT.to_string(),
            root_salt: ROOT_CHAIN_SALT.to_string(),
        }
    }
}

impl ChainDomainConfig {
    /// The salt active for contracts on `chain`.
    pub fn salt(&self, chain: ChainDomain) -> &str {
        match chain {
            ChainDomain::Child => &self.child_salt,
            ChainDomain::Root => &self.root_salt,
        }
    }
}

/// Caller options forwarded to the bridge; persisted with each withdrawal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeOptions {
    pub from: Option<Hex>,
    /// Return ABI-encoded call data instead of sending a transaction.
    pub encode_abi: bool,
    /// Build the exit proof in legacy mode.
    pub legacy_proof: bool,
}

impl BridgeOptions {
    /// Options for the burn leg: encoded call data only.
    pub fn for_burn(&self) -> Self {
        Self { encode_abi: true, ..self.clone() }
    }

    /// Options for the exit leg: encoded call data with a legacy proof.
    pub fn for_exit(&self) -> Self {
        Self { encode_abi: true, legacy_proof: true, ..self.clone() }
    }
}

/// A signed meta-transaction, ready for the relay service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIntent {
    /// Structured-data signature returned by the wallet.
    pub intent: Hex,
    /// ABI-encoded call the relayer executes on the signer's behalf.
    pub fn_sig: Hex,
    /// The exact JSON document that was signed.
    pub data_to_sign_str: String,
    pub from: Hex,
    pub contract_address: Hex,
}

/// Parse a 0x-prefixed hex string to bytes.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| MetaExitError::InvalidHex(e.to_string()))
}

/// Convert bytes to a 0x-prefixed hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 20-byte address.
pub fn parse_address(addr: &str) -> Result<[u8; 20]> {
    let bytes = hex_to_bytes(addr)?;
    bytes
        .try_into()
        .map_err(|_| MetaExitError::InvalidHex(format!("not a 20-byte address: {}", addr)))
}

/// Parse a 32-byte word (salts, hashes).
pub fn parse_bytes32(word: &str) -> Result<[u8; 32]> {
    let bytes = hex_to_bytes(word)?;
    bytes
        .try_into()
        .map_err(|_| MetaExitError::InvalidHex(format!("not a 32-byte value: {}", word)))
}

/// Parse a token amount given in decimal, or in hex with a 0x prefix.
pub fn parse_amount(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    let parsed = match amount.strip_prefix("0x") {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None => U256::from_dec_str(amount).ok(),
    };
    parsed.ok_or_else(|| MetaExitError::InvalidAmount(amount.to_string()))
}
