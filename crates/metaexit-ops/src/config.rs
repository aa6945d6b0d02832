//! SDK configuration.

use serde::{Deserialize, Serialize};
use metaexit_bridge::PollConfig;
use metaexit_types::{ChainDomainConfig, Hex, DEFAULT_CHILD_TOKEN, DEFAULT_CHILD_TOKEN_NAME};

pub const DEFAULT_RELAY_URL: &str = "https://ethereumads.com/api/v1.0/metatx";

/// Meta-exit configuration. Every field can be overridden; missing fields
/// in a deserialized document keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaExitConfig {
    pub relay_url: String,
    pub domain: ChainDomainConfig,
    /// Token the relayer is paid in. Defaults to the bridged token.
    pub gas_token: Hex,
    pub gas_token_name: String,
    pub domain_version: String,
    pub request_timeout_ms: u64,
    pub poll: PollConfig,
}

impl Default for MetaExitConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            domain: ChainDomainConfig::default(),
            gas_token: DEFAULT_CHILD_TOKEN.to_string(),
            gas_token_name: DEFAULT_CHILD_TOKEN_NAME.to_string(),
            domain_version: "1".to_string(),
            request_timeout_ms: 30_000,
            poll: PollConfig::default(),
        }
    }
}

/// JSON-RPC endpoints of both chains and of the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoints {
    pub child_rpc_url: String,
    pub root_rpc_url: String,
    pub provider_url: String,
    /// Funding account; asked from the provider when unset.
    #[serde(default)]
    pub account: Option<Hex>,
}

impl MetaExitConfig {
    pub fn with_relay_url(mut self, relay_url: &str) -> Self {
        self.relay_url = relay_url.to_string();
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}
