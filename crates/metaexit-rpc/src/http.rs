//! JSON-RPC over HTTP implementations of `ChainReader` and `Wallet`.
//!
//! Methods:
//! - eth_call [{to, data}, "latest"]
//! - eth_accounts []
//! - eth_signTypedData_v4 [address, typedDataJson]

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use metaexit_types::{Hex, MetaExitError, Result};

use crate::{ChainReader, Wallet};

/// EIP-1193 "user rejected request".
const USER_REJECTED: i64 = 4001;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Outcome of a JSON-RPC exchange that reached the node.
enum RpcOutcome<T> {
    Result(T),
    Error(JsonRpcError),
}

/// Minimal JSON-RPC transport shared by the reader and the wallet.
struct RpcTransport {
    url: String,
    client: reqwest::Client,
}

impl RpcTransport {
    fn new(url: &str, timeout_ms: Option<u64>) -> Self {
        let timeout_ms = timeout_ms.unwrap_or(30_000);
        Self {
            url: url.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<RpcOutcome<T>> {
        let request = JsonRpcRequest { jsonrpc: "2.0", method, params, id: 1 };

        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MetaExitError::Rpc(format!("{} request to {} failed: {}", method, self.url, e)))?;

        if !resp.status().is_success() {
            return Err(MetaExitError::Rpc(format!(
                "{} returned status {}",
                method,
                resp.status()
            )));
        }

        let body: JsonRpcResponse<T> = resp
            .json()
            .await
            .map_err(|e| MetaExitError::Rpc(format!("failed to parse {} response: {}", method, e)))?;

        if let Some(error) = body.error {
            return Ok(RpcOutcome::Error(error));
        }
        body.result
            .map(RpcOutcome::Result)
            .ok_or_else(|| MetaExitError::Rpc(format!("{} response has no result", method)))
    }
}

/// `ChainReader` backed by a node's JSON-RPC endpoint.
pub struct HttpChainReader {
    transport: RpcTransport,
}

impl HttpChainReader {
    pub fn new(rpc_url: &str, timeout_ms: Option<u64>) -> Self {
        Self { transport: RpcTransport::new(rpc_url, timeout_ms) }
    }
}

#[async_trait]
impl ChainReader for HttpChainReader {
    async fn call(&self, to: &str, data: &str) -> Result<Hex> {
        let params = vec![json!({ "to": to, "data": data }), json!("latest")];
        match self.transport.request::<Hex>("eth_call", params).await? {
            RpcOutcome::Result(hex) => Ok(hex),
            RpcOutcome::Error(e) => Err(MetaExitError::Rpc(format!(
                "eth_call to {} failed: {} (code: {})",
                to, e.message, e.code
            ))),
        }
    }
}

/// `Wallet` backed by an EIP-1193 provider exposed over JSON-RPC.
pub struct HttpWallet {
    transport: RpcTransport,
    account: Option<Hex>,
}

impl HttpWallet {
    pub fn new(provider_url: &str, timeout_ms: Option<u64>) -> Self {
        Self { transport: RpcTransport::new(provider_url, timeout_ms), account: None }
    }

    /// Pin the funding account instead of asking the provider for it.
    pub fn with_account(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }
}

#[async_trait]
impl Wallet for HttpWallet {
    async fn default_account(&self) -> Result<Hex> {
        if let Some(ref account) = self.account {
            return Ok(account.clone());
        }
        match self.transport.request::<Vec<Hex>>("eth_accounts", Vec::new()).await? {
            RpcOutcome::Result(accounts) => accounts
                .into_iter()
                .next()
                .ok_or_else(|| MetaExitError::Rpc("provider exposes no accounts".into())),
            RpcOutcome::Error(e) => Err(MetaExitError::Rpc(format!(
                "eth_accounts failed: {} (code: {})",
                e.message, e.code
            ))),
        }
    }

    async fn sign_typed_data_v4(&self, address: &str, typed_data_json: &str) -> Result<Hex> {
        let params = vec![json!(address), json!(typed_data_json)];
        match self.transport.request::<Hex>("eth_signTypedData_v4", params).await? {
            RpcOutcome::Result(signature) => Ok(signature),
            RpcOutcome::Error(e) if e.code == USER_REJECTED => Err(
                MetaExitError::SignatureRejected(format!("user rejected request: {}", e.message)),
            ),
            RpcOutcome::Error(e) => Err(MetaExitError::Rpc(format!(
                "eth_signTypedData_v4 failed: {} (code: {})",
                e.message, e.code
            ))),
        }
    }
}
