//! HTTP client for the meta-transaction relay service.
//!
//! Endpoints:
//! - GET  {base}        -> { address }
//! - POST {base}/burn   { burnTx, gasTx } -> { result: <burn tx hash> }
//! - POST {base}/exit   { exitTx, gasTx } -> relayer-defined acknowledgment

use serde::Serialize;
use serde_json::Value;
use metaexit_types::{parse_address, MetaExitError, Result};
use std::time::Duration;

use crate::{BurnBundle, BurnReceipt, ExitBundle, RelayerInfo, RelayerStatus};

/// Relay client for discovering the relayer and submitting signed bundles.
pub struct RelayClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout_ms: Option<u64>) -> Self {
        let timeout_ms = timeout_ms.unwrap_or(30_000);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Resolve the relayer's receiving address.
    ///
    /// GET {base}
    pub async fn discover_relayer(&self) -> Result<RelayerInfo> {
        let resp = self.client
            .get(&self.base_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MetaExitError::RelayerUnavailable(format!("status request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(MetaExitError::RelayerUnavailable(format!(
                "relay returned status {}",
                resp.status()
            )));
        }

        let status: RelayerStatus = resp
            .json()
            .await
            .map_err(|e| MetaExitError::RelayerUnavailable(format!("failed to parse status: {}", e)))?;

        let address = status
            .address
            .filter(|a| !a.is_empty())
            .ok_or_else(|| MetaExitError::RelayerUnavailable("status response has no relayer address".into()))?;
        parse_address(&address).map_err(|_| {
            MetaExitError::RelayerUnavailable(format!("relayer address is malformed: {}", address))
        })?;

        Ok(RelayerInfo { address })
    }

    /// Submit a signed burn together with its gas-funding transfer.
    ///
    /// POST {base}/burn
    pub async fn submit_burn(&self, bundle: &BurnBundle) -> Result<BurnReceipt> {
        let body = self.post("/burn", bundle).await?;
        serde_json::from_value(body.clone()).map_err(|_| {
            MetaExitError::RelaySubmission(format!("burn acknowledgment has no result: {}", body))
        })
    }

    /// Submit a signed exit together with its gas-funding transfer.
    ///
    /// POST {base}/exit
    pub async fn submit_exit(&self, bundle: &ExitBundle) -> Result<Value> {
        self.post("/exit", bundle).await
    }

    async fn post<T: Serialize>(&self, endpoint: &str, payload: &T) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let resp = self.client
            .post(&url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MetaExitError::RelaySubmission(format!("relay request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(MetaExitError::RelaySubmission(format!(
                "relay returned status {}: {}",
                status, body
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| MetaExitError::RelaySubmission(format!("failed to parse relay response: {}", e)))?;

        tracing::debug!(endpoint, response = %body, "relay accepted bundle");
        Ok(body)
    }
}
