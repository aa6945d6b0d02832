//! Shared fixtures for withdrawal tests: in-process chain, wallet and
//! bridge doubles plus a mock relay.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethereum_types::U256;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use metaexit_bridge::{Bridge, BridgeOptions, BurnCall, ExitCall, PollConfig};
use metaexit_ops::{MetaExitConfig, WithdrawEvent, WithdrawalOrchestrator};
use metaexit_rpc::{ChainReader, ChainReaders, Wallet};
use metaexit_store::MemoryStore;
use metaexit_types::{Hex, MetaExitError, Result};

pub const USER: &str = "0x00000000000000000000000000000000000000b0";
pub const RELAYER: &str = "0x00000000000000000000000000000000000000e1";
pub const BURN_TARGET: &str = "0x00000000000000000000000000000000000000d2";
pub const BURN_TX_HASH: &str = "0x5e2c6e1b1bd2a4f2b2aa2e0c8c1f9e1c4e1a4b7d0f2e8d6c3b9a1f0e7d6c5b4a";
pub const BURN_DATA: &str = "0x2e1a7d4d0000000000000000000000000000000000000000000000000de0b6b3a7640000";
pub const EXIT_DATA: &str = "0x3805550f00000000000000000000000000000000000000000000000000000000000000200000000000000000000000000000000000000000000000000000000000000000";

pub const CHILD_NONCE: u64 = 4;
pub const ROOT_NONCE: u64 = 9;

/// Answers every `eth_call` with a fixed nonce and counts the reads.
pub struct NonceReader {
    nonce: u64,
    pub calls: Mutex<u32>,
}

impl NonceReader {
    pub fn new(nonce: u64) -> Arc<Self> {
        Arc::new(Self { nonce, calls: Mutex::new(0) })
    }
}

#[async_trait]
impl ChainReader for NonceReader {
    async fn call(&self, _to: &str, _data: &str) -> Result<Hex> {
        *self.calls.lock().unwrap() += 1;
        Ok(format!("0x{:064x}", self.nonce))
    }
}

/// Signs everything except the `reject_on`-th request (1-based).
pub struct MockWallet {
    reject_on: Option<usize>,
    pub requests: Mutex<Vec<(String, String)>>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { reject_on: None, requests: Mutex::new(Vec::new()) })
    }

    pub fn rejecting(call: usize) -> Arc<Self> {
        Arc::new(Self { reject_on: Some(call), requests: Mutex::new(Vec::new()) })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn default_account(&self) -> Result<Hex> {
        Ok(USER.to_string())
    }

    async fn sign_typed_data_v4(&self, address: &str, typed_data_json: &str) -> Result<Hex> {
        let mut requests = self.requests.lock().unwrap();
        requests.push((address.to_string(), typed_data_json.to_string()));
        if self.reject_on == Some(requests.len()) {
            return Err(MetaExitError::SignatureRejected("User denied message signature".into()));
        }
        Ok(format!("0xsig{}", requests.len()))
    }
}

/// Encodes a fixed burn; the exit proof is unavailable for the first
/// `exit_failures` attempts.
pub struct MockBridge {
    exit_failures: u32,
    exit_calls: Mutex<u32>,
    pub burn_options: Mutex<Vec<BridgeOptions>>,
    pub exit_options: Mutex<Vec<BridgeOptions>>,
}

impl MockBridge {
    pub fn new(exit_failures: u32) -> Arc<Self> {
        Arc::new(Self {
            exit_failures,
            exit_calls: Mutex::new(0),
            burn_options: Mutex::new(Vec::new()),
            exit_options: Mutex::new(Vec::new()),
        })
    }

    pub fn exit_calls(&self) -> u32 {
        *self.exit_calls.lock().unwrap()
    }
}

#[async_trait]
impl Bridge for MockBridge {
    async fn burn_erc20(&self, _token: &str, _amount: U256, options: &BridgeOptions) -> Result<BurnCall> {
        self.burn_options.lock().unwrap().push(options.clone());
        Ok(BurnCall {
            data: BURN_DATA.to_string(),
            from: USER.to_string(),
            to: BURN_TARGET.to_string(),
        })
    }

    async fn exit_erc20(&self, burn_tx_hash: &str, options: &BridgeOptions) -> Result<ExitCall> {
        assert_eq!(burn_tx_hash, BURN_TX_HASH);
        self.exit_options.lock().unwrap().push(options.clone());
        let mut calls = self.exit_calls.lock().unwrap();
        *calls += 1;
        if *calls <= self.exit_failures {
            return Err(MetaExitError::CheckpointNotReady("burn not checkpointed".into()));
        }
        Ok(ExitCall { data: EXIT_DATA.to_string() })
    }
}

pub struct Harness {
    pub orchestrator: WithdrawalOrchestrator,
    pub wallet: Arc<MockWallet>,
    pub bridge: Arc<MockBridge>,
    pub store: Arc<MemoryStore>,
    pub child: Arc<NonceReader>,
    pub root: Arc<NonceReader>,
    pub events: Arc<Mutex<Vec<WithdrawEvent>>>,
}

pub fn harness(relay_url: &str, wallet: Arc<MockWallet>, bridge: Arc<MockBridge>) -> Harness {
    let child = NonceReader::new(CHILD_NONCE);
    let root = NonceReader::new(ROOT_NONCE);
    let store = Arc::new(MemoryStore::new());
    let events = Arc::new(Mutex::new(Vec::new()));

    let sink = events.clone();
    let config = MetaExitConfig::default()
        .with_relay_url(relay_url)
        .with_poll(PollConfig { interval_ms: 10, ..Default::default() });

    let orchestrator = WithdrawalOrchestrator::new(
        config,
        ChainReaders::new(child.clone(), root.clone()),
        wallet.clone(),
        bridge.clone(),
        store.clone(),
        Some(Box::new(move |event| sink.lock().unwrap().push(event))),
    );

    Harness { orchestrator, wallet, bridge, store, child, root, events }
}

pub async fn mount_relayer(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "address": RELAYER })))
        .mount(server)
        .await;
}

pub async fn mount_burn(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/burn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": BURN_TX_HASH })))
        .mount(server)
        .await;
}

pub async fn mount_exit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/exit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "0xexit", "status": "queued" })))
        .mount(server)
        .await;
}

/// JSON bodies of the requests the relay received on `endpoint`.
pub async fn posted(server: &MockServer, endpoint: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.method.to_string() == "POST" && req.url.path() == endpoint)
        .map(|req| serde_json::from_slice(&req.body).unwrap())
        .collect()
}

pub fn event_names(events: &[WithdrawEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            WithdrawEvent::Started { .. } => "started",
            WithdrawEvent::RelayerDiscovered { .. } => "relayer_discovered",
            WithdrawEvent::GasFundingSigned { .. } => "gas_funding_signed",
            WithdrawEvent::BurnSigned { .. } => "burn_signed",
            WithdrawEvent::BurnRelayed { .. } => "burn_relayed",
            WithdrawEvent::CheckpointAttempt { .. } => "checkpoint_attempt",
            WithdrawEvent::Checkpointed { .. } => "checkpointed",
            WithdrawEvent::ExitSigned { .. } => "exit_signed",
            WithdrawEvent::ExitRelayed { .. } => "exit_relayed",
            WithdrawEvent::Failed { .. } => "failed",
        })
        .collect()
}
