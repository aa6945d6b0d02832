//! Gasless withdrawal orchestration.
//!
//! Sequence per withdrawal:
//! 1. discover relayer
//! 2. sign gas funding (transfer to relayer)
//! 3. sign burn
//! 4. POST /burn { burnTx, gasTx }
//! 5. poll until the burn is checkpointed, sign exit
//! 6. POST /exit { exitTx, gasTx }
//!
//! Any failure aborts the session; there is no compensating action. A
//! session that fails after its burn was relayed stays in the store and
//! can be finished with `resume_exit`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use metaexit_bridge::{Bridge, BridgeOptions, CheckpointPoller, RetryHandler};
use metaexit_relay::{BurnBundle, ExitBundle, RelayClient};
use metaexit_rpc::{ChainReaders, HttpChainReader, HttpWallet, NonceResolver, Wallet};
use metaexit_store::{ListWithdrawalsQuery, SessionStore, WithdrawalRecord, WithdrawalStage};
use metaexit_types::{parse_amount, MetaExitError, Result};

use crate::config::{MetaExitConfig, RpcEndpoints};
use crate::events::{WithdrawEvent, WithdrawEventHandler};
use crate::session::WithdrawalSession;
use crate::signer::MetaTxSigner;
use crate::steps::WithdrawalSteps;

/// Runs gasless withdrawals. Shared, read-only collaborators only; each
/// withdrawal allocates its own session.
pub struct WithdrawalOrchestrator {
    config: MetaExitConfig,
    relay: RelayClient,
    signer: MetaTxSigner,
    wallet: Arc<dyn Wallet>,
    bridge: Arc<dyn Bridge>,
    store: Arc<dyn SessionStore>,
    on_event: Option<WithdrawEventHandler>,
}

impl WithdrawalOrchestrator {
    pub fn new(
        config: MetaExitConfig,
        readers: ChainReaders,
        wallet: Arc<dyn Wallet>,
        bridge: Arc<dyn Bridge>,
        store: Arc<dyn SessionStore>,
        on_event: Option<WithdrawEventHandler>,
    ) -> Self {
        let relay = RelayClient::new(&config.relay_url, Some(config.request_timeout_ms));
        let signer = MetaTxSigner::new(
            NonceResolver::new(readers),
            wallet.clone(),
            config.domain.clone(),
            &config.domain_version,
        );
        Self { config, relay, signer, wallet, bridge, store, on_event }
    }

    /// Build an orchestrator whose chain reads and signatures go over JSON-RPC.
    pub fn connect(
        config: MetaExitConfig,
        endpoints: &RpcEndpoints,
        bridge: Arc<dyn Bridge>,
        store: Arc<dyn SessionStore>,
        on_event: Option<WithdrawEventHandler>,
    ) -> Self {
        let timeout_ms = Some(config.request_timeout_ms);
        let readers = ChainReaders::new(
            Arc::new(HttpChainReader::new(&endpoints.child_rpc_url, timeout_ms)),
            Arc::new(HttpChainReader::new(&endpoints.root_rpc_url, timeout_ms)),
        );
        let mut wallet = HttpWallet::new(&endpoints.provider_url, timeout_ms);
        if let Some(ref account) = endpoints.account {
            wallet = wallet.with_account(account);
        }
        Self::new(config, readers, Arc::new(wallet), bridge, store, on_event)
    }

    fn emit(&self, event: WithdrawEvent) {
        if let Some(ref handler) = self.on_event {
            handler(event);
        }
    }

    /// Withdraw `amount` of the bridged token, paying the relayer `gas_budget`
    /// of the gas token. Returns the relay's exit acknowledgment.
    pub async fn withdraw(
        &self,
        amount: &str,
        gas_budget: &str,
        options: &BridgeOptions,
    ) -> Result<Value> {
        let amount = parse_amount(amount)?;
        let gas_budget = parse_amount(gas_budget)?;

        let mut session = WithdrawalSession::new(amount, gas_budget, options.clone());
        info!(session_id = %session.id, %amount, %gas_budget, "starting withdrawal");
        self.emit(WithdrawEvent::Started { session_id: session.id.clone() });
        self.persist(&session).await;

        match self.run(&mut session).await {
            Ok(ack) => Ok(ack),
            Err(e) => {
                self.abort(&mut session, &e).await;
                Err(e)
            }
        }
    }

    /// Finish a withdrawal whose burn was relayed but whose exit never was.
    pub async fn resume_exit(&self, session_id: &str) -> Result<Value> {
        let record = self
            .store
            .get_withdrawal(session_id)
            .await?
            .ok_or_else(|| MetaExitError::SessionNotFound(session_id.to_string()))?;

        if !record.is_resumable() {
            return Err(MetaExitError::SessionNotResumable(session_id.to_string()));
        }

        let mut session = WithdrawalSession::from_record(&record)?;
        session.error = None;
        info!(session_id, burn_tx_hash = ?session.burn_tx_hash, "resuming exit");

        match self.finish_exit(&mut session).await {
            Ok(ack) => Ok(ack),
            Err(e) => {
                self.abort(&mut session, &e).await;
                Err(e)
            }
        }
    }

    /// Withdrawals that relayed a burn but did not complete.
    pub async fn pending_exits(&self) -> Result<Vec<WithdrawalRecord>> {
        let query = ListWithdrawalsQuery { resumable_only: true, ..Default::default() };
        self.store.list_withdrawals(&query).await
    }

    async fn run(&self, session: &mut WithdrawalSession) -> Result<Value> {
        let steps = WithdrawalSteps::new(&self.signer, &self.config);

        // Relayer is resolved per session; it may rotate between withdrawals.
        let relayer = self.relay.discover_relayer().await?;
        info!(session_id = %session.id, relayer = %relayer.address, "relayer discovered");
        self.emit(WithdrawEvent::RelayerDiscovered {
            session_id: session.id.clone(),
            relayer: relayer.address.clone(),
        });
        session.relayer = Some(relayer.clone());
        self.advance(session, WithdrawalStage::RelayerDiscovered).await;

        let funding_source = self.wallet.default_account().await?;
        let gas_intent = steps
            .sign_gas_funding(&funding_source, &relayer.address, session.gas_budget)
            .await?;
        self.emit(WithdrawEvent::GasFundingSigned {
            session_id: session.id.clone(),
            from: gas_intent.from.clone(),
        });
        session.gas_intent = Some(gas_intent);
        self.advance(session, WithdrawalStage::GasFundingSigned).await;

        let burn = steps
            .sign_burn(self.bridge.as_ref(), session.amount, &session.options)
            .await?;
        self.emit(WithdrawEvent::BurnSigned {
            session_id: session.id.clone(),
            signer: burn.signer.clone(),
        });
        session.burn_signer = Some(burn.signer);
        session.burn_intent = Some(burn.intent.clone());
        self.advance(session, WithdrawalStage::BurnSigned).await;

        let bundle = BurnBundle {
            burn_tx: burn.intent,
            gas_tx: session.gas_intent()?.clone(),
        };
        let receipt = self.relay.submit_burn(&bundle).await?;
        info!(session_id = %session.id, burn_tx_hash = %receipt.result, "burn relayed");
        self.emit(WithdrawEvent::BurnRelayed {
            session_id: session.id.clone(),
            burn_tx_hash: receipt.result.clone(),
        });
        session.burn_tx_hash = Some(receipt.result);
        self.advance(session, WithdrawalStage::BurnRelayed).await;

        self.finish_exit(session).await
    }

    /// Checkpoint poll, exit signing and exit submission.
    async fn finish_exit(&self, session: &mut WithdrawalSession) -> Result<Value> {
        let steps = WithdrawalSteps::new(&self.signer, &self.config);
        let burn_tx_hash = session
            .burn_tx_hash
            .clone()
            .ok_or_else(|| MetaExitError::SessionNotResumable(session.id.clone()))?;
        let burn_signer = session
            .burn_signer
            .clone()
            .ok_or_else(|| MetaExitError::SessionNotResumable(session.id.clone()))?;

        let session_id = session.id.clone();
        let on_retry = |attempt: u32, e: &MetaExitError| {
            self.emit(WithdrawEvent::CheckpointAttempt {
                session_id: session_id.clone(),
                attempt,
                error: e.to_string(),
            });
        };

        let on_retry: RetryHandler<'_> = &on_retry;

        let poller = CheckpointPoller::new(self.bridge.as_ref(), self.config.poll.clone());
        let checkpointed = poller
            .wait_for_exit(&burn_tx_hash, &session.options.for_exit(), Some(on_retry))
            .await?;
        self.emit(WithdrawEvent::Checkpointed {
            session_id: session.id.clone(),
            attempts: checkpointed.attempts,
        });
        session.checkpoint_attempts += checkpointed.attempts;
        self.advance(session, WithdrawalStage::Checkpointed).await;

        let exit_intent = steps.sign_exit(&checkpointed.exit, &burn_signer).await?;
        self.emit(WithdrawEvent::ExitSigned { session_id: session.id.clone() });
        session.exit_intent = Some(exit_intent.clone());
        self.advance(session, WithdrawalStage::ExitSigned).await;

        let bundle = ExitBundle {
            exit_tx: exit_intent,
            gas_tx: session.gas_intent()?.clone(),
        };
        let ack = self.relay.submit_exit(&bundle).await?;
        info!(session_id = %session.id, ack = %ack, "exit relayed");
        self.emit(WithdrawEvent::ExitRelayed { session_id: session.id.clone() });
        session.exit_result = Some(ack.clone());
        self.advance(session, WithdrawalStage::Completed).await;

        Ok(ack)
    }

    async fn advance(&self, session: &mut WithdrawalSession, stage: WithdrawalStage) {
        session.stage = stage;
        self.persist(session).await;
    }

    /// Record a failed session. A relayed burn without an exit is an
    /// unrecoverable intermediate state for this call and is logged as such.
    async fn abort(&self, session: &mut WithdrawalSession, e: &MetaExitError) {
        let failed_at = session.stage;
        if session.burn_relayed() {
            error!(
                session_id = %session.id,
                stage = ?failed_at,
                burn_tx_hash = ?session.burn_tx_hash,
                error = %e,
                "withdrawal aborted after burn was relayed; exit pending"
            );
        } else {
            warn!(session_id = %session.id, stage = ?failed_at, error = %e, "withdrawal aborted");
        }

        session.error = Some(e.to_string());
        session.stage = WithdrawalStage::Failed;
        self.persist(session).await;
        self.emit(WithdrawEvent::Failed {
            session_id: session.id.clone(),
            stage: failed_at,
            message: e.to_string(),
        });
    }

    async fn persist(&self, session: &WithdrawalSession) {
        if let Err(e) = self.store.upsert_withdrawal(&session.to_record()).await {
            warn!(session_id = %session.id, error = %e, "failed to persist withdrawal record");
        }
    }
}
