//! Wait for a burn to be checkpointed and build its exit call.
//!
//! AWAITING_CHECKPOINT: attempt -> fail -> sleep(interval) -> attempt ...
//! CHECKPOINTED:        first successful exit build
//!
//! Failures other than `InvalidBurn` are read as "not checkpointed yet".
//! With the default config the loop has no attempt limit or deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};
use metaexit_types::{MetaExitError, Result};

use crate::{Bridge, BridgeOptions, ExitCall};

/// Checkpoint polling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    /// Attempt limit. `Some(0)` allows no attempt and times out at once.
    pub max_attempts: Option<u32>,
    pub deadline_ms: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            max_attempts: None,
            deadline_ms: None,
        }
    }
}

/// Exit call built once the burn was checkpointed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointedExit {
    pub exit: ExitCall,
    pub attempts: u32,
}

/// Callback invoked after each failed attempt with the attempt number.
pub type RetryHandler<'a> = &'a (dyn Fn(u32, &MetaExitError) + Send + Sync);

pub struct CheckpointPoller<'a> {
    bridge: &'a dyn Bridge,
    config: PollConfig,
}

impl<'a> CheckpointPoller<'a> {
    pub fn new(bridge: &'a dyn Bridge, config: PollConfig) -> Self {
        Self { bridge, config }
    }

    /// Poll `exit_erc20` until it succeeds, the burn is reported invalid,
    /// or a configured bound is reached.
    pub async fn wait_for_exit(
        &self,
        burn_tx_hash: &str,
        options: &BridgeOptions,
        on_retry: Option<RetryHandler<'_>>,
    ) -> Result<CheckpointedExit> {
        let interval = Duration::from_millis(self.config.interval_ms);
        let deadline = self.config.deadline_ms.map(Duration::from_millis);
        let started = Instant::now();
        let mut attempt = 0u32;

        if self.config.max_attempts == Some(0) {
            return Err(MetaExitError::CheckpointTimeout { attempts: 0 });
        }

        loop {
            attempt += 1;

            match self.bridge.exit_erc20(burn_tx_hash, options).await {
                Ok(exit) => {
                    info!(burn_tx_hash, attempts = attempt, "burn checkpointed");
                    return Ok(CheckpointedExit { exit, attempts: attempt });
                }
                Err(e @ MetaExitError::InvalidBurn(_)) => return Err(e),
                Err(e) => {
                    debug!(burn_tx_hash, attempt, error = %e, "burn not checkpointed yet");
                    if let Some(handler) = on_retry {
                        handler(attempt, &e);
                    }
                }
            }

            if self.config.max_attempts.map_or(false, |max| attempt >= max) {
                return Err(MetaExitError::CheckpointTimeout { attempts: attempt });
            }
            if deadline.map_or(false, |limit| started.elapsed() + interval > limit) {
                return Err(MetaExitError::CheckpointTimeout { attempts: attempt });
            }

            info!(burn_tx_hash, wait_ms = self.config.interval_ms, "waiting for checkpoint");
            tokio::time::sleep(interval).await;
        }
    }
}
