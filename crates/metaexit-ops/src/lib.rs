//! Gasless withdrawal orchestration: bridge exits paid for by a relayer.
//!
//! Coordinates relayer discovery, meta-transaction signing, relay submission
//! and checkpoint polling to move a bridged token from the child chain back
//! to the root chain without the user holding child-chain gas.

pub mod config;
pub mod events;
pub mod orchestrator;
pub mod session;
pub mod signer;
pub mod steps;

pub use config::{MetaExitConfig, RpcEndpoints};
pub use events::{WithdrawEvent, WithdrawEventHandler};
pub use orchestrator::WithdrawalOrchestrator;
pub use session::WithdrawalSession;
pub use signer::MetaTxSigner;
pub use steps::{SignedBurn, WithdrawalSteps};
