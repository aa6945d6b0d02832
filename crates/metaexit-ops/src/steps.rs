//! The signing steps of a withdrawal.
//!
//! - gas funding: `transfer(relayer, gas)` on the gas token, child chain
//! - burn: bridge-encoded burn on the bridged token, child chain
//! - exit: bridge-encoded exit on the root chain manager, root chain

use ethereum_types::U256;
use metaexit_bridge::{Bridge, BridgeOptions, ExitCall};
use metaexit_eip712::abi;
use metaexit_types::{ChainDomain, Hex, Result, SignedIntent, ROOT_CHAIN_MANAGER_NAME};

use crate::config::MetaExitConfig;
use crate::signer::MetaTxSigner;

/// Signed burn and the address it was signed for.
#[derive(Debug, Clone)]
pub struct SignedBurn {
    pub intent: SignedIntent,
    pub signer: Hex,
}

pub struct WithdrawalSteps<'a> {
    signer: &'a MetaTxSigner,
    config: &'a MetaExitConfig,
}

impl<'a> WithdrawalSteps<'a> {
    pub fn new(signer: &'a MetaTxSigner, config: &'a MetaExitConfig) -> Self {
        Self { signer, config }
    }

    /// Sign the transfer that pays the relayer. Not broadcast on its own:
    /// it only travels inside a burn or exit bundle.
    pub async fn sign_gas_funding(
        &self,
        funding_source: &str,
        relayer: &str,
        gas: U256,
    ) -> Result<SignedIntent> {
        let transfer = abi::encode_transfer(relayer, gas)?;
        self.signer
            .sign(
                &transfer,
                funding_source,
                &self.config.gas_token_name,
                &self.config.gas_token,
                ChainDomain::Child,
            )
            .await
    }

    /// Have the bridge encode the burn, then sign it under the bridged
    /// token's domain.
    pub async fn sign_burn(&self, bridge: &dyn Bridge, amount: U256, options: &BridgeOptions) -> Result<SignedBurn> {
        let domain = &self.config.domain;
        let burn = bridge
            .burn_erc20(&domain.child_token, amount, &options.for_burn())
            .await?;

        let intent = self
            .signer
            .sign(&burn.data, &burn.from, &domain.child_token_name, &burn.to, ChainDomain::Child)
            .await?;

        Ok(SignedBurn { intent, signer: burn.from })
    }

    /// Sign the exit for the original burn signer on the root chain manager.
    pub async fn sign_exit(&self, exit: &ExitCall, burn_signer: &str) -> Result<SignedIntent> {
        self.signer
            .sign(
                &exit.data,
                burn_signer,
                ROOT_CHAIN_MANAGER_NAME,
                &self.config.domain.root_chain_manager,
                ChainDomain::Root,
            )
            .await
    }
}
