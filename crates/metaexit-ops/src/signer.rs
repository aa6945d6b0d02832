//! Meta-transaction signing.
//!
//! Flow: getNonce(from) on the verifying contract's chain -> MetaTransaction
//! typed data with that chain's salt -> eth_signTypedData_v4 -> SignedIntent.
//!
//! Nothing is broadcast; the result is an off-chain authorization.

use std::sync::Arc;

use metaexit_eip712::{build_typed_data, TypedDataParams};
use metaexit_rpc::{NonceResolver, Wallet};
use metaexit_types::{ChainDomain, ChainDomainConfig, Result, SignedIntent};

pub struct MetaTxSigner {
    nonces: NonceResolver,
    wallet: Arc<dyn Wallet>,
    domain: ChainDomainConfig,
    version: String,
}

impl MetaTxSigner {
    pub fn new(
        nonces: NonceResolver,
        wallet: Arc<dyn Wallet>,
        domain: ChainDomainConfig,
        version: &str,
    ) -> Self {
        Self { nonces, wallet, domain, version: version.to_string() }
    }

    /// Sign `function_sig` as a meta-transaction from `from`, verified by
    /// `verifying_contract` on `chain` under the EIP-712 domain `name`.
    ///
    /// Wallet errors pass through unchanged: a decline is
    /// `SignatureRejected`, a provider failure stays `Rpc`. Neither is
    /// retried here.
    pub async fn sign(
        &self,
        function_sig: &str,
        from: &str,
        name: &str,
        verifying_contract: &str,
        chain: ChainDomain,
    ) -> Result<SignedIntent> {
        let nonce = self.nonces.resolve(chain, verifying_contract, from).await?;

        let typed_data = build_typed_data(&TypedDataParams {
            name: name.to_string(),
            version: self.version.clone(),
            salt: self.domain.salt(chain).to_string(),
            verifying_contract: verifying_contract.to_string(),
            nonce,
            from: from.to_string(),
            function_signature: function_sig.to_string(),
        });
        let data_to_sign = typed_data.to_json()?;

        let signature = self.wallet.sign_typed_data_v4(from, &data_to_sign).await?;

        tracing::debug!(
            ?chain,
            domain = name,
            contract = verifying_contract,
            from,
            nonce,
            "signed meta-transaction"
        );

        Ok(SignedIntent {
            intent: signature,
            fn_sig: function_sig.to_string(),
            data_to_sign_str: data_to_sign,
            from: from.to_string(),
            contract_address: verifying_contract.to_string(),
        })
    }
}
