//! Chain and wallet collaborators.
//!
//! - `ChainReader`: read-only `eth_call` against one chain
//! - `Wallet`: structured-data signing via `eth_signTypedData_v4`
//! - `NonceResolver`: reads a signer's meta-transaction nonce from the
//!   chain the verifying contract lives on

use std::sync::Arc;

use async_trait::async_trait;
use metaexit_eip712::abi;
use metaexit_types::{ChainDomain, Hex, MetaExitError, Result};

pub mod http;

pub use http::{HttpChainReader, HttpWallet};

/// Read-only access to one chain's state.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute a call as a state query and return the raw hex result.
    async fn call(&self, to: &str, data: &str) -> Result<Hex>;
}

/// The wallet controlling the user's signing key.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Account used to fund relayer gas.
    async fn default_account(&self) -> Result<Hex>;

    /// Request an `eth_signTypedData_v4` signature over `typed_data_json`.
    ///
    /// A declined request returns `MetaExitError::SignatureRejected`; a
    /// provider that cannot be reached or fails otherwise returns `Rpc`.
    async fn sign_typed_data_v4(&self, address: &str, typed_data_json: &str) -> Result<Hex>;
}

/// Readers for both sides of the bridge.
#[derive(Clone)]
pub struct ChainReaders {
    pub child: Arc<dyn ChainReader>,
    pub root: Arc<dyn ChainReader>,
}

impl ChainReaders {
    pub fn new(child: Arc<dyn ChainReader>, root: Arc<dyn ChainReader>) -> Self {
        Self { child, root }
    }

    pub fn for_chain(&self, chain: ChainDomain) -> &dyn ChainReader {
        match chain {
            ChainDomain::Child => self.child.as_ref(),
            ChainDomain::Root => self.root.as_ref(),
        }
    }
}

/// Reads `getNonce(signer)` from a verifying contract.
#[derive(Clone)]
pub struct NonceResolver {
    readers: ChainReaders,
}

impl NonceResolver {
    pub fn new(readers: ChainReaders) -> Self {
        Self { readers }
    }

    /// Current nonce of `signer` on `verifying_contract`.
    ///
    /// Any failure is a `NonceRead` error; the caller does not retry.
    pub async fn resolve(
        &self,
        chain: ChainDomain,
        verifying_contract: &str,
        signer: &str,
    ) -> Result<u64> {
        let data = abi::encode_get_nonce(signer)
            .map_err(|e| MetaExitError::NonceRead(format!("cannot encode getNonce: {}", e)))?;

        let result = self
            .readers
            .for_chain(chain)
            .call(verifying_contract, &data)
            .await
            .map_err(|e| MetaExitError::NonceRead(e.to_string()))?;

        let nonce = abi::decode_uint(&result)
            .map_err(|e| MetaExitError::NonceRead(format!("unparseable nonce {}: {}", result, e)))?;

        if nonce.bits() > 64 {
            return Err(MetaExitError::NonceRead(format!("nonce out of range: {}", nonce)));
        }

        tracing::debug!(
            ?chain,
            contract = verifying_contract,
            signer,
            nonce = nonce.low_u64(),
            "resolved nonce"
        );
        Ok(nonce.low_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const SIGNER: &str = "0x00000000000000000000000000000000000000b0";
    const CONTRACT: &str = "0x00000000000000000000000000000000000000c0";

    struct FixedReader {
        result: Result<Hex>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FixedReader {
        fn ok(result: &str) -> Arc<Self> {
            Arc::new(Self { result: Ok(result.to_string()), calls: Mutex::new(Vec::new()) })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Err(MetaExitError::Rpc(message.to_string())),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChainReader for FixedReader {
        async fn call(&self, to: &str, data: &str) -> Result<Hex> {
            self.calls.lock().unwrap().push((to.to_string(), data.to_string()));
            match &self.result {
                Ok(hex) => Ok(hex.clone()),
                Err(e) => Err(MetaExitError::Rpc(e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_reads_selected_chain() {
        let child = FixedReader::ok(&format!("0x{:064x}", 4));
        let root = FixedReader::ok(&format!("0x{:064x}", 9));
        let resolver = NonceResolver::new(ChainReaders::new(child.clone(), root.clone()));

        assert_eq!(resolver.resolve(ChainDomain::Child, CONTRACT, SIGNER).await.unwrap(), 4);
        assert_eq!(resolver.resolve(ChainDomain::Root, CONTRACT, SIGNER).await.unwrap(), 9);

        let child_calls = child.calls.lock().unwrap();
        assert_eq!(child_calls.len(), 1);
        assert_eq!(child_calls[0].0, CONTRACT);
        assert_eq!(child_calls[0].1, abi::encode_get_nonce(SIGNER).unwrap());
        assert_eq!(root.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revert_is_nonce_read_error() {
        let reader = FixedReader::failing("execution reverted");
        let resolver = NonceResolver::new(ChainReaders::new(reader.clone(), reader));
        let err = resolver.resolve(ChainDomain::Child, CONTRACT, SIGNER).await.unwrap_err();
        assert!(matches!(err, MetaExitError::NonceRead(_)));
    }

    #[tokio::test]
    async fn test_unparseable_result_is_nonce_read_error() {
        let reader = FixedReader::ok("0x");
        let resolver = NonceResolver::new(ChainReaders::new(reader.clone(), reader));
        let err = resolver.resolve(ChainDomain::Root, CONTRACT, SIGNER).await.unwrap_err();
        assert!(matches!(err, MetaExitError::NonceRead(_)));
    }
}
