//! EIP-712 `MetaTransaction` typed data.
//!
//! The JSON document is what `eth_signTypedData_v4` receives; the verifying
//! contract rebuilds the same structure on-chain, so field order and type
//! declarations are fixed:
//!
//! types:       EIP712Domain(name, version, verifyingContract, salt)
//!              MetaTransaction(nonce, from, functionSignature)
//! digest:      keccak256(0x1901 || domainSeparator || hashStruct(message))

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use ethereum_types::U256;
use metaexit_types::{hex_to_bytes, parse_address, parse_bytes32, Hex, MetaExitError, Result};

use crate::abi::{address_word, uint_word};

pub const PRIMARY_TYPE: &str = "MetaTransaction";

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,address verifyingContract,bytes32 salt)";
const META_TRANSACTION_TYPE: &str =
    "MetaTransaction(uint256 nonce,address from,bytes functionSignature)";

/// Inputs of the typed-data builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDataParams {
    pub name: String,
    pub version: String,
    pub salt: Hex,
    pub verifying_contract: Hex,
    pub nonce: u64,
    pub from: Hex,
    pub function_signature: Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypeField {
    fn new(name: &str, ty: &str) -> Self {
        Self { name: name.to_string(), ty: ty.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataTypes {
    #[serde(rename = "EIP712Domain")]
    pub eip712_domain: Vec<TypeField>,
    #[serde(rename = "MetaTransaction")]
    pub meta_transaction: Vec<TypeField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub verifying_contract: Hex,
    pub salt: Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransactionMessage {
    pub nonce: u64,
    pub from: Hex,
    pub function_signature: Hex,
}

/// The structured-data document signed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: TypedDataTypes,
    pub domain: TypedDataDomain,
    pub primary_type: String,
    pub message: MetaTransactionMessage,
}

/// Build the canonical `MetaTransaction` document. Pure and deterministic.
pub fn build_typed_data(params: &TypedDataParams) -> TypedData {
    TypedData {
        types: TypedDataTypes {
            eip712_domain: vec![
                TypeField::new("name", "string"),
                TypeField::new("version", "string"),
                TypeField::new("verifyingContract", "address"),
                TypeField::new("salt", "bytes32"),
            ],
            meta_transaction: vec![
                TypeField::new("nonce", "uint256"),
                TypeField::new("from", "address"),
                TypeField::new("functionSignature", "bytes"),
            ],
        },
        domain: TypedDataDomain {
            name: params.name.clone(),
            version: params.version.clone(),
            verifying_contract: params.verifying_contract.clone(),
            salt: params.salt.clone(),
        },
        primary_type: PRIMARY_TYPE.to_string(),
        message: MetaTransactionMessage {
            nonce: params.nonce,
            from: params.from.clone(),
            function_signature: params.function_signature.clone(),
        },
    }
}

fn keccak(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

impl TypedData {
    /// Serialize to the compact JSON string passed to the wallet.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| MetaExitError::Other(format!("failed to serialize typed data: {}", e)))
    }

    pub fn domain_separator(&self) -> Result<[u8; 32]> {
        let contract = parse_address(&self.domain.verifying_contract)?;
        let salt = parse_bytes32(&self.domain.salt)?;

        let mut encoded = Vec::with_capacity(32 * 5);
        encoded.extend_from_slice(&keccak(DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&keccak(self.domain.name.as_bytes()));
        encoded.extend_from_slice(&keccak(self.domain.version.as_bytes()));
        encoded.extend_from_slice(&address_word(&contract));
        encoded.extend_from_slice(&salt);
        Ok(keccak(&encoded))
    }

    pub fn struct_hash(&self) -> Result<[u8; 32]> {
        let from = parse_address(&self.message.from)?;
        let function_signature = hex_to_bytes(&self.message.function_signature)?;

        let mut encoded = Vec::with_capacity(32 * 4);
        encoded.extend_from_slice(&keccak(META_TRANSACTION_TYPE.as_bytes()));
        encoded.extend_from_slice(&uint_word(U256::from(self.message.nonce)));
        encoded.extend_from_slice(&address_word(&from));
        encoded.extend_from_slice(&keccak(&function_signature));
        Ok(keccak(&encoded))
    }

    /// The 32-byte digest the wallet's signature covers.
    pub fn signing_digest(&self) -> Result<[u8; 32]> {
        let mut encoded = Vec::with_capacity(2 + 64);
        encoded.extend_from_slice(&[0x19, 0x01]);
        encoded.extend_from_slice(&self.domain_separator()?);
        encoded.extend_from_slice(&self.struct_hash()?);
        Ok(keccak(&encoded))
    }
}
