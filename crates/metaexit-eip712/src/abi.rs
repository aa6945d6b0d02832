//! Minimal Solidity ABI call encoding.
//!
//! call     = selector || word(arg0) || word(arg1) ...
//! selector = keccak256(signature)[0:4]
//!
//! Only static arguments are supported; each occupies one left-padded
//! 32-byte word.

use ethereum_types::U256;
use sha3::{Digest, Keccak256};

use metaexit_types::{bytes_to_hex, hex_to_bytes, parse_address, Hex, MetaExitError, Result};

/// Replay-protection nonce getter exposed by meta-transaction contracts.
pub const GET_NONCE: &str = "getNonce(address)";

/// ERC-20 transfer.
pub const TRANSFER: &str = "transfer(address,uint256)";

/// A single ABI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address([u8; 20]),
    Uint(U256),
}

/// First four bytes of keccak256 over the canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[0..4]);
    out
}

pub fn address_word(addr: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr);
    word
}

pub fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// ABI-encode a sequence of static arguments (without selector).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 * tokens.len());
    for token in tokens {
        match token {
            Token::Address(addr) => out.extend_from_slice(&address_word(addr)),
            Token::Uint(value) => out.extend_from_slice(&uint_word(*value)),
        }
    }
    out
}

/// Encode a full function call: selector followed by the encoded arguments.
pub fn encode_function_call(signature: &str, tokens: &[Token]) -> Hex {
    let mut call = selector(signature).to_vec();
    call.extend_from_slice(&encode(tokens));
    bytes_to_hex(&call)
}

/// `getNonce(user)`
pub fn encode_get_nonce(user: &str) -> Result<Hex> {
    let user = parse_address(user)?;
    Ok(encode_function_call(GET_NONCE, &[Token::Address(user)]))
}

/// `transfer(recipient, amount)`
pub fn encode_transfer(recipient: &str, amount: U256) -> Result<Hex> {
    let recipient = parse_address(recipient)?;
    Ok(encode_function_call(
        TRANSFER,
        &[Token::Address(recipient), Token::Uint(amount)],
    ))
}

/// Decode a single `uint256` return value.
pub fn decode_uint(result: &str) -> Result<U256> {
    let bytes = hex_to_bytes(result)?;
    if bytes.is_empty() || bytes.len() > 32 {
        return Err(MetaExitError::InvalidHex(format!(
            "expected a 32-byte word, got {} bytes",
            bytes.len()
        )));
    }
    Ok(U256::from_big_endian(&bytes))
}
