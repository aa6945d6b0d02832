//! Structured-data messages and call encoding for meta-transactions.
//!
//! - `typed_data`: the `MetaTransaction` document a wallet signs with
//!   `eth_signTypedData_v4`, and its EIP-712 digest
//! - `abi`: function-call encoding for the calls the SDK issues itself

pub mod abi;
pub mod typed_data;

pub use typed_data::{build_typed_data, TypedData, TypedDataParams};
