//! Contract addresses and ABI encoding for the two contracts we touch
//!
//! Only three calls are needed, all with at most one address argument, so
//! the encoding is done by hand rather than through a full ABI layer.

use super::RpcError;
use alloy_primitives::{address, keccak256, Address, U256};

/// Sepolia
pub const TARGET_CHAIN_ID: u64 = 11_155_111;

/// AgneticGOD ERC-20
pub const TOKEN_ADDRESS: Address = address!("7a1d3c46b8e2f09d5c4b3a2918e7f6d5c4b3a291");

/// Offering deposit contract
pub const DEPOSIT_ADDRESS: Address = address!("3e9f5b2a7c1d8e4f6a0b9c2d5e8f1a4b7c0d3e6f");

/// The offering: 0.001875 ETH in wei
pub const OFFERING_WEI: u64 = 1_875_000_000_000_000;

pub const BALANCE_OF: &str = "balanceOf(address)";
pub const DEPOSITS_OF: &str = "deposits(address)";
pub const DEPOSIT: &str = "deposit()";

/// Addresses of the token and deposit contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub token: Address,
    pub deposit: Address,
}

impl Default for Contracts {
    fn default() -> Self {
        Self {
            token: TOKEN_ADDRESS,
            deposit: DEPOSIT_ADDRESS,
        }
    }
}

/// First four bytes of the keccak hash of the canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `signature` applied to address arguments
pub fn encode_call(signature: &str, args: &[Address]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(arg.as_slice());
    }
    data
}

/// `0x`-prefixed hex, as JSON-RPC expects for data fields
pub fn to_hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode a `uint256` return value from `eth_call`.
///
/// An empty result (`0x`) is zero: contracts without code at the address,
/// and some ledger views, answer that way.
pub fn decode_uint(result: &str) -> Result<U256, RpcError> {
    let clean = result.strip_prefix("0x").unwrap_or(result);
    if clean.is_empty() {
        return Ok(U256::ZERO);
    }
    let bytes = hex::decode(clean).map_err(|e| RpcError::decode(format!("{e}: {result}")))?;
    let word = bytes.get(..32).unwrap_or(&bytes);
    Ok(U256::from_be_slice(word))
}

/// Decode a JSON-RPC hex quantity (`eth_getBalance`, `blockNumber`, ...)
pub fn decode_quantity(quantity: &str) -> Result<U256, RpcError> {
    let clean = quantity.strip_prefix("0x").unwrap_or(quantity);
    if clean.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(clean, 16).map_err(|e| RpcError::decode(format!("{e}: {quantity}")))
}

/// Encode a value as a JSON-RPC hex quantity
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}
