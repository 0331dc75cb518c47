//! Address Validation
//!
//! Syntactic checks for Solana public keys (wallets and token mints).
//! Every address is checked here before it reaches the registries.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Decoded length of an ed25519 public key
pub const PUBKEY_BYTES: usize = 32;

/// Longest base58 string that can encode 32 bytes
pub const MAX_BASE58_LEN: usize = 44;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,
    #[error("Address too long: {0} characters (max {MAX_BASE58_LEN})")]
    TooLong(usize),
    #[error("Address is not valid base58: {0}")]
    InvalidEncoding(String),
    #[error("Address decodes to {0} bytes, expected {PUBKEY_BYTES}")]
    WrongLength(usize),
}

/// Decode a base58 address into a `Pubkey`
pub fn parse_pubkey(address: &str) -> Result<Pubkey, AddressError> {
    if address.is_empty() {
        return Err(AddressError::Empty);
    }
    if address.len() > MAX_BASE58_LEN {
        return Err(AddressError::TooLong(address.len()));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;

    let bytes: [u8; PUBKEY_BYTES] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| AddressError::WrongLength(b.len()))?;

    Ok(Pubkey::new_from_array(bytes))
}

/// Check whether a string is a well-formed wallet or mint address
pub fn is_valid_address(address: &str) -> bool {
    parse_pubkey(address).is_ok()
}
