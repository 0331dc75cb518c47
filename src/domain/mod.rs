//! Domain Layer - Core types for the wallet watchlist
//!
//! Pure data types and rules with no I/O. All external interactions
//! happen through the ports layer.
//!
//! - `address`: base58 public key validation
//! - `wallet`: watched wallet with optional display name
//! - `token`: token mint with its ticker
//! - `balance`: amount scaling and the aggregated balance report

pub mod address;
pub mod wallet;
pub mod token;
pub mod balance;

pub use address::{is_valid_address, parse_pubkey, AddressError};
pub use wallet::Wallet;
pub use token::Token;
pub use balance::{scale_amount, BalanceRecord, BalanceReport, DEFAULT_AMOUNT_SCALE};
