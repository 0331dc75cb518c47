//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement:
//! - Wallet and token registries (persistence)
//! - Token account lookups (Solana RPC)
//!
//! `mocks` holds in-memory doubles for unit tests.

pub mod registry;
pub mod token_accounts;
#[cfg(test)]
pub mod mocks;

pub use registry::{RegistryError, TokenRegistry, WalletRegistry};
pub use token_accounts::{NetworkError, TokenAccountSource};
