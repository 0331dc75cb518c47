//! Watchlist Bot Library
//!
//! Chat-operated watchlist of Solana wallets. Answers "which of my wallets
//! hold token X, and how much" by querying an RPC node concurrently.
//!
//! # Modules
//!
//! - `domain`: Core types (Wallet, Token, BalanceReport, address parsing)
//! - `ports`: Trait abstractions (WalletRegistry, TokenRegistry, TokenAccountSource)
//! - `application`: Fetcher, aggregator, command parsing and dispatch
//! - `adapters`: External implementations (SQLite, Solana RPC, Telegram, CLI)
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod application;
pub mod adapters;
pub mod config;
