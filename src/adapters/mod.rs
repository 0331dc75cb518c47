//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - SQLite: wallet and token registries
//! - Solana: RPC token account lookups
//! - Telegram: chat transport
//! - CLI: Command-line interface

pub mod sqlite;
pub mod solana;
pub mod telegram;
pub mod cli;

pub use sqlite::Database;
pub use solana::SolanaClient;
pub use telegram::{TelegramBot, TelegramClient};
pub use cli::CliApp;
