//! SQLite Adapter
//!
//! Implements the wallet and token registry ports on a pooled SQLite database.

mod store;
mod wallets;
mod tokens;

pub use store::{Database, DbConn, DEFAULT_DB_PATH};
