//! Watchlist Bot - Solana token holdings across a tracked wallet list
//!
//! Entry point: loads `.env`, parses the command line and hands off to the CLI adapter.

use anyhow::Result;
use watchlist_bot::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
