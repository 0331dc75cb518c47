//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the watchlist bot.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::solana::{parse_commitment, SolanaClient};
use crate::adapters::sqlite::Database;
use crate::adapters::telegram::{TelegramBot, TelegramClient, TelegramConfig};
use crate::application::{AccessGuard, BalanceAggregator, BalanceFetcher, Dispatcher};
use crate::config::loader::LoggingSection;
use crate::config::{load_config, Config};
use crate::domain::is_valid_address;
use crate::ports::{TokenRegistry, WalletRegistry};

/// Watchlist Bot - track SPL token holdings across a list of Solana wallets
#[derive(Parser, Debug)]
#[command(
    name = "watchlist-bot",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Telegram bot that checks a token's balance across registered Solana wallets",
    long_about = "Register wallets and tokens through Telegram chat commands, then ask which \
                  wallets hold a token and how much. Balances are read live from a Solana RPC node."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the Telegram bot
    Run(RunCmd),

    /// Check a token's balance across all registered wallets once
    Check(CheckCmd),

    /// List registered wallets
    Wallets,

    /// List registered tokens
    Tokens,
}

/// Start the bot
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Override RPC URL
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Override database path
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,
}

/// One-shot balance check
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Ticker to display when the token is not registered
    #[arg(short, long, value_name = "TICKER")]
    pub ticker: Option<String>,

    /// Override RPC URL
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Override database path
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let (config, config_found) = if app.config.exists() {
        let config = load_config(&app.config)
            .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;
        (config, true)
    } else {
        (Config::default(), false)
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(app.verbose, app.debug, &config.logging)?;

    if !config_found {
        tracing::info!("No config file at {}, using defaults", app.config.display());
    }

    match app.command {
        Command::Run(cmd) => run_command(config, cmd).await,
        Command::Check(cmd) => check_command(config, cmd).await,
        Command::Wallets => wallets_command(config),
        Command::Tokens => tokens_command(config),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, logging: &LoggingSection) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let (file_layer, guard) = if logging.log_to_file {
        let path = Path::new(&logging.log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("log_file must name a file: {}", logging.log_file))?;

        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}

fn open_database(config: &Config, override_path: Option<&Path>) -> Result<Arc<Database>> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(config.database.expanded_path()),
    };
    let db = Database::open(&path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Arc::new(db))
}

fn build_aggregator(
    config: &Config,
    db: Arc<Database>,
    rpc_override: Option<String>,
) -> Result<BalanceAggregator> {
    let rpc_url = rpc_override.unwrap_or_else(|| config.solana.get_rpc_url());
    let commitment = parse_commitment(&config.solana.commitment)
        .ok_or_else(|| anyhow!("Invalid commitment: {}", config.solana.commitment))?;

    tracing::info!("Using Solana RPC {}", rpc_url);
    let solana = SolanaClient::new(rpc_url, commitment, config.balance.fetch_timeout());

    let fetcher = BalanceFetcher::new(Arc::new(solana)).with_scale(config.balance.scale);
    Ok(BalanceAggregator::new(db, fetcher)
        .with_max_concurrent(config.balance.max_concurrent_fetches)
        .with_fetch_timeout(config.balance.fetch_timeout()))
}

/// Handle run command
async fn run_command(config: Config, cmd: RunCmd) -> Result<()> {
    tracing::info!("Starting watchlist bot...");

    let token = config.telegram.get_bot_token().ok_or_else(|| {
        anyhow!("Telegram bot token missing: set TELEGRAM_TOKEN or [telegram].bot_token in the config")
    })?;

    let db = open_database(&config, cmd.db.as_deref())?;
    let aggregator = build_aggregator(&config, Arc::clone(&db), cmd.rpc_url)?;

    let guard = AccessGuard::new(config.telegram.get_allowed_users());
    if guard.is_restricted() {
        tracing::info!("Access restricted to allow-listed users");
    } else {
        tracing::warn!("No allowed users configured - the bot answers everyone");
    }

    let dispatcher = Dispatcher::new(db.clone(), db, aggregator, guard)
        .with_pending_ttl(config.telegram.pending_prompt_ttl());

    let client = TelegramClient::new(TelegramConfig {
        api_url: config.telegram.api_url.clone(),
        bot_token: token,
        poll_timeout: config.telegram.poll_timeout(),
    })
    .context("Failed to create Telegram client")?;

    let bot = TelegramBot::new(client, Arc::new(dispatcher));

    // Setup Ctrl+C handler
    let stopper = bot.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        stopper.stop().await;
    });

    bot.run().await;
    Ok(())
}

/// Handle check command
async fn check_command(config: Config, cmd: CheckCmd) -> Result<()> {
    validate_mint(&cmd.mint)?;

    let db = open_database(&config, cmd.db.as_deref())?;
    let ticker = match db.get(&cmd.mint)? {
        Some(token) => token.ticker,
        None => cmd.ticker.clone().unwrap_or_else(|| cmd.mint.clone()),
    };

    let aggregator = build_aggregator(&config, Arc::clone(&db), cmd.rpc_url)?;
    let report = aggregator
        .aggregate(&cmd.mint)
        .await
        .context("Failed to read wallet registry")?;

    if report.is_empty() {
        println!("No balances found for {}", cmd.mint);
    }

    for record in report.sorted_records() {
        println!(
            "{}  {:>24.6} {}  {}",
            record.wallet_address,
            record.amount,
            ticker,
            record.name.as_deref().unwrap_or("")
        );
    }

    println!(
        "\n{} held by {} of {} wallets ({:.2}%), total {:.6}",
        ticker,
        report.wallets_with_balance,
        report.total_wallets,
        report.holding_percentage(),
        report.total_amount()
    );
    Ok(())
}

fn validate_mint(mint: &str) -> Result<()> {
    if !is_valid_address(mint) {
        bail!("Invalid token mint address: {}", mint);
    }
    Ok(())
}

/// Handle wallets command
fn wallets_command(config: Config) -> Result<()> {
    let db = open_database(&config, None)?;
    let wallets = WalletRegistry::list(db.as_ref())?;

    if wallets.is_empty() {
        println!("No wallets in the database.");
    }
    for wallet in wallets {
        println!("{}  {}", wallet.address, wallet.display_name());
    }
    Ok(())
}

/// Handle tokens command
fn tokens_command(config: Config) -> Result<()> {
    let db = open_database(&config, None)?;
    let tokens = TokenRegistry::list(db.as_ref())?;

    if tokens.is_empty() {
        println!("No tokens in the database.");
    }
    for token in tokens {
        println!("{}  {}", token.address, token.ticker);
    }
    Ok(())
}
