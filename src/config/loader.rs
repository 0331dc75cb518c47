//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.
//! Every section has defaults, so an empty file is a valid configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::solana::{parse_commitment, DEFAULT_RPC_URL};
use crate::adapters::sqlite::DEFAULT_DB_PATH;
use crate::adapters::telegram::DEFAULT_API_URL;
use crate::application::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::application::dispatcher::DEFAULT_PENDING_TTL_SECS;
use crate::domain::DEFAULT_AMOUNT_SCALE;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub balance: BalanceSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    /// RPC endpoint (use private RPC for production)
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    pub commitment: String,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: "confirmed".to_string(),
        }
    }
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }
}

/// Wallet database section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file path, `~` is expanded
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl DatabaseSection {
    pub fn expanded_path(&self) -> String {
        shellexpand::tilde(&self.path).to_string()
    }
}

/// Telegram bot section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    /// Bot API base URL
    pub api_url: String,
    /// Bot token from @BotFather (prefer the TELEGRAM_TOKEN env var)
    pub bot_token: Option<String>,
    /// Usernames allowed to use the bot; empty allows everyone
    pub allowed_users: Vec<String>,
    /// Long-poll window for getUpdates
    pub poll_timeout_secs: u64,
    /// How long a "please provide the ticker" prompt stays open
    pub pending_prompt_ttl_secs: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            bot_token: None,
            allowed_users: Vec::new(),
            poll_timeout_secs: 30,
            pending_prompt_ttl_secs: DEFAULT_PENDING_TTL_SECS as u64,
        }
    }
}

impl TelegramSection {
    /// Get bot token with environment variable override
    /// Checks TELEGRAM_TOKEN env var first, falls back to config value
    pub fn get_bot_token(&self) -> Option<String> {
        std::env::var("TELEGRAM_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.bot_token.clone().filter(|t| !t.is_empty()))
    }

    /// Get allowed users with environment variable override
    /// ALLOWED_USERS is a comma-separated list
    pub fn get_allowed_users(&self) -> Vec<String> {
        match std::env::var("ALLOWED_USERS") {
            Ok(list) => parse_user_list(&list),
            Err(_) => self.allowed_users.clone(),
        }
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn pending_prompt_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_prompt_ttl_secs)
    }
}

/// Split a comma-separated username list, dropping blanks
pub fn parse_user_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Balance check section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BalanceSection {
    /// Divisor applied to raw token amounts
    pub scale: u64,
    /// Maximum RPC lookups in flight during one check
    pub max_concurrent_fetches: usize,
    /// Per-wallet deadline in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for BalanceSection {
    fn default() -> Self {
        Self {
            scale: DEFAULT_AMOUNT_SCALE,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
        }
    }
}

impl BalanceSection {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file (in addition to stdout)
    pub log_to_file: bool,
    /// Log file path, rotated daily
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: "logs/bot.log".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate Solana
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if parse_commitment(&self.solana.commitment).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "commitment must be processed, confirmed or finalized, got {}",
                self.solana.commitment
            )));
        }

        // Validate database
        if self.database.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "database path cannot be empty".to_string(),
            ));
        }

        // Validate Telegram
        if self.telegram.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "telegram api_url cannot be empty".to_string(),
            ));
        }

        if self.telegram.poll_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_timeout_secs must be > 0".to_string(),
            ));
        }

        // Validate balance section
        if self.balance.scale == 0 {
            return Err(ConfigError::ValidationError(
                "scale must be > 0".to_string(),
            ));
        }

        if self.balance.max_concurrent_fetches == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_fetches must be > 0".to_string(),
            ));
        }

        if self.balance.fetch_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "fetch_timeout_secs must be > 0".to_string(),
            ));
        }

        // Validate logging
        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}
