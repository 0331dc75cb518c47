//! Balance Fetcher
//!
//! Resolves how much of one mint a single wallet holds.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::{scale_amount, DEFAULT_AMOUNT_SCALE};
use crate::ports::{NetworkError, TokenAccountSource};

/// Looks up a wallet's holding of one token through the RPC port
#[derive(Clone)]
pub struct BalanceFetcher {
    source: Arc<dyn TokenAccountSource>,
    scale: u64,
}

impl BalanceFetcher {
    pub fn new(source: Arc<dyn TokenAccountSource>) -> Self {
        Self {
            source,
            scale: DEFAULT_AMOUNT_SCALE,
        }
    }

    /// Override the raw-amount divisor
    pub fn with_scale(mut self, scale: u64) -> Self {
        self.scale = scale;
        self
    }

    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Scaled amount of `mint` held by `wallet`.
    ///
    /// A wallet with no token account for the mint holds zero. When several
    /// accounts exist only the first one returned by the RPC node is read.
    pub async fn fetch(&self, wallet: &str, mint: &str) -> Result<Decimal, NetworkError> {
        let accounts = self.source.list_token_accounts(wallet, mint).await?;

        let Some(account) = accounts.first() else {
            return Ok(Decimal::ZERO);
        };

        let raw = self.source.get_account_token_balance(account).await?;
        Ok(scale_amount(raw, self.scale))
    }
}
