//! Balance Report
//!
//! Per-wallet holdings for one token plus the summary statistics shown
//! under a balance check. Reports are computed on demand and never persisted.

use rust_decimal::Decimal;
use std::collections::HashMap;

/// Fixed divisor applied to raw on-chain token amounts
pub const DEFAULT_AMOUNT_SCALE: u64 = 1_000_000;

/// Convert a raw integer token amount into a human-readable decimal
pub fn scale_amount(raw: u64, scale: u64) -> Decimal {
    if scale == 0 {
        return Decimal::from(raw);
    }
    Decimal::from(raw) / Decimal::from(scale)
}

/// One wallet's holding of the checked token
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    pub wallet_address: String,
    pub name: Option<String>,
    pub amount: Decimal,
}

/// Result of aggregating a token balance across the wallet registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceReport {
    /// Wallets holding a strictly positive amount, keyed by address
    pub holdings: HashMap<String, BalanceRecord>,
    /// Every wallet in the registry, including ones whose fetch failed
    pub total_wallets: usize,
    /// Number of entries in `holdings`
    pub wallets_with_balance: usize,
}

impl BalanceReport {
    pub fn new(total_wallets: usize) -> Self {
        Self {
            holdings: HashMap::new(),
            total_wallets,
            wallets_with_balance: 0,
        }
    }

    /// Record a wallet's amount. Zero and negative amounts are dropped.
    pub fn record(&mut self, wallet_address: String, name: Option<String>, amount: Decimal) -> bool {
        if amount <= Decimal::ZERO {
            return false;
        }
        let previous = self.holdings.insert(
            wallet_address.clone(),
            BalanceRecord {
                wallet_address,
                name,
                amount,
            },
        );
        if previous.is_none() {
            self.wallets_with_balance += 1;
        }
        true
    }

    /// Share of registered wallets holding the token, 0-100.
    /// Zero when the registry is empty.
    pub fn holding_percentage(&self) -> f64 {
        if self.total_wallets == 0 {
            return 0.0;
        }
        self.wallets_with_balance as f64 / self.total_wallets as f64 * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Holdings ordered largest first, ties by address
    pub fn sorted_records(&self) -> Vec<&BalanceRecord> {
        let mut records: Vec<&BalanceRecord> = self.holdings.values().collect();
        records.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.wallet_address.cmp(&b.wallet_address))
        });
        records
    }

    /// Sum of all recorded holdings
    pub fn total_amount(&self) -> Decimal {
        self.holdings.values().map(|r| r.amount).sum()
    }
}
