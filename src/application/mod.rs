//! Application Layer - Use cases
//!
//! - `fetcher`: one wallet, one token, one balance
//! - `aggregator`: bounded fan-out of the fetcher over the wallet registry
//! - `commands`: chat text to typed requests
//! - `access`: username allow-list
//! - `dispatcher`: requests to responses, including the ticker prompt flow

pub mod fetcher;
pub mod aggregator;
pub mod commands;
pub mod access;
pub mod dispatcher;

pub use fetcher::BalanceFetcher;
pub use aggregator::{BalanceAggregator, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_FETCHES};
pub use commands::{parse, ParseError, Prompt, Request};
pub use access::AccessGuard;
pub use dispatcher::{Dispatcher, IncomingMessage, Response};
