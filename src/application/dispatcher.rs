//! Command Dispatcher
//!
//! Runs typed requests against the registries and the balance aggregator
//! and returns plain response data for the transport to render.
//!
//! A balance check for an unknown token with no inline ticker leaves the
//! chat with a pending prompt; the chat's next plain-text message is taken
//! as the ticker and the check is replayed.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{is_valid_address, BalanceReport, Token, Wallet};
use crate::ports::{RegistryError, TokenRegistry, WalletRegistry};
use super::access::AccessGuard;
use super::aggregator::BalanceAggregator;
use super::commands::{self, ParseError, Prompt, Request};

/// How long a ticker prompt stays open by default
pub const DEFAULT_PENDING_TTL_SECS: i64 = 300;

/// A chat message after transport decoding
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub username: Option<String>,
    pub text: String,
}

/// Outcome of a request, rendered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Help,
    Prompt(Prompt),
    Usage(&'static str),
    Unauthorized,
    InvalidAddress { address: String },
    WalletAdded { address: String },
    WalletExists { address: String },
    WalletRemoved { address: String },
    WalletNotFound { address: String },
    WalletRenamed { address: String, name: String },
    Wallets(Vec<Wallet>),
    TokenAdded { address: String, ticker: String },
    TokenExists { address: String },
    TokenRemoved { address: String, ticker: String },
    TokenNotFound { address: String },
    Tokens(Vec<Token>),
    AskTicker { token_address: String },
    InvalidTicker,
    Balances { token_address: String, ticker: String, report: BalanceReport },
    NoBalances { token_address: String },
    Failed(String),
    /// Nothing to say, e.g. small talk with no pending prompt
    Ignored,
}

/// Open ticker prompt for one chat
#[derive(Debug, Clone)]
struct PendingTicker {
    token_address: String,
    created_at: DateTime<Utc>,
}

pub struct Dispatcher {
    wallets: Arc<dyn WalletRegistry>,
    tokens: Arc<dyn TokenRegistry>,
    aggregator: BalanceAggregator,
    guard: AccessGuard,
    pending: Mutex<HashMap<i64, PendingTicker>>,
    pending_ttl: ChronoDuration,
}

impl Dispatcher {
    pub fn new(
        wallets: Arc<dyn WalletRegistry>,
        tokens: Arc<dyn TokenRegistry>,
        aggregator: BalanceAggregator,
        guard: AccessGuard,
    ) -> Self {
        Self {
            wallets,
            tokens,
            aggregator,
            guard,
            pending: Mutex::new(HashMap::new()),
            pending_ttl: ChronoDuration::seconds(DEFAULT_PENDING_TTL_SECS),
        }
    }

    /// Set how long a ticker prompt waits for an answer
    pub fn with_pending_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.pending_ttl = ChronoDuration::from_std(ttl)
            .unwrap_or_else(|_| ChronoDuration::seconds(DEFAULT_PENDING_TTL_SECS));
        self
    }

    /// Parse, guard and dispatch one chat message.
    ///
    /// Outsiders only hear back for recognized commands; their chatter and
    /// unknown commands are ignored.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Response {
        let user = message.username.as_deref().unwrap_or("<none>");
        let parsed = commands::parse(&message.text);

        if !self.guard.is_allowed(message.username.as_deref()) {
            return match parsed {
                Ok(Request::Text(_)) | Err(ParseError::UnknownCommand(_)) => Response::Ignored,
                Ok(_) | Err(ParseError::Usage(_)) => {
                    tracing::warn!("Unauthorized access attempt by user: {}", user);
                    Response::Unauthorized
                }
            };
        }

        match parsed {
            Ok(request) => {
                tracing::debug!("Request from {} in chat {}: {:?}", user, message.chat_id, request);
                self.handle(message.chat_id, request).await
            }
            Err(ParseError::Usage(usage)) => Response::Usage(usage),
            Err(ParseError::UnknownCommand(command)) => {
                tracing::debug!("Ignoring unknown command /{} from {}", command, user);
                Response::Ignored
            }
        }
    }

    /// Dispatch an already-authorized request
    pub async fn handle(&self, chat_id: i64, request: Request) -> Response {
        if !matches!(request, Request::Text(_)) {
            // Any other command abandons an open ticker prompt
            self.pending.lock().await.remove(&chat_id);
        }

        match request {
            Request::Help => Response::Help,
            Request::Prompt(prompt) => Response::Prompt(prompt),
            Request::AddWallet { address, name } => self.add_wallet(address, name),
            Request::RemoveWallet { address } => self.remove_wallet(address),
            Request::RenameWallet { address, name } => self.rename_wallet(address, name),
            Request::ListWallets => match self.wallets.list() {
                Ok(wallets) => {
                    tracing::info!("Listed {} wallets", wallets.len());
                    Response::Wallets(wallets)
                }
                Err(e) => failed(e),
            },
            Request::AddToken { address, ticker } => self.add_token(address, ticker),
            Request::RemoveToken { address } => self.remove_token(address),
            Request::ListTokens => match self.tokens.list() {
                Ok(tokens) => {
                    tracing::info!("Listed {} tokens", tokens.len());
                    Response::Tokens(tokens)
                }
                Err(e) => failed(e),
            },
            Request::CheckBalance { token_address, ticker } => {
                self.check_balance(chat_id, token_address, ticker).await
            }
            Request::Text(text) => self.provide_ticker(chat_id, text).await,
        }
    }

    fn add_wallet(&self, address: String, name: Option<String>) -> Response {
        match self.wallets.add(&address, name.as_deref()) {
            Ok(()) => {
                tracing::info!("Wallet {} added", address);
                Response::WalletAdded { address }
            }
            Err(RegistryError::InvalidAddress(_)) => {
                tracing::warn!("Invalid wallet address provided: {}", address);
                Response::InvalidAddress { address }
            }
            Err(RegistryError::AlreadyExists(_)) => {
                tracing::info!("Wallet {} already exists", address);
                Response::WalletExists { address }
            }
            Err(e) => failed(e),
        }
    }

    fn remove_wallet(&self, address: String) -> Response {
        match self.wallets.remove(&address) {
            Ok(()) => {
                tracing::info!("Wallet {} removed", address);
                Response::WalletRemoved { address }
            }
            Err(RegistryError::NotFound(_)) => {
                tracing::warn!("Wallet {} not found in the database", address);
                Response::WalletNotFound { address }
            }
            Err(e) => failed(e),
        }
    }

    fn rename_wallet(&self, address: String, name: String) -> Response {
        match self.wallets.rename(&address, &name) {
            Ok(()) => {
                tracing::info!("Wallet {} renamed to {}", address, name);
                Response::WalletRenamed { address, name }
            }
            Err(RegistryError::NotFound(_)) => {
                tracing::warn!("Wallet {} not found in the database, rename skipped", address);
                Response::WalletNotFound { address }
            }
            Err(e) => failed(e),
        }
    }

    fn add_token(&self, address: String, ticker: String) -> Response {
        match self.tokens.add_if_absent(&address, &ticker) {
            Ok(()) => {
                tracing::info!("Token {} with ticker {} added", address, ticker);
                Response::TokenAdded { address, ticker }
            }
            Err(RegistryError::InvalidAddress(_)) => {
                tracing::warn!("Invalid token address provided: {}", address);
                Response::InvalidAddress { address }
            }
            Err(RegistryError::AlreadyExists(_)) => {
                tracing::info!("Token {} already exists", address);
                Response::TokenExists { address }
            }
            Err(e) => failed(e),
        }
    }

    fn remove_token(&self, address: String) -> Response {
        match self.tokens.remove(&address) {
            Ok(ticker) => {
                tracing::info!("Token {} with ticker {} removed", address, ticker);
                Response::TokenRemoved { address, ticker }
            }
            Err(RegistryError::NotFound(_)) => {
                tracing::warn!("Token {} not found in the database", address);
                Response::TokenNotFound { address }
            }
            Err(e) => failed(e),
        }
    }

    async fn check_balance(&self, chat_id: i64, token_address: String, ticker: Option<String>) -> Response {
        if !is_valid_address(&token_address) {
            tracing::warn!("Invalid token address provided: {}", token_address);
            return Response::InvalidAddress { address: token_address };
        }

        // A registered ticker wins over one typed inline
        let ticker = match self.tokens.get(&token_address) {
            Ok(Some(token)) => token.ticker,
            Ok(None) => match ticker {
                Some(ticker) => {
                    if let Err(e) = self.tokens.upsert(&token_address, &ticker) {
                        return failed(e);
                    }
                    tracing::info!("Registered ticker {} for {}", ticker, token_address);
                    ticker
                }
                None => {
                    let now = Utc::now();
                    let mut pending = self.pending.lock().await;
                    // Prompts abandoned by other chats
                    pending.retain(|_, p| now - p.created_at <= self.pending_ttl);
                    pending.insert(
                        chat_id,
                        PendingTicker {
                            token_address: token_address.clone(),
                            created_at: now,
                        },
                    );
                    return Response::AskTicker { token_address };
                }
            },
            Err(e) => return failed(e),
        };

        self.run_balance_check(token_address, ticker).await
    }

    async fn provide_ticker(&self, chat_id: i64, text: String) -> Response {
        let Some(pending) = self.pending.lock().await.remove(&chat_id) else {
            return Response::Ignored;
        };

        if Utc::now() - pending.created_at > self.pending_ttl {
            tracing::debug!("Ticker prompt for {} in chat {} expired", pending.token_address, chat_id);
            return Response::Ignored;
        }

        let ticker = text.trim();
        if ticker.is_empty() {
            tracing::warn!("Empty ticker provided in chat {}", chat_id);
            return Response::InvalidTicker;
        }

        if let Err(e) = self.tokens.upsert(&pending.token_address, ticker) {
            return failed(e);
        }
        tracing::info!("Ticker {} for contract address {} added", ticker, pending.token_address);

        self.run_balance_check(pending.token_address, ticker.to_string()).await
    }

    async fn run_balance_check(&self, token_address: String, ticker: String) -> Response {
        match self.aggregator.aggregate(&token_address).await {
            Ok(report) if report.is_empty() => {
                tracing::info!("No balances found for contract address: {}", token_address);
                Response::NoBalances { token_address }
            }
            Ok(report) => {
                tracing::info!("Provided balances for contract address: {}", token_address);
                Response::Balances { token_address, ticker, report }
            }
            Err(e) => failed(e),
        }
    }

    /// Whether a chat currently owes a ticker
    pub async fn has_pending_prompt(&self, chat_id: i64) -> bool {
        self.pending.lock().await.contains_key(&chat_id)
    }

    /// Open ticker prompts across all chats, expired ones included
    pub async fn pending_prompt_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

fn failed(e: RegistryError) -> Response {
    tracing::error!("Registry operation failed: {}", e);
    Response::Failed(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fetcher::BalanceFetcher;
    use crate::ports::mocks::{InMemoryTokenRegistry, InMemoryWalletRegistry, StubTokenAccounts};
    use rust_decimal_macros::dec;

    const WIF: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";
    const WALLET_A: &str = "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5";
    const WALLET_B: &str = "HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe";
    const CHAT: i64 = 42;

    struct Fixture {
        dispatcher: Dispatcher,
        tokens: InMemoryTokenRegistry,
    }

    fn fixture(source: StubTokenAccounts, guard: AccessGuard) -> Fixture {
        let wallets = InMemoryWalletRegistry::new()
            .with_wallet(WALLET_A, Some("alpha"))
            .with_wallet(WALLET_B, None);
        let tokens = InMemoryTokenRegistry::new();
        let wallets: Arc<dyn WalletRegistry> = Arc::new(wallets);
        let aggregator = BalanceAggregator::new(wallets.clone(), BalanceFetcher::new(Arc::new(source)));
        let dispatcher = Dispatcher::new(wallets, Arc::new(tokens.clone()), aggregator, guard);
        Fixture { dispatcher, tokens }
    }

    fn message(text: &str, username: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            chat_id: CHAT,
            username: username.map(str::to_string),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_before_any_operation() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::new(["alice"]));
        let response = f
            .dispatcher
            .handle_message(&message(&format!("/add_token {} WIF", WIF), Some("mallory")))
            .await;

        assert_eq!(response, Response::Unauthorized);
        assert!(f.tokens.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outsider_chatter_ignored() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::new(["alice"]));

        for text in ["gm everyone", "/moon", "Check Balances please"] {
            let response = f.dispatcher.handle_message(&message(text, Some("mallory"))).await;
            assert_eq!(response, Response::Ignored, "text: {}", text);
        }
    }

    #[tokio::test]
    async fn test_outsider_commands_refused() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::new(["alice"]));

        for text in ["/list_wallets", "Help", "/remove_token"] {
            let response = f.dispatcher.handle_message(&message(text, Some("mallory"))).await;
            assert_eq!(response, Response::Unauthorized, "text: {}", text);
        }
    }

    #[tokio::test]
    async fn test_outsider_text_keeps_prompt_open() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::new(["alice"]));
        f.dispatcher
            .handle_message(&message(&format!("/check_balance {}", WIF), Some("alice")))
            .await;

        let response = f.dispatcher.handle_message(&message("SCAM", Some("mallory"))).await;
        assert_eq!(response, Response::Ignored);
        assert!(f.dispatcher.has_pending_prompt(CHAT).await);
        assert!(f.tokens.get(WIF).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_usage_error() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        let response = f.dispatcher.handle_message(&message("/rename_wallet", None)).await;
        assert_eq!(response, Response::Usage(commands::USAGE_RENAME_WALLET));
    }

    #[tokio::test]
    async fn test_add_wallet_outcomes() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());

        let response = f.dispatcher.handle(CHAT, Request::AddWallet {
            address: "bogus".to_string(),
            name: None,
        }).await;
        assert_eq!(response, Response::InvalidAddress { address: "bogus".to_string() });

        let response = f.dispatcher.handle(CHAT, Request::AddWallet {
            address: WALLET_A.to_string(),
            name: None,
        }).await;
        assert_eq!(response, Response::WalletExists { address: WALLET_A.to_string() });
    }

    #[tokio::test]
    async fn test_inline_ticker_registered_and_balances_returned() {
        let source = StubTokenAccounts::new().with_accounts(WALLET_A, &[2_500_000]);
        let f = fixture(source, AccessGuard::open());

        let response = f.dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: Some("$WIF".to_string()),
        }).await;

        let Response::Balances { ticker, report, .. } = response else {
            panic!("expected balances, got {:?}", response);
        };
        assert_eq!(ticker, "$WIF");
        assert_eq!(report.total_wallets, 2);
        assert_eq!(report.holdings[WALLET_A].amount, dec!(2.5));
        assert_eq!(f.tokens.get(WIF).unwrap().unwrap().ticker, "$WIF");
    }

    #[tokio::test]
    async fn test_registered_ticker_wins_over_inline() {
        let source = StubTokenAccounts::new().with_accounts(WALLET_B, &[1_000_000]);
        let f = fixture(source, AccessGuard::open());
        f.tokens.upsert(WIF, "WIF").unwrap();

        let response = f.dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: Some("OTHER".to_string()),
        }).await;

        assert!(matches!(response, Response::Balances { ref ticker, .. } if ticker == "WIF"));
        assert_eq!(f.tokens.get(WIF).unwrap().unwrap().ticker, "WIF");
    }

    #[tokio::test]
    async fn test_no_balances() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        f.tokens.upsert(WIF, "WIF").unwrap();

        let response = f.dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: None,
        }).await;
        assert_eq!(response, Response::NoBalances { token_address: WIF.to_string() });
    }

    #[tokio::test]
    async fn test_ticker_prompt_flow() {
        let source = StubTokenAccounts::new().with_accounts(WALLET_A, &[3_000_000]);
        let f = fixture(source, AccessGuard::open());

        let response = f.dispatcher.handle_message(&message(&format!("/check_balance {}", WIF), None)).await;
        assert_eq!(response, Response::AskTicker { token_address: WIF.to_string() });
        assert!(f.dispatcher.has_pending_prompt(CHAT).await);

        let response = f.dispatcher.handle_message(&message("$WIF", None)).await;
        assert!(matches!(response, Response::Balances { ref ticker, .. } if ticker == "$WIF"));
        assert!(!f.dispatcher.has_pending_prompt(CHAT).await);
        assert_eq!(f.tokens.get(WIF).unwrap().unwrap().ticker, "$WIF");
    }

    #[tokio::test]
    async fn test_empty_ticker_rejected() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        f.dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: None,
        }).await;

        let response = f.dispatcher.handle(CHAT, Request::Text("   ".to_string())).await;
        assert_eq!(response, Response::InvalidTicker);
        assert!(f.tokens.get(WIF).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_text_without_prompt_ignored() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        let response = f.dispatcher.handle(CHAT, Request::Text("gm".to_string())).await;
        assert_eq!(response, Response::Ignored);
    }

    #[tokio::test]
    async fn test_other_command_cancels_prompt() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        f.dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: None,
        }).await;

        f.dispatcher.handle(CHAT, Request::ListWallets).await;
        assert!(!f.dispatcher.has_pending_prompt(CHAT).await);
        let response = f.dispatcher.handle(CHAT, Request::Text("WIF".to_string())).await;
        assert_eq!(response, Response::Ignored);
    }

    #[tokio::test]
    async fn test_prompt_is_per_chat() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        f.dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: None,
        }).await;

        let response = f.dispatcher.handle(CHAT + 1, Request::Text("WIF".to_string())).await;
        assert_eq!(response, Response::Ignored);
        assert!(f.dispatcher.has_pending_prompt(CHAT).await);
    }

    #[tokio::test]
    async fn test_expired_prompt_ignored() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        let dispatcher = f.dispatcher.with_pending_ttl(std::time::Duration::ZERO);
        dispatcher.handle(CHAT, Request::CheckBalance {
            token_address: WIF.to_string(),
            ticker: None,
        }).await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let response = dispatcher.handle(CHAT, Request::Text("WIF".to_string())).await;
        assert_eq!(response, Response::Ignored);
    }

    #[tokio::test]
    async fn test_abandoned_prompts_purged() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());
        let dispatcher = f.dispatcher.with_pending_ttl(std::time::Duration::ZERO);

        for chat in 1..=3 {
            dispatcher.handle(chat, Request::CheckBalance {
                token_address: WIF.to_string(),
                ticker: None,
            }).await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(dispatcher.pending_prompt_count().await, 1);
        assert!(dispatcher.has_pending_prompt(3).await);
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let f = fixture(StubTokenAccounts::new(), AccessGuard::open());

        let response = f.dispatcher.handle(CHAT, Request::AddToken {
            address: WIF.to_string(),
            ticker: "WIF".to_string(),
        }).await;
        assert_eq!(response, Response::TokenAdded { address: WIF.to_string(), ticker: "WIF".to_string() });

        let response = f.dispatcher.handle(CHAT, Request::AddToken {
            address: WIF.to_string(),
            ticker: "DUPE".to_string(),
        }).await;
        assert_eq!(response, Response::TokenExists { address: WIF.to_string() });

        let response = f.dispatcher.handle(CHAT, Request::RemoveToken { address: WIF.to_string() }).await;
        assert_eq!(response, Response::TokenRemoved { address: WIF.to_string(), ticker: "WIF".to_string() });

        let response = f.dispatcher.handle(CHAT, Request::RemoveToken { address: WIF.to_string() }).await;
        assert_eq!(response, Response::TokenNotFound { address: WIF.to_string() });
    }
}
