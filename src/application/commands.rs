//! Chat Command Parsing
//!
//! Turns the text of an incoming chat message into a typed `Request`.
//! Slash commands carry their arguments inline; keyboard buttons arrive as
//! their plain label.

use thiserror::Error;

/// Keyboard buttons that answer with a command template to fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    CheckBalance,
    AddWallet,
    RemoveWallet,
    RenameWallet,
    AddToken,
    RemoveToken,
}

/// A typed request for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Help,
    Prompt(Prompt),
    AddWallet { address: String, name: Option<String> },
    RemoveWallet { address: String },
    RenameWallet { address: String, name: String },
    ListWallets,
    AddToken { address: String, ticker: String },
    RemoveToken { address: String },
    ListTokens,
    CheckBalance { token_address: String, ticker: Option<String> },
    /// Free text, answered only when the chat owes us a ticker
    Text(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: /{0}")]
    UnknownCommand(String),
}

pub const USAGE_CHECK_BALANCE: &str = "/check_balance <contract_address> [ticker]";
pub const USAGE_ADD_WALLET: &str = "/add_wallet <wallet_address> [name]";
pub const USAGE_REMOVE_WALLET: &str = "/remove_wallet <wallet_address>";
pub const USAGE_RENAME_WALLET: &str = "/rename_wallet <wallet_address> <new_name>";
pub const USAGE_ADD_TOKEN: &str = "/add_token <token_address> <ticker>";
pub const USAGE_REMOVE_TOKEN: &str = "/remove_token <token_address>";

/// Parse one chat message
pub fn parse(text: &str) -> Result<Request, ParseError> {
    let text = text.trim();

    if let Some(request) = parse_button(text) {
        return Ok(request);
    }

    let Some(stripped) = text.strip_prefix('/') else {
        return Ok(Request::Text(text.to_string()));
    };

    let (command, args) = split_first(stripped).unwrap_or((stripped, ""));
    // Group chats address commands as /cmd@BotName
    let command = command.split('@').next().unwrap_or(command).to_ascii_lowercase();

    match command.as_str() {
        "start" | "help" => Ok(Request::Help),
        "list_wallets" => Ok(Request::ListWallets),
        "list_tokens" => Ok(Request::ListTokens),
        "check_balance" => {
            let (token_address, rest) = split_first(args).ok_or(ParseError::Usage(USAGE_CHECK_BALANCE))?;
            let ticker = split_first(rest).map(|(ticker, _)| ticker.to_string());
            Ok(Request::CheckBalance {
                token_address: token_address.to_string(),
                ticker,
            })
        }
        "add_wallet" => {
            let (address, name) = split_first(args).ok_or(ParseError::Usage(USAGE_ADD_WALLET))?;
            Ok(Request::AddWallet {
                address: address.to_string(),
                name: (!name.is_empty()).then(|| name.to_string()),
            })
        }
        "remove_wallet" => {
            let (address, _) = split_first(args).ok_or(ParseError::Usage(USAGE_REMOVE_WALLET))?;
            Ok(Request::RemoveWallet { address: address.to_string() })
        }
        "rename_wallet" => match split_first(args) {
            Some((address, name)) if !name.is_empty() => Ok(Request::RenameWallet {
                address: address.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ParseError::Usage(USAGE_RENAME_WALLET)),
        },
        "add_token" => match split_first(args) {
            Some((address, ticker)) if !ticker.is_empty() => Ok(Request::AddToken {
                address: address.to_string(),
                ticker: ticker.to_string(),
            }),
            _ => Err(ParseError::Usage(USAGE_ADD_TOKEN)),
        },
        "remove_token" => {
            let (address, _) = split_first(args).ok_or(ParseError::Usage(USAGE_REMOVE_TOKEN))?;
            Ok(Request::RemoveToken { address: address.to_string() })
        }
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_button(text: &str) -> Option<Request> {
    let request = match text {
        "Help" => Request::Help,
        "List Wallets" => Request::ListWallets,
        "List Tokens" => Request::ListTokens,
        "Check Balance" => Request::Prompt(Prompt::CheckBalance),
        "Add Wallet" => Request::Prompt(Prompt::AddWallet),
        "Remove Wallet" => Request::Prompt(Prompt::RemoveWallet),
        "Rename Wallet" => Request::Prompt(Prompt::RenameWallet),
        "Add Token" => Request::Prompt(Prompt::AddToken),
        "Remove Token" => Request::Prompt(Prompt::RemoveToken),
        _ => return None,
    };
    Some(request)
}

/// Split off the first whitespace-delimited word; the remainder is trimmed.
/// Returns None for blank input.
fn split_first(input: &str) -> Option<(&str, &str)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(idx) => Some((&input[..idx], input[idx..].trim())),
        None => Some((input, "")),
    }
}
