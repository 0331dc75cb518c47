//! Response rendering
//!
//! Turns dispatcher responses into Telegram HTML text.

use crate::application::commands::{
    USAGE_ADD_TOKEN, USAGE_ADD_WALLET, USAGE_CHECK_BALANCE, USAGE_REMOVE_TOKEN,
    USAGE_REMOVE_WALLET, USAGE_RENAME_WALLET,
};
use crate::application::{Prompt, Response};
use crate::domain::BalanceReport;

const HELP_TEXT: &str = "<b>Welcome! Here are the available commands:</b>\n\n\
<b>Check Balance</b> - Check token balances\n\
<b>Add Wallet</b> - Add a new wallet with an optional name\n\
<b>List Wallets</b> - List all wallets in the database\n\
<b>Remove Wallet</b> - Remove a wallet from the database\n\
<b>Rename Wallet</b> - Rename a wallet\n\
<b>List Tokens</b> - List all tokens in the database\n\
<b>Add Token</b> - Add a new token\n\
<b>Remove Token</b> - Remove a token from the database\n\
<b>Help</b> - Show this help message";

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

/// Render a response, or None when nothing should be sent
pub fn render(response: &Response) -> Option<String> {
    let text = match response {
        Response::Ignored => return None,
        Response::Help => HELP_TEXT.to_string(),
        Response::Prompt(prompt) => render_prompt(*prompt),
        Response::Usage(usage) => format!("Usage: {}", escape_html(usage)),
        Response::Unauthorized => "Sorry, you are not authorized to use this bot.".to_string(),
        Response::InvalidAddress { address } => format!("Invalid address: {}", code(address)),
        Response::WalletAdded { address } => format!("Wallet {} added successfully.", code(address)),
        Response::WalletExists { address } => {
            format!("Wallet {} already exists in the database.", code(address))
        }
        Response::WalletRemoved { address } => format!("Wallet {} removed successfully.", code(address)),
        Response::WalletNotFound { address } => {
            format!("Wallet {} not found in the database.", code(address))
        }
        Response::WalletRenamed { address, name } => {
            format!("Wallet {} renamed to {}.", code(address), escape_html(name))
        }
        Response::Wallets(wallets) if wallets.is_empty() => "No wallets in the database.".to_string(),
        Response::Wallets(wallets) => {
            let mut lines = vec!["<b>List of wallets:</b>".to_string()];
            for wallet in wallets {
                lines.push(format!(
                    "Address: {}\nName: {}\n",
                    code(&wallet.address),
                    escape_html(wallet.display_name())
                ));
            }
            lines.join("\n")
        }
        Response::TokenAdded { address, ticker } => format!(
            "Token {} with ticker {} added successfully.",
            code(address),
            escape_html(ticker)
        ),
        Response::TokenExists { address } => {
            format!("Token {} already exists in the database.", code(address))
        }
        Response::TokenRemoved { address, ticker } => format!(
            "Token {} with ticker {} removed successfully.",
            code(address),
            escape_html(ticker)
        ),
        Response::TokenNotFound { address } => {
            format!("Token {} not found in the database.", code(address))
        }
        Response::Tokens(tokens) if tokens.is_empty() => "No tokens in the database.".to_string(),
        Response::Tokens(tokens) => {
            let mut lines = vec!["<b>List of tokens:</b>".to_string()];
            for token in tokens {
                lines.push(format!(
                    "Address: {}\nTicker: {}\n",
                    code(&token.address),
                    escape_html(&token.ticker)
                ));
            }
            lines.join("\n")
        }
        Response::AskTicker { .. } => "Please provide the ticker for this token:".to_string(),
        Response::InvalidTicker => "Invalid ticker. Please try the check_balance command again.".to_string(),
        Response::Balances { ticker, report, .. } => render_balances(ticker, report),
        Response::NoBalances { .. } => "No balances found for the provided contract address.".to_string(),
        Response::Failed(reason) => format!("Something went wrong: {}", escape_html(reason)),
    };
    Some(text)
}

fn render_prompt(prompt: Prompt) -> String {
    match prompt {
        Prompt::CheckBalance => format!(
            "Copy and paste the following command, then add the contract address and ticker (for example):\n\n\
             <code>/check_balance EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm $WIF</code>\n\n\
             Usage: {}",
            escape_html(USAGE_CHECK_BALANCE)
        ),
        Prompt::AddWallet => template("add the wallet address and optional name", USAGE_ADD_WALLET),
        Prompt::RemoveWallet => template("add the wallet address to remove", USAGE_REMOVE_WALLET),
        Prompt::RenameWallet => template("add the wallet address and new name", USAGE_RENAME_WALLET),
        Prompt::AddToken => template("add the token address and ticker", USAGE_ADD_TOKEN),
        Prompt::RemoveToken => template("add the token address to remove", USAGE_REMOVE_TOKEN),
    }
}

fn template(what: &str, usage: &str) -> String {
    let command = usage.split_whitespace().next().unwrap_or(usage);
    format!(
        "Copy and paste the following command, then {}:\n\n<code>{} </code>",
        what, command
    )
}

/// Per-wallet lines, largest holding first, then the summary line
pub fn render_balances(ticker: &str, report: &BalanceReport) -> String {
    let ticker = escape_html(ticker);
    let mut lines = Vec::with_capacity(report.holdings.len() + 1);

    for record in report.sorted_records() {
        let name = record
            .name
            .as_deref()
            .map(|n| format!("Name: {}\n", escape_html(n)))
            .unwrap_or_default();
        lines.push(format!(
            "Address: {}\n{}Balance: <code>{:.6} {}</code>\n",
            code(&record.wallet_address),
            name,
            record.amount,
            ticker
        ));
    }

    lines.push(format!(
        "\nThe token {} is held by {} out of {} checked wallets ({:.2}%)",
        ticker,
        report.wallets_with_balance,
        report.total_wallets,
        report.holding_percentage()
    ));
    lines.join("\n")
}
