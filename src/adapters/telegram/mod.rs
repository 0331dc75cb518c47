//! Telegram Adapter
//!
//! Chat transport for the dispatcher: Bot API client, long-poll loop and
//! HTML rendering of responses.

pub mod types;
pub mod client;
pub mod render;
pub mod bot;

pub use client::{TelegramClient, TelegramConfig, TelegramError, DEFAULT_API_URL};
pub use bot::TelegramBot;
pub use render::render;
