//! Telegram Bot loop
//!
//! Polls for updates and hands every text message to the dispatcher on
//! its own task, so a slow balance check never blocks other chats.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::application::{Dispatcher, IncomingMessage};
use super::client::TelegramClient;
use super::render::render;
use super::types::Update;

/// Pause after a failed poll before trying again
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct TelegramBot {
    client: TelegramClient,
    dispatcher: Arc<Dispatcher>,
    is_running: Arc<RwLock<bool>>,
}

impl TelegramBot {
    pub fn new(client: TelegramClient, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            client,
            dispatcher,
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Poll until `stop` is called
    pub async fn run(&self) {
        *self.is_running.write().await = true;
        tracing::info!("Telegram bot polling started");

        let mut offset: Option<i64> = None;
        while *self.is_running.read().await {
            match self.client.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.spawn_update(update);
                    }
                }
                Err(e) => {
                    tracing::error!("Polling error: {}", e);
                    // Continue running despite errors
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                }
            }
        }

        tracing::info!("Telegram bot stopped");
    }

    /// Ask the poll loop to exit after the current request
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    fn spawn_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text else {
            return;
        };

        let incoming = IncomingMessage {
            chat_id: message.chat.id,
            username: message.from.and_then(|user| user.username),
            text,
        };
        let reply_to = message.message_id;
        let client = self.client.clone();
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            let response = dispatcher.handle_message(&incoming).await;
            let Some(reply) = render(&response) else {
                return;
            };
            if let Err(e) = client.send_message(incoming.chat_id, &reply, Some(reply_to)).await {
                tracing::error!("Failed to reply in chat {}: {}", incoming.chat_id, e);
            }
        });
    }
}
