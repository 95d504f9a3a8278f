//! Outbound chat notifications.

use crate::error::ApiError;
use crate::http::Transport;
use crate::telegram::TelegramClient;

/// Sends a text message to the configured chat.
///
/// Implementations report failure through `Err`; deciding whether a failure
/// matters is left to the caller.
pub trait Notifier {
    fn send_message(&self, text: &str) -> Result<(), ApiError>;
}

/// `Notifier` backed by the Telegram Bot API over a host `Transport`.
#[derive(Debug, Clone)]
pub struct TelegramNotifier<T> {
    client: TelegramClient,
    transport: T,
}

impl<T: Transport> TelegramNotifier<T> {
    pub fn new(client: TelegramClient, transport: T) -> Self {
        Self { client, transport }
    }
}

impl<T: Transport> Notifier for TelegramNotifier<T> {
    fn send_message(&self, text: &str) -> Result<(), ApiError> {
        let request = self.client.build_send_message(text)?;
        let response = self
            .transport
            .execute(&request)
            .map_err(ApiError::Delivery)?;
        self.client.parse_send_message(response)?;
        tracing::info!(chat_id = %self.client.chat_id(), "message sent to chat");
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send_message(&self, text: &str) -> Result<(), ApiError> {
        (**self).send_message(text)
    }
}
