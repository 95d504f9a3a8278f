//! Host side of the homework bot: real HTTP, logging, and wiring.

pub mod logger;
pub mod transport;

use homework_core::{Config, Poller, TelegramClient, TelegramNotifier};

pub use transport::UreqTransport;

pub type BotPoller = Poller<UreqTransport, TelegramNotifier<UreqTransport>>;

/// Wire a poller for `config` that starts its window at `cursor`.
pub fn build_poller(config: &Config, cursor: i64) -> BotPoller {
    let transport = UreqTransport::new(config.http_timeout);
    let telegram = TelegramClient::new(
        &config.telegram_api_url,
        &config.telegram_token,
        &config.chat_id,
    );
    let notifier = TelegramNotifier::new(telegram, transport.clone());
    Poller::new(config, transport, notifier, cursor)
}
