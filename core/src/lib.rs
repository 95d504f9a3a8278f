//! Core of the homework status bot.
//!
//! # Overview
//! Polls a homework review API, detects status changes of the most recent
//! homework, and relays human-readable notifications to a Telegram chat.
//!
//! # Design
//! - Host-does-IO: clients build `HttpRequest` values and parse
//!   `HttpResponse` values; the host supplies a `Transport` that performs the
//!   round-trip, so everything here is deterministic and testable.
//! - `Poller` is the only stateful piece. It owns the `from_date` cursor and
//!   the last status/error reported, and never stops on a failed cycle.
//! - Configuration is read once into `Config` and passed in explicitly.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notifier;
pub mod poller;
pub mod response;
pub mod telegram;
pub mod types;

pub use client::ReviewClient;
pub use config::Config;
pub use error::{ApiError, ConfigError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use notifier::{Notifier, TelegramNotifier};
pub use poller::{CycleOutcome, Poller, Sleeper, ThreadSleeper};
pub use response::{check_response, parse_status};
pub use telegram::TelegramClient;
pub use types::{Homework, HomeworkStatus};
