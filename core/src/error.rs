//! Error types for the homework bot core.
//!
//! # Design
//! `Display` texts are user-facing: the poller relays them to the chat as
//! part of the failure notification, so they are written in the language of
//! the chat. Variants carry enough context (endpoint, query, status code) to
//! diagnose a failure from the log line alone.

use thiserror::Error;

/// Errors produced while fetching, validating, and parsing review data, or
/// while delivering a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received: DNS failure, refused connection, timeout.
    #[error("сбой при запросе к эндпоинту {endpoint} с параметрами {params}: {reason}")]
    Connection {
        endpoint: String,
        params: String,
        reason: String,
    },

    /// The endpoint answered with something other than 200.
    #[error("эндпоинт {endpoint} недоступен, код ответа: {status}, параметры: {params}")]
    StatusCode {
        endpoint: String,
        status: u16,
        params: String,
    },

    /// A 200 answer whose body carries an `error` or `code` field.
    #[error("API сообщил об ошибке: {0}")]
    Response(String),

    /// The body is not valid JSON.
    #[error("ответ API не является корректным JSON: {0}")]
    Deserialization(String),

    /// An outgoing payload could not be encoded.
    #[error("не удалось сформировать запрос: {0}")]
    Serialization(String),

    /// The body is JSON but not shaped as expected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The homework status is not in the verdict table.
    #[error("недокументированный статус домашней работы: {0}")]
    UnknownStatus(String),

    /// The chat service refused or failed to accept a message.
    #[error("сбой при отправке сообщения в чат: {0}")]
    Delivery(String),
}

/// Shape errors found while inspecting a decoded JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required key is absent.
    #[error("в ответе API отсутствует ключ {0}")]
    MissingKey(&'static str),

    /// A value has the wrong JSON type.
    #[error("{subject} имеет тип {actual}, ожидался {expected}")]
    WrongType {
        subject: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Startup configuration failures. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more required variables are unset or blank.
    #[error("отсутствуют обязательные переменные окружения: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// An optional override is present but cannot be parsed.
    #[error("некорректное значение переменной {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
