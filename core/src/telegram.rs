//! Request builder and reply parser for the Telegram Bot API `sendMessage`
//! method.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Payload of a `sendMessage` call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendMessage {
    pub chat_id: String,
    pub text: String,
}

/// Envelope every Bot API method replies with.
#[derive(Debug, Clone, Deserialize)]
struct BotReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Stateless client bound to one bot token and one chat.
#[derive(Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str, chat_id: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn build_send_message(&self, text: &str) -> Result<HttpRequest, ApiError> {
        let payload = SendMessage {
            chat_id: self.chat_id.clone(),
            text: text.to_string(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/bot{}/sendMessage", self.api_base, self.token),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            query: Vec::new(),
            body: Some(body),
        })
    }

    pub fn parse_send_message(&self, response: HttpResponse) -> Result<(), ApiError> {
        let reply: Option<BotReply> = serde_json::from_str(&response.body).ok();
        match (response.status, reply) {
            (200, Some(BotReply { ok: true, .. })) => Ok(()),
            (status, Some(BotReply { description, .. })) => Err(ApiError::Delivery(format!(
                "код ответа {status}: {}",
                description.unwrap_or_else(|| "без описания".to_string())
            ))),
            (status, None) => Err(ApiError::Delivery(format!(
                "код ответа {status}: {}",
                response.body
            ))),
        }
    }
}
