//! Request builder and response parser for the homework review API.
//!
//! # Design
//! `ReviewClient` holds the endpoint and the OAuth token and carries no
//! mutable state between calls. `build_homework_statuses` produces an
//! `HttpRequest`, `parse_homework_statuses` consumes an `HttpResponse`, and
//! `fetch` joins the two through a host-supplied `Transport`. There are no
//! retries here; the poller's fixed interval is the retry mechanism.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Stateless client for the homework statuses endpoint.
#[derive(Clone)]
pub struct ReviewClient {
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for ReviewClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"***")
            .finish()
    }
}

impl ReviewClient {
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request for every homework whose status changed since `from_date`.
    pub fn build_homework_statuses(&self, from_date: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint.clone(),
            headers: vec![("Authorization".to_string(), format!("OAuth {}", self.token))],
            query: vec![("from_date".to_string(), from_date.to_string())],
            body: None,
        }
    }

    /// Decode a statuses response.
    ///
    /// `request` is the request that produced `response`; it is only used to
    /// attach the query to errors.
    pub fn parse_homework_statuses(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<Value, ApiError> {
        if response.status != 200 {
            return Err(ApiError::StatusCode {
                endpoint: self.endpoint.clone(),
                status: response.status,
                params: request.query_string(),
            });
        }
        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        check_embedded_error(&body)?;
        Ok(body)
    }

    /// Build, execute, and parse a statuses request.
    pub fn fetch<T: Transport + ?Sized>(
        &self,
        transport: &T,
        from_date: i64,
    ) -> Result<Value, ApiError> {
        let request = self.build_homework_statuses(from_date);
        tracing::debug!(
            endpoint = %self.endpoint,
            params = %request.query_string(),
            "requesting homework statuses"
        );
        let response = transport
            .execute(&request)
            .map_err(|reason| ApiError::Connection {
                endpoint: self.endpoint.clone(),
                params: request.query_string(),
                reason,
            })?;
        self.parse_homework_statuses(&request, response)
    }
}

/// The service sometimes reports failures inside a 200 body.
fn check_embedded_error(body: &Value) -> Result<(), ApiError> {
    let Some(map) = body.as_object() else {
        return Ok(());
    };
    let details: Vec<String> = ["code", "error"]
        .iter()
        .filter_map(|key| map.get(*key).map(|v| format!("{key}: {}", render(v))))
        .collect();
    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Response(details.join(", ")))
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
