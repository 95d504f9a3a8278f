use std::{collections::VecDeque, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub const STATUSES_PATH: &str = "/api/user_api/homework_statuses/";
pub const TELEGRAM_PREFIX: &str = "/telegram";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Homework {
    pub id: u64,
    pub homework_name: String,
    pub status: String,
    pub reviewer_comment: String,
    pub date_updated: i64,
}

#[derive(Deserialize)]
pub struct SetStatus {
    pub homework_name: String,
    pub status: String,
    #[serde(default)]
    pub reviewer_comment: String,
}

#[derive(Deserialize)]
pub struct ScriptFailure {
    pub status: u16,
    #[serde(default = "one")]
    pub count: usize,
}

fn one() -> usize {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
}

/// Counters read back by tests through `/admin/stats`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub statuses_requests: usize,
}

#[derive(Deserialize)]
pub struct StatusesQuery {
    pub from_date: Option<String>,
}

/// In-memory state behind both fake services.
///
/// `clock` is the fake server time. It ticks once per status change, so a
/// homework updated at tick `n` is visible to every `from_date <= n`.
#[derive(Debug, Default)]
pub struct MockState {
    pub practicum_token: String,
    pub telegram_token: String,
    pub clock: i64,
    pub homeworks: Vec<Homework>,
    pub failures: VecDeque<u16>,
    pub sent: Vec<SentMessage>,
    pub stats: Stats,
}

pub type Db = Arc<RwLock<MockState>>;

pub fn new_state(practicum_token: &str, telegram_token: &str) -> Db {
    Arc::new(RwLock::new(MockState {
        practicum_token: practicum_token.to_string(),
        telegram_token: telegram_token.to_string(),
        ..MockState::default()
    }))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route(STATUSES_PATH, get(homework_statuses))
        .route("/admin/homeworks", put(set_status))
        .route("/admin/failures", post(script_failure))
        .route("/admin/messages", get(list_messages))
        .route("/admin/stats", get(stats))
        .route(
            &format!("{TELEGRAM_PREFIX}/{{bot}}/sendMessage"),
            post(send_message),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

async fn homework_statuses(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<StatusesQuery>,
) -> Response {
    let mut state = db.write().await;
    state.stats.statuses_requests += 1;

    let expected = format!("OAuth {}", state.practicum_token);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        let body = json!({
            "code": "not_authenticated",
            "message": "Учетные данные не были предоставлены.",
            "source": "__response__",
        });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    if let Some(code) = state.failures.pop_front() {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "scripted failure").into_response();
    }

    let Some(from_date) = query.from_date.and_then(|v| v.parse::<i64>().ok()) else {
        let body = json!({
            "error": {"error": "Wrong from_date format"},
            "code": "UnknownError",
            "source": "__response__",
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let homeworks: Vec<Homework> = state
        .homeworks
        .iter()
        .filter(|hw| hw.date_updated >= from_date)
        .cloned()
        .collect();
    Json(json!({"homeworks": homeworks, "current_date": state.clock})).into_response()
}

async fn set_status(State(db): State<Db>, Json(input): Json<SetStatus>) -> Json<Homework> {
    let mut state = db.write().await;
    state.clock += 1;
    let now = state.clock;
    let next_id = state.homeworks.len() as u64 + 1;

    let homework = match state
        .homeworks
        .iter()
        .position(|hw| hw.homework_name == input.homework_name)
    {
        Some(idx) => {
            let mut hw = state.homeworks.remove(idx);
            hw.status = input.status;
            hw.reviewer_comment = input.reviewer_comment;
            hw.date_updated = now;
            hw
        }
        None => Homework {
            id: next_id,
            homework_name: input.homework_name,
            status: input.status,
            reviewer_comment: input.reviewer_comment,
            date_updated: now,
        },
    };
    // Most recently updated first.
    state.homeworks.insert(0, homework.clone());
    Json(homework)
}

async fn script_failure(State(db): State<Db>, Json(input): Json<ScriptFailure>) -> StatusCode {
    let mut state = db.write().await;
    state
        .failures
        .extend(std::iter::repeat(input.status).take(input.count));
    StatusCode::NO_CONTENT
}

async fn list_messages(State(db): State<Db>) -> Json<Vec<SentMessage>> {
    Json(db.read().await.sent.clone())
}

async fn stats(State(db): State<Db>) -> Json<Stats> {
    Json(db.read().await.stats.clone())
}

async fn send_message(
    State(db): State<Db>,
    Path(bot): Path<String>,
    Json(input): Json<SentMessage>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut state = db.write().await;
    if bot.strip_prefix("bot") != Some(state.telegram_token.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    }
    if input.text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: message text is empty"})),
        );
    }
    state.sent.push(input);
    let message_id = state.sent.len();
    (
        StatusCode::OK,
        Json(json!({"ok": true, "result": {"message_id": message_id}})),
    )
}
