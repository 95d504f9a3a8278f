//! The polling loop.
//!
//! # Design
//! `Poller` owns the only mutable state in the system: the `from_date`
//! cursor, the last status reported to the chat, and the last error message
//! reported to the chat. Each cycle fetches, validates, compares the first
//! homework's status against the last one reported, and notifies on change.
//! Any failure inside a cycle is turned into a chat message that is sent only
//! when it differs from the previous one; the loop itself never stops.
//!
//! The cursor moves to the server's `current_date` after a status change has
//! been reported, so the next window starts where the server's clock left
//! off. Responses without a usable `current_date` leave the cursor alone.

use std::time::Duration;

use serde_json::Value;

use crate::client::ReviewClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::Transport;
use crate::notifier::Notifier;
use crate::response::{check_response, parse_homework, raw_status};
use crate::types::HomeworkStatus;

/// Prefix of every failure message relayed to the chat.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Blocks the loop between cycles.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// `Sleeper` that parks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The first homework's status changed and a message was handed to the
    /// notifier.
    Notified(HomeworkStatus),
    /// The first homework's status matches the last one reported.
    Unchanged,
    /// The response held no homeworks.
    Empty,
    /// The cycle failed. `reported` is true when the message differed from the
    /// previous failure and was handed to the notifier.
    Failed { message: String, reported: bool },
}

/// Fetch-compare-notify loop over one review endpoint and one chat.
pub struct Poller<T, N> {
    client: ReviewClient,
    transport: T,
    notifier: N,
    retry_interval: Duration,
    cursor: i64,
    last_status: Option<HomeworkStatus>,
    last_error: Option<String>,
}

impl<T: Transport, N: Notifier> Poller<T, N> {
    /// Create a poller whose first request asks for changes since `cursor`.
    pub fn new(config: &Config, transport: T, notifier: N, cursor: i64) -> Self {
        Self {
            client: ReviewClient::new(&config.endpoint, &config.practicum_token),
            transport,
            notifier,
            retry_interval: config.retry_interval,
            cursor,
            last_status: None,
            last_error: None,
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_status(&self) -> Option<HomeworkStatus> {
        self.last_status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run one fetch-compare-notify cycle. Never fails; failures are reported
    /// through the returned outcome and the chat.
    pub fn poll_once(&mut self) -> CycleOutcome {
        match self.cycle() {
            Ok(outcome) => outcome,
            Err(err) => self.report_failure(&err),
        }
    }

    /// Run `cycles` cycles, sleeping the retry interval after each one.
    pub fn run_cycles<S: Sleeper>(&mut self, cycles: usize, sleeper: &mut S) -> Vec<CycleOutcome> {
        (0..cycles)
            .map(|_| {
                let outcome = self.poll_once();
                sleeper.sleep(self.retry_interval);
                outcome
            })
            .collect()
    }

    /// Poll forever.
    pub fn run<S: Sleeper>(&mut self, sleeper: &mut S) -> ! {
        tracing::info!(
            endpoint = %self.client.endpoint(),
            interval_secs = self.retry_interval.as_secs(),
            cursor = self.cursor,
            "polling started"
        );
        loop {
            self.poll_once();
            sleeper.sleep(self.retry_interval);
        }
    }

    fn cycle(&mut self) -> Result<CycleOutcome, ApiError> {
        let body = self.client.fetch(&self.transport, self.cursor)?;
        let homeworks = check_response(&body)?;
        let Some(first) = homeworks.first() else {
            tracing::debug!(cursor = self.cursor, "no homeworks in response");
            return Ok(CycleOutcome::Empty);
        };

        let current = raw_status(first)?;
        let unchanged = match (self.last_status, current) {
            (Some(last), Value::String(s)) => last.as_str() == s,
            _ => false,
        };
        if unchanged {
            tracing::debug!(status = %current, "homework status unchanged");
            return Ok(CycleOutcome::Unchanged);
        }

        let homework = parse_homework(first)?;
        tracing::info!(
            homework = %homework.name,
            status = %homework.status,
            "homework status changed"
        );
        self.notify(&homework.status_message());
        self.last_status = Some(homework.status);
        if let Some(current_date) = body.get("current_date").and_then(Value::as_i64) {
            tracing::debug!(from = self.cursor, to = current_date, "cursor advanced");
            self.cursor = current_date;
        }
        Ok(CycleOutcome::Notified(homework.status))
    }

    fn report_failure(&mut self, err: &ApiError) -> CycleOutcome {
        let message = format!("{FAILURE_PREFIX}: {err}");
        tracing::error!(error = %err, "{FAILURE_PREFIX}");
        let reported = self.last_error.as_deref() != Some(message.as_str());
        if reported {
            self.notify(&message);
            self.last_error = Some(message.clone());
        } else {
            tracing::debug!("failure already reported to chat");
        }
        CycleOutcome::Failed { message, reported }
    }

    /// Delivery problems are logged and never leave this function.
    fn notify(&self, text: &str) {
        if let Err(err) = self.notifier.send_message(text) {
            tracing::error!(error = %err, "failed to send message to chat");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::config::{PRACTICUM_TOKEN, TELEGRAM_CHAT_ID, TELEGRAM_TOKEN};
    use crate::http::{HttpRequest, HttpResponse};

    /// Replays scripted replies in order; the last one repeats.
    struct Script {
        replies: RefCell<VecDeque<Result<HttpResponse, String>>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Script {
        fn new(replies: Vec<Result<HttpResponse, String>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn from_dates(&self) -> Vec<String> {
            self.seen
                .borrow()
                .iter()
                .map(|r| r.query[0].1.clone())
                .collect()
        }
    }

    impl Transport for Script {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
            self.seen.borrow_mut().push(request.clone());
            let mut replies = self.replies.borrow_mut();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap()
            }
        }
    }

    #[derive(Default)]
    struct Inbox {
        sent: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Notifier for Inbox {
        fn send_message(&self, text: &str) -> Result<(), ApiError> {
            self.sent.borrow_mut().push(text.to_string());
            if self.fail {
                Err(ApiError::Delivery("chat not found".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct CountingSleeper(Vec<Duration>);

    impl Sleeper for CountingSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    fn config() -> Config {
        Config::from_lookup(|name| match name {
            PRACTICUM_TOKEN => Some("p".to_string()),
            TELEGRAM_TOKEN => Some("t".to_string()),
            TELEGRAM_CHAT_ID => Some("1".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn ok(body: &str) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    fn status(code: u16) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status: code,
            headers: Vec::new(),
            body: String::new(),
        })
    }

    fn poller(replies: Vec<Result<HttpResponse, String>>) -> Poller<Script, Inbox> {
        Poller::new(&config(), Script::new(replies), Inbox::default(), 1000)
    }

    const APPROVED: &str =
        r#"{"homeworks":[{"homework_name":"task1","status":"approved"}],"current_date":2000}"#;

    #[test]
    fn approved_homework_is_announced_once() {
        let mut p = poller(vec![ok(APPROVED)]);
        assert_eq!(p.poll_once(), CycleOutcome::Notified(HomeworkStatus::Approved));
        assert_eq!(
            p.notifier().sent.borrow().as_slice(),
            ["Изменился статус проверки работы \"task1\". Работа проверена: ревьюеру всё понравилось. Ура!"]
        );
        assert_eq!(p.last_status(), Some(HomeworkStatus::Approved));
    }

    #[test]
    fn unchanged_status_is_not_repeated() {
        let mut p = poller(vec![ok(APPROVED)]);
        p.poll_once();
        assert_eq!(p.poll_once(), CycleOutcome::Unchanged);
        assert_eq!(p.notifier().sent.borrow().len(), 1);
    }

    #[test]
    fn status_change_is_announced_again() {
        let reviewing = r#"{"homeworks":[{"homework_name":"task1","status":"reviewing"}]}"#;
        let mut p = poller(vec![ok(reviewing), ok(APPROVED)]);
        assert_eq!(p.poll_once(), CycleOutcome::Notified(HomeworkStatus::Reviewing));
        assert_eq!(p.poll_once(), CycleOutcome::Notified(HomeworkStatus::Approved));
        assert_eq!(p.notifier().sent.borrow().len(), 2);
    }

    #[test]
    fn empty_list_sends_nothing() {
        let mut p = poller(vec![ok(r#"{"homeworks":[],"current_date":5000}"#)]);
        assert_eq!(p.poll_once(), CycleOutcome::Empty);
        assert!(p.notifier().sent.borrow().is_empty());
        assert_eq!(p.cursor(), 1000);
    }

    #[test]
    fn cursor_advances_to_current_date_after_notification() {
        let mut p = poller(vec![ok(APPROVED), ok(r#"{"homeworks":[]}"#)]);
        p.poll_once();
        assert_eq!(p.cursor(), 2000);
        p.poll_once();
        assert_eq!(p.transport.from_dates(), ["1000", "2000"]);
    }

    #[test]
    fn only_first_homework_is_inspected() {
        let body = r#"{"homeworks":[
            {"homework_name":"new","status":"reviewing"},
            {"homework_name":"old","status":"approved"}
        ]}"#;
        let mut p = poller(vec![ok(body)]);
        assert_eq!(p.poll_once(), CycleOutcome::Notified(HomeworkStatus::Reviewing));
        assert_eq!(p.notifier().sent.borrow().len(), 1);
        assert!(p.notifier().sent.borrow()[0].contains("\"new\""));
    }

    #[test]
    fn status_code_failure_is_reported_once() {
        let mut p = poller(vec![status(503)]);
        let first = p.poll_once();
        let second = p.poll_once();
        let (message, reported) = match first {
            CycleOutcome::Failed { message, reported } => (message, reported),
            other => panic!("expected failure, got {other:?}"),
        };
        assert!(reported);
        assert!(message.starts_with(FAILURE_PREFIX));
        assert!(message.contains("503"));
        assert_eq!(
            second,
            CycleOutcome::Failed {
                message: message.clone(),
                reported: false
            }
        );
        assert_eq!(p.notifier().sent.borrow().as_slice(), [message]);
    }

    #[test]
    fn different_failures_are_each_reported() {
        let mut p = poller(vec![status(503), status(500), ok(r#"{"foo":1}"#)]);
        for _ in 0..3 {
            p.poll_once();
        }
        let sent = p.notifier().sent.borrow();
        assert_eq!(sent.len(), 3);
        assert!(sent[2].contains("homeworks"));
    }

    #[test]
    fn unknown_status_is_reported_as_failure() {
        let body = r#"{"homeworks":[{"homework_name":"task1","status":"lost"}]}"#;
        let mut p = poller(vec![ok(body)]);
        let outcome = p.poll_once();
        assert!(matches!(outcome, CycleOutcome::Failed { ref message, reported: true } if message.contains("lost")));
        assert_eq!(p.last_status(), None);
        assert!(matches!(p.poll_once(), CycleOutcome::Failed { reported: false, .. }));
        assert_eq!(p.notifier().sent.borrow().len(), 1);
    }

    #[test]
    fn connection_failure_does_not_stop_polling() {
        let mut p = poller(vec![Err("connection refused".to_string()), ok(APPROVED)]);
        assert!(matches!(p.poll_once(), CycleOutcome::Failed { reported: true, .. }));
        assert_eq!(p.poll_once(), CycleOutcome::Notified(HomeworkStatus::Approved));
        assert!(p.last_error().unwrap().contains("connection refused"));
    }

    #[test]
    fn delivery_failure_is_swallowed() {
        let mut p = Poller::new(
            &config(),
            Script::new(vec![ok(APPROVED)]),
            Inbox {
                fail: true,
                ..Inbox::default()
            },
            0,
        );
        assert_eq!(p.poll_once(), CycleOutcome::Notified(HomeworkStatus::Approved));
        assert_eq!(p.poll_once(), CycleOutcome::Unchanged);
        assert_eq!(p.notifier().sent.borrow().len(), 1);
    }

    #[test]
    fn run_cycles_sleeps_the_retry_interval_after_each_cycle() {
        let mut p = poller(vec![ok(APPROVED)]);
        let mut sleeper = CountingSleeper::default();
        let outcomes = p.run_cycles(3, &mut sleeper);
        assert_eq!(
            outcomes,
            [
                CycleOutcome::Notified(HomeworkStatus::Approved),
                CycleOutcome::Unchanged,
                CycleOutcome::Unchanged
            ]
        );
        assert_eq!(sleeper.0, vec![Duration::from_secs(600); 3]);
    }
}
