//! Shape checks and status parsing for decoded review API bodies.

use serde_json::Value;

use crate::error::{ApiError, ValidationError};
use crate::types::{Homework, HomeworkStatus};

/// Name of a JSON value's type, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a decoded body and return its `homeworks` list.
///
/// An empty list is valid.
pub fn check_response(body: &Value) -> Result<&[Value], ApiError> {
    let map = body.as_object().ok_or(ValidationError::WrongType {
        subject: "ответ API",
        expected: "object",
        actual: json_kind(body),
    })?;
    let homeworks = map
        .get("homeworks")
        .ok_or(ValidationError::MissingKey("homeworks"))?;
    let list = homeworks.as_array().ok_or(ValidationError::WrongType {
        subject: "homeworks",
        expected: "array",
        actual: json_kind(homeworks),
    })?;
    Ok(list)
}

/// The raw `status` string of a record, without checking it against the
/// verdict table.
pub fn raw_status(record: &Value) -> Result<&Value, ApiError> {
    let map = record.as_object().ok_or(ValidationError::WrongType {
        subject: "домашняя работа",
        expected: "object",
        actual: json_kind(record),
    })?;
    Ok(map
        .get("status")
        .ok_or(ValidationError::MissingKey("status"))?)
}

/// Turn a record into a validated `Homework`.
pub fn parse_homework(record: &Value) -> Result<Homework, ApiError> {
    let status = match raw_status(record)? {
        Value::String(s) => {
            HomeworkStatus::from_api(s).ok_or_else(|| ApiError::UnknownStatus(s.clone()))?
        }
        other => return Err(ApiError::UnknownStatus(other.to_string())),
    };
    let name = match record.get("homework_name") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(ValidationError::WrongType {
                subject: "homework_name",
                expected: "string",
                actual: json_kind(other),
            }
            .into())
        }
        None => return Err(ValidationError::MissingKey("homework_name").into()),
    };
    Ok(Homework { name, status })
}

/// Format the chat message for a record's status.
pub fn parse_status(record: &Value) -> Result<String, ApiError> {
    parse_homework(record).map(|hw| hw.status_message())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn check_response_returns_list() {
        let body = json!({"homeworks": [{"homework_name": "a", "status": "approved"}], "current_date": 1});
        let list = check_response(&body).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn check_response_accepts_empty_list() {
        let body = json!({"homeworks": []});
        assert!(check_response(&body).unwrap().is_empty());
    }

    #[test]
    fn check_response_rejects_missing_key() {
        for body in [json!({}), json!({"current_date": 5}), json!({"homework": []})] {
            let err = check_response(&body).unwrap_err();
            assert_eq!(
                err,
                ApiError::Validation(ValidationError::MissingKey("homeworks"))
            );
        }
    }

    #[test]
    fn check_response_rejects_non_sequence_homeworks() {
        for (value, kind) in [
            (json!("list"), "string"),
            (json!(3), "number"),
            (json!({"a": 1}), "object"),
            (json!(null), "null"),
        ] {
            let body = json!({ "homeworks": value });
            let err = check_response(&body).unwrap_err();
            assert!(
                matches!(
                    err,
                    ApiError::Validation(ValidationError::WrongType { subject: "homeworks", actual, .. }) if actual == kind
                ),
                "unexpected error for {kind}: {err:?}"
            );
        }
    }

    #[test]
    fn check_response_rejects_non_mapping_body() {
        let err = check_response(&json!([1, 2])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::WrongType { actual: "array", .. })
        ));
    }

    #[test]
    fn parse_status_formats_approved_message() {
        let record = json!({"homework_name": "task1", "status": "approved"});
        assert_eq!(
            parse_status(&record).unwrap(),
            "Изменился статус проверки работы \"task1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn parse_status_names_unknown_status() {
        for status in ["accepted", "APPROVED", ""] {
            let record = json!({"homework_name": "task1", "status": status});
            let err = parse_status(&record).unwrap_err();
            assert_eq!(err, ApiError::UnknownStatus(status.to_string()));
        }
    }

    #[test]
    fn parse_status_rejects_non_string_status() {
        let record = json!({"homework_name": "task1", "status": 7});
        assert_eq!(
            parse_status(&record).unwrap_err(),
            ApiError::UnknownStatus("7".to_string())
        );
    }

    #[test]
    fn parse_status_requires_status_key() {
        let record = json!({"homework_name": "task1"});
        assert_eq!(
            parse_status(&record).unwrap_err(),
            ApiError::Validation(ValidationError::MissingKey("status"))
        );
    }

    #[test]
    fn parse_status_requires_name() {
        let record = json!({"status": "reviewing"});
        assert_eq!(
            parse_status(&record).unwrap_err(),
            ApiError::Validation(ValidationError::MissingKey("homework_name"))
        );
    }
}
