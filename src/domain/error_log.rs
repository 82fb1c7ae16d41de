use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::Pagination;

/// What the exception observer emits for one uncaught error, rejection or console error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub url: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub user_agent: String,
    pub session_id: String,
    pub timestamp: i64,
}

/// `POST /api/errors` body. Required fields are optional here so that a
/// missing field surfaces as a validation error instead of a parse error.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogInput {
    #[validate(required, length(min = 1))]
    pub url: Option<String>,
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
    pub stack: Option<String>,
    #[validate(required, length(min = 1))]
    pub user_agent: Option<String>,
    #[validate(required, length(min = 1))]
    pub session_id: Option<String>,
    pub timestamp: Option<i64>,
}

impl From<ErrorRecord> for ErrorLogInput {
    fn from(record: ErrorRecord) -> Self {
        Self {
            url: Some(record.url),
            message: Some(record.message),
            stack: record.stack,
            user_agent: Some(record.user_agent),
            session_id: Some(record.session_id),
            timestamp: Some(record.timestamp),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLog {
    pub id: String,
    pub url: String,
    pub message: String,
    pub stack: Option<String>,
    pub user_agent: String,
    pub session_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub session_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorLogPage {
    pub errors: Vec<ErrorLog>,
    pub pagination: Pagination,
}
