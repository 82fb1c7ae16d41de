use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::Pagination;

/// Emitted by the gesture detector when a rapid-click burst is seen.
/// `dom_structure` is the whole serialized page and is never bounded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GestureRecord {
    pub url: String,
    pub dom_structure: String,
    pub user_agent: String,
    pub session_id: String,
    pub click_count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshotInput {
    #[validate(required, length(min = 1))]
    pub url: Option<String>,
    #[validate(required, length(min = 1))]
    pub dom_structure: Option<String>,
    #[validate(required, length(min = 1))]
    pub user_agent: Option<String>,
    #[validate(required, length(min = 1))]
    pub session_id: Option<String>,
    #[validate(required, range(min = 1))]
    pub click_count: Option<i64>,
    pub timestamp: Option<i64>,
}

impl From<GestureRecord> for DomSnapshotInput {
    fn from(record: GestureRecord) -> Self {
        Self {
            url: Some(record.url),
            dom_structure: Some(record.dom_structure),
            user_agent: Some(record.user_agent),
            session_id: Some(record.session_id),
            click_count: Some(record.click_count as i64),
            timestamp: Some(record.timestamp),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshot {
    pub id: String,
    pub url: String,
    pub dom_structure: String,
    pub content_hash: String,
    pub user_agent: String,
    pub session_id: String,
    pub click_count: i64,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshotQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DomSnapshotPage {
    pub snapshots: Vec<DomSnapshot>,
    pub pagination: Pagination,
}
