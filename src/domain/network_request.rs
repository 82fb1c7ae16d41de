use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use validator::Validate;

pub type HeaderMap = BTreeMap<String, String>;

/// One intercepted outbound call. Built once per call, on completion or failure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub url: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    pub response_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<HeaderMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<HeaderMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub user_agent: String,
    pub session_id: String,
    pub timestamp: i64,
}

/// `POST /api/network-requests` body. Headers may arrive in any JSON shape.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequestInput {
    #[validate(required, length(min = 1))]
    pub url: Option<String>,
    #[validate(required, length(min = 1))]
    pub method: Option<String>,
    pub status: Option<i64>,
    pub status_text: Option<String>,
    pub response_time: Option<i64>,
    pub request_headers: Option<JsonValue>,
    pub response_headers: Option<JsonValue>,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub error: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub timestamp: Option<i64>,
}

impl From<NetworkRecord> for NetworkRequestInput {
    fn from(record: NetworkRecord) -> Self {
        let headers = |map: Option<HeaderMap>| {
            map.and_then(|headers| serde_json::to_value(headers).ok())
        };
        Self {
            url: Some(record.url),
            method: Some(record.method),
            status: record.status.map(i64::from),
            status_text: record.status_text,
            response_time: Some(record.response_time),
            request_headers: headers(record.request_headers),
            response_headers: headers(record.response_headers),
            request_body: record.request_body,
            response_body: record.response_body,
            error: record.error,
            user_agent: Some(record.user_agent),
            session_id: Some(record.session_id),
            timestamp: Some(record.timestamp),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequest {
    pub id: String,
    pub url: String,
    pub method: String,
    pub status: Option<i64>,
    pub status_text: Option<String>,
    pub response_time: Option<i64>,
    /// Headers as JSON text, listed under `requestHeaders`.
    #[serde(rename = "requestHeaders")]
    pub request_headers_json: Option<String>,
    #[serde(rename = "responseHeaders")]
    pub response_headers_json: Option<String>,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub error: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequestQuery {
    pub limit: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkRequestList {
    pub requests: Vec<NetworkRequest>,
}
