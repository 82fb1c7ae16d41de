use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::error_log::{normalize_optional, required};
use crate::domain::error::Result;
use crate::domain::network_request::{
    NetworkRequest, NetworkRequestInput, NetworkRequestList, NetworkRequestQuery,
};
use crate::infrastructure::db::network_requests::NetworkRequestRepository;

const URL_MAX_CHARS: usize = 255;
const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

pub struct NetworkRequestUseCase {
    repository: Arc<NetworkRequestRepository>,
}

impl NetworkRequestUseCase {
    pub fn new(repository: Arc<NetworkRequestRepository>) -> Self {
        Self { repository }
    }

    pub async fn record_request(&self, input: NetworkRequestInput) -> Result<NetworkRequest> {
        input.validate()?;

        let url = required(input.url, "url")?;
        let request = NetworkRequest {
            id: Uuid::new_v4().to_string(),
            url: truncate_chars(&url, URL_MAX_CHARS),
            method: required(input.method, "method")?.to_uppercase(),
            status: input.status,
            status_text: input.status_text,
            response_time: input.response_time,
            request_headers_json: input.request_headers.map(|headers| headers.to_string()),
            response_headers_json: input.response_headers.map(|headers| headers.to_string()),
            request_body: input.request_body,
            response_body: input.response_body,
            error: normalize_optional(input.error),
            user_agent: normalize_optional(input.user_agent),
            session_id: normalize_optional(input.session_id),
            timestamp: input
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        };

        self.repository.insert_request(&request).await?;
        Ok(request)
    }

    pub async fn list_requests(&self, query: NetworkRequestQuery) -> Result<NetworkRequestList> {
        let limit = match query.limit {
            Some(value) if value > 0 => value.min(MAX_LIST_LIMIT),
            _ => DEFAULT_LIST_LIMIT,
        };
        let session_id = normalize_optional(query.session_id);
        let requests = self
            .repository
            .list_requests(session_id.as_deref(), limit)
            .await?;
        Ok(NetworkRequestList { requests })
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::network_request::{HeaderMap, NetworkRecord};
    use crate::infrastructure::db::connection::init_collector_db;

    async fn use_case() -> NetworkRequestUseCase {
        let pool = init_collector_db("sqlite::memory:", 1).await.unwrap();
        NetworkRequestUseCase::new(Arc::new(NetworkRequestRepository::new(pool)))
    }

    fn record(url: &str, status: Option<u16>, error: Option<&str>) -> NetworkRecord {
        let mut headers = HeaderMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        NetworkRecord {
            url: url.to_string(),
            method: "get".to_string(),
            status,
            status_text: status.map(|_| "Not Found".to_string()),
            response_time: 150,
            request_headers: None,
            response_headers: Some(headers),
            request_body: None,
            response_body: Some("{}".to_string()),
            error: error.map(str::to_string),
            user_agent: "Mozilla/5.0".to_string(),
            session_id: "s1".to_string(),
            timestamp: 5_000,
        }
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 255), "short");
    }

    #[tokio::test]
    async fn test_record_request_truncates_url_and_keeps_headers_as_json() {
        let use_case = use_case().await;
        let long_url = format!("https://api.example.com/{}", "a".repeat(400));

        let stored = use_case
            .record_request(record(&long_url, Some(404), None).into())
            .await
            .unwrap();

        assert_eq!(stored.url.chars().count(), URL_MAX_CHARS);
        assert_eq!(stored.method, "GET");
        assert_eq!(stored.status, Some(404));
        assert_eq!(
            stored.response_headers_json.as_deref(),
            Some(r#"{"content-type":"application/json"}"#)
        );
    }

    #[tokio::test]
    async fn test_record_request_requires_url_and_method() {
        let use_case = use_case().await;
        let input = NetworkRequestInput {
            url: Some("https://api.example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            use_case.record_request(input).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_requests_newest_first_with_limit() {
        let use_case = use_case().await;
        for i in 0..3 {
            let mut input: NetworkRequestInput =
                record("https://api.example.com/data", None, Some("Failed to fetch")).into();
            input.timestamp = Some(i);
            use_case.record_request(input).await.unwrap();
        }

        let list = use_case
            .list_requests(NetworkRequestQuery {
                limit: Some(2),
                session_id: Some("s1".to_string()),
            })
            .await
            .unwrap();

        let timestamps: Vec<i64> = list.requests.iter().map(|request| request.timestamp).collect();
        assert_eq!(timestamps, vec![2, 1]);
        assert!(list.requests[0].status.is_none());
        assert_eq!(list.requests[0].error.as_deref(), Some("Failed to fetch"));
    }
}
