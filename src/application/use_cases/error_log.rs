use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::error_log::{ErrorLog, ErrorLogInput, ErrorLogPage, ErrorLogQuery};
use crate::domain::pagination::{normalize_page, Pagination};
use crate::infrastructure::db::error_logs::{ErrorLogFilter, ErrorLogRepository};

pub struct ErrorLogUseCase {
    repository: Arc<ErrorLogRepository>,
}

impl ErrorLogUseCase {
    pub fn new(repository: Arc<ErrorLogRepository>) -> Self {
        Self { repository }
    }

    pub async fn record_error(&self, input: ErrorLogInput) -> Result<ErrorLog> {
        input.validate()?;

        let error = ErrorLog {
            id: Uuid::new_v4().to_string(),
            url: required(input.url, "url")?,
            message: required(input.message, "message")?,
            stack: normalize_optional(input.stack),
            user_agent: required(input.user_agent, "userAgent")?,
            session_id: required(input.session_id, "sessionId")?,
            timestamp: input
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        };

        self.repository.insert_error(&error).await?;
        debug!(error_id = %error.id, session_id = %error.session_id, "Error log stored");
        Ok(error)
    }

    pub async fn list_errors(&self, query: ErrorLogQuery) -> Result<ErrorLogPage> {
        let (page, limit) = normalize_page(query.page, query.limit);
        let filter = ErrorLogFilter {
            session_id: normalize_optional(query.session_id),
            url: normalize_optional(query.url),
        };

        let total = self.repository.count_errors(&filter).await?;
        let pagination = Pagination::new(page, limit, total);
        let errors = if total == 0 {
            Vec::new()
        } else {
            self.repository
                .list_errors_page(&filter, limit, pagination.offset())
                .await?
        };

        Ok(ErrorLogPage { errors, pagination })
    }
}

pub(crate) fn required(value: Option<String>, field: &str) -> Result<String> {
    normalize_optional(value)
        .ok_or_else(|| AppError::ValidationError(format!("Missing required fields: {}", field)))
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_collector_db;

    async fn use_case() -> ErrorLogUseCase {
        let pool = init_collector_db("sqlite::memory:", 1).await.unwrap();
        ErrorLogUseCase::new(Arc::new(ErrorLogRepository::new(pool)))
    }

    fn input(session_id: &str, url: &str, timestamp: i64) -> ErrorLogInput {
        ErrorLogInput {
            url: Some(url.to_string()),
            message: Some("TypeError: x is undefined".to_string()),
            stack: None,
            user_agent: Some("Mozilla/5.0".to_string()),
            session_id: Some(session_id.to_string()),
            timestamp: Some(timestamp),
        }
    }

    #[tokio::test]
    async fn test_record_error_requires_fields() {
        let use_case = use_case().await;
        let mut missing_session = input("s1", "https://a.example.com", 1);
        missing_session.session_id = None;

        let err = use_case.record_error(missing_session).await.unwrap_err();
        match err {
            AppError::ValidationError(message) => assert!(message.contains("session_id")),
            other => panic!("unexpected error: {other}"),
        }

        let mut blank_message = input("s1", "https://a.example.com", 1);
        blank_message.message = Some("   ".to_string());
        assert!(matches!(
            use_case.record_error(blank_message).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_errors_paginates_newest_first() {
        let use_case = use_case().await;
        for i in 0..5 {
            use_case
                .record_error(input("s1", "https://a.example.com/page", i))
                .await
                .unwrap();
        }

        let page = use_case
            .list_errors(ErrorLogQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.pages, 3);
        let timestamps: Vec<i64> = page.errors.iter().map(|error| error.timestamp).collect();
        assert_eq!(timestamps, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let use_case = use_case().await;
        use_case
            .record_error(input("s1", "https://a.example.com", 1))
            .await
            .unwrap();

        let page = use_case
            .list_errors(ErrorLogQuery {
                page: Some(100_000_000_000_000_000),
                limit: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.page, 100_000_000_000_000_000);
        assert!(page.errors.is_empty());
    }

    #[tokio::test]
    async fn test_list_errors_filters_by_session_and_url_substring() {
        let use_case = use_case().await;
        use_case
            .record_error(input("s1", "https://shop.example.com/cart", 1))
            .await
            .unwrap();
        use_case
            .record_error(input("s1", "https://blog.example.com/post", 2))
            .await
            .unwrap();
        use_case
            .record_error(input("s2", "https://shop.example.com/checkout", 3))
            .await
            .unwrap();

        let page = use_case
            .list_errors(ErrorLogQuery {
                session_id: Some("s1".to_string()),
                url: Some("shop".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.errors[0].url, "https://shop.example.com/cart");
    }
}
