use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::error_log::{normalize_optional, required};
use crate::domain::dom_snapshot::{DomSnapshot, DomSnapshotInput, DomSnapshotPage, DomSnapshotQuery};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{normalize_page, Pagination};
use crate::infrastructure::db::dom_snapshots::DomSnapshotRepository;

pub struct DomSnapshotUseCase {
    repository: Arc<DomSnapshotRepository>,
}

impl DomSnapshotUseCase {
    pub fn new(repository: Arc<DomSnapshotRepository>) -> Self {
        Self { repository }
    }

    pub async fn record_snapshot(&self, input: DomSnapshotInput) -> Result<DomSnapshot> {
        input.validate()?;

        // Markup is stored verbatim, whitespace included.
        let dom_structure = input.dom_structure.ok_or_else(|| {
            AppError::ValidationError("Missing required fields: domStructure".to_string())
        })?;
        let click_count = input.click_count.ok_or_else(|| {
            AppError::ValidationError("Missing required fields: clickCount".to_string())
        })?;

        let snapshot = DomSnapshot {
            id: Uuid::new_v4().to_string(),
            url: required(input.url, "url")?,
            content_hash: content_hash(&dom_structure),
            dom_structure,
            user_agent: required(input.user_agent, "userAgent")?,
            session_id: required(input.session_id, "sessionId")?,
            click_count,
            timestamp: input
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        };

        self.repository.insert_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn list_snapshots(&self, query: DomSnapshotQuery) -> Result<DomSnapshotPage> {
        let (page, limit) = normalize_page(query.page, query.limit);
        let session_id = normalize_optional(query.session_id);

        let total = self.repository.count_snapshots(session_id.as_deref()).await?;
        let pagination = Pagination::new(page, limit, total);
        let snapshots = if total == 0 {
            Vec::new()
        } else {
            self.repository
                .list_snapshots_page(session_id.as_deref(), limit, pagination.offset())
                .await?
        };

        Ok(DomSnapshotPage {
            snapshots,
            pagination,
        })
    }
}

fn content_hash(dom_structure: &str) -> String {
    hex::encode(Sha256::digest(dom_structure.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dom_snapshot::GestureRecord;
    use crate::infrastructure::db::connection::init_collector_db;

    async fn use_case() -> DomSnapshotUseCase {
        let pool = init_collector_db("sqlite::memory:", 1).await.unwrap();
        DomSnapshotUseCase::new(Arc::new(DomSnapshotRepository::new(pool)))
    }

    fn record(session_id: &str, dom: &str) -> GestureRecord {
        GestureRecord {
            url: "https://shop.example.com/cart".to_string(),
            dom_structure: dom.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            session_id: session_id.to_string(),
            click_count: 3,
            timestamp: 1_000,
        }
    }

    #[tokio::test]
    async fn test_identical_markup_is_stored_twice() {
        let use_case = use_case().await;
        let first = use_case
            .record_snapshot(record("s1", "<html></html>").into())
            .await
            .unwrap();
        let second = use_case
            .record_snapshot(record("s1", "<html></html>").into())
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.content_hash, second.content_hash);
        assert_eq!(first.content_hash.len(), 64);

        let page = use_case
            .list_snapshots(DomSnapshotQuery::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
    }

    #[tokio::test]
    async fn test_zero_click_count_is_rejected() {
        let use_case = use_case().await;
        let mut input: DomSnapshotInput = record("s1", "<html></html>").into();
        input.click_count = Some(0);

        assert!(matches!(
            use_case.record_snapshot(input).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_huge_page_number_lists_nothing() {
        let use_case = use_case().await;
        use_case.record_snapshot(record("s1", "<a/>").into()).await.unwrap();

        let page = use_case
            .list_snapshots(DomSnapshotQuery {
                page: Some(i64::MAX),
                limit: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.snapshots.is_empty());
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_list_snapshots_by_session() {
        let use_case = use_case().await;
        use_case.record_snapshot(record("s1", "<a/>").into()).await.unwrap();
        use_case.record_snapshot(record("s2", "<b/>").into()).await.unwrap();

        let page = use_case
            .list_snapshots(DomSnapshotQuery {
                session_id: Some("s2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.snapshots.len(), 1);
        assert_eq!(page.snapshots[0].dom_structure, "<b/>");
    }
}
