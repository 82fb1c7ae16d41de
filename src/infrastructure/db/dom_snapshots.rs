use sqlx::sqlite::SqlitePool;

use crate::domain::dom_snapshot::DomSnapshot;
use crate::domain::error::{AppError, Result};

pub struct DomSnapshotRepository {
    pool: SqlitePool,
}

impl DomSnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_snapshot(&self, snapshot: &DomSnapshot) -> Result<()> {
        sqlx::query(
            "INSERT INTO dom_snapshots (id, url, dom_structure, content_hash, user_agent, session_id, click_count, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&snapshot.id)
        .bind(&snapshot.url)
        .bind(&snapshot.dom_structure)
        .bind(&snapshot.content_hash)
        .bind(&snapshot.user_agent)
        .bind(&snapshot.session_id)
        .bind(snapshot.click_count)
        .bind(snapshot.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert DOM snapshot: {e}")))?;

        Ok(())
    }

    pub async fn list_snapshots_page(
        &self,
        session_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DomSnapshot>> {
        let snapshots = sqlx::query_as::<_, DomSnapshotEntity>(
            "SELECT id, url, dom_structure, content_hash, user_agent, session_id, click_count, timestamp
             FROM dom_snapshots WHERE (? IS NULL OR session_id = ?)
             ORDER BY timestamp DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(session_id)
        .bind(session_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list DOM snapshots: {e}")))?;

        Ok(snapshots.into_iter().map(|snapshot| snapshot.into()).collect())
    }

    pub async fn count_snapshots(&self, session_id: Option<&str>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM dom_snapshots WHERE (? IS NULL OR session_id = ?)",
        )
        .bind(session_id)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count DOM snapshots: {e}")))?;

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct DomSnapshotEntity {
    id: String,
    url: String,
    dom_structure: String,
    content_hash: String,
    user_agent: String,
    session_id: String,
    click_count: i64,
    timestamp: i64,
}

impl From<DomSnapshotEntity> for DomSnapshot {
    fn from(entity: DomSnapshotEntity) -> Self {
        Self {
            id: entity.id,
            url: entity.url,
            dom_structure: entity.dom_structure,
            content_hash: entity.content_hash,
            user_agent: entity.user_agent,
            session_id: entity.session_id,
            click_count: entity.click_count,
            timestamp: entity.timestamp,
        }
    }
}
