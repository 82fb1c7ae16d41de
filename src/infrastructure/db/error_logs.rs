use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite};

use crate::domain::error::{AppError, Result};
use crate::domain::error_log::ErrorLog;

pub struct ErrorLogRepository {
    pool: SqlitePool,
}

#[derive(Debug, Default, Clone)]
pub struct ErrorLogFilter {
    pub session_id: Option<String>,
    /// Substring match on the page URL.
    pub url: Option<String>,
}

impl ErrorLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_error(&self, error: &ErrorLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO error_logs (id, url, message, stack, user_agent, session_id, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&error.id)
        .bind(&error.url)
        .bind(&error.message)
        .bind(&error.stack)
        .bind(&error.user_agent)
        .bind(&error.session_id)
        .bind(error.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert error log: {e}")))?;

        Ok(())
    }

    pub async fn list_errors_page(
        &self,
        filter: &ErrorLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ErrorLog>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, url, message, stack, user_agent, session_id, timestamp FROM error_logs",
        );
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY timestamp DESC, rowid DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let errors = builder
            .build_query_as::<ErrorLogEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list error logs: {e}")))?;

        Ok(errors.into_iter().map(|error| error.into()).collect())
    }

    pub async fn count_errors(&self, filter: &ErrorLogFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM error_logs");
        push_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count error logs: {e}")))?;

        Ok(count)
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ErrorLogFilter) {
    let mut keyword = " WHERE ";
    if let Some(session_id) = &filter.session_id {
        builder.push(keyword).push("session_id = ").push_bind(session_id.clone());
        keyword = " AND ";
    }
    if let Some(url) = &filter.url {
        builder
            .push(keyword)
            .push("instr(url, ")
            .push_bind(url.clone())
            .push(") > 0");
    }
}

#[derive(sqlx::FromRow)]
struct ErrorLogEntity {
    id: String,
    url: String,
    message: String,
    stack: Option<String>,
    user_agent: String,
    session_id: String,
    timestamp: i64,
}

impl From<ErrorLogEntity> for ErrorLog {
    fn from(entity: ErrorLogEntity) -> Self {
        Self {
            id: entity.id,
            url: entity.url,
            message: entity.message,
            stack: entity.stack,
            user_agent: entity.user_agent,
            session_id: entity.session_id,
            timestamp: entity.timestamp,
        }
    }
}
