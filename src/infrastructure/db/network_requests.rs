use sqlx::sqlite::SqlitePool;

use crate::domain::error::{AppError, Result};
use crate::domain::network_request::NetworkRequest;

pub struct NetworkRequestRepository {
    pool: SqlitePool,
}

impl NetworkRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_request(&self, request: &NetworkRequest) -> Result<()> {
        sqlx::query(
            "INSERT INTO network_requests (id, url, method, status, status_text, response_time, request_headers_json, response_headers_json, request_body, response_body, error, user_agent, session_id, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.id)
        .bind(&request.url)
        .bind(&request.method)
        .bind(request.status)
        .bind(&request.status_text)
        .bind(request.response_time)
        .bind(&request.request_headers_json)
        .bind(&request.response_headers_json)
        .bind(&request.request_body)
        .bind(&request.response_body)
        .bind(&request.error)
        .bind(&request.user_agent)
        .bind(&request.session_id)
        .bind(request.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert network request: {e}")))?;

        Ok(())
    }

    pub async fn list_requests(
        &self,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<NetworkRequest>> {
        let requests = sqlx::query_as::<_, NetworkRequestEntity>(
            "SELECT id, url, method, status, status_text, response_time, request_headers_json, response_headers_json, request_body, response_body, error, user_agent, session_id, timestamp
             FROM network_requests WHERE (? IS NULL OR session_id = ?)
             ORDER BY timestamp DESC, rowid DESC LIMIT ?",
        )
        .bind(session_id)
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list network requests: {e}")))?;

        Ok(requests.into_iter().map(|request| request.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct NetworkRequestEntity {
    id: String,
    url: String,
    method: String,
    status: Option<i64>,
    status_text: Option<String>,
    response_time: Option<i64>,
    request_headers_json: Option<String>,
    response_headers_json: Option<String>,
    request_body: Option<String>,
    response_body: Option<String>,
    error: Option<String>,
    user_agent: Option<String>,
    session_id: Option<String>,
    timestamp: i64,
}

impl From<NetworkRequestEntity> for NetworkRequest {
    fn from(entity: NetworkRequestEntity) -> Self {
        Self {
            id: entity.id,
            url: entity.url,
            method: entity.method,
            status: entity.status,
            status_text: entity.status_text,
            response_time: entity.response_time,
            request_headers_json: entity.request_headers_json,
            response_headers_json: entity.response_headers_json,
            request_body: entity.request_body,
            response_body: entity.response_body,
            error: entity.error,
            user_agent: entity.user_agent,
            session_id: entity.session_id,
            timestamp: entity.timestamp,
        }
    }
}
