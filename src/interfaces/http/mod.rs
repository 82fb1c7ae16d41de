use actix_cors::Cors;
use actix_web::http::{header, StatusCode};
use actix_web::{
    dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::application::use_cases::dom_snapshot::DomSnapshotUseCase;
use crate::application::use_cases::error_log::ErrorLogUseCase;
use crate::application::use_cases::network_request::NetworkRequestUseCase;
use crate::application::use_cases::script::ScriptUseCase;
use crate::domain::dom_snapshot::{DomSnapshotInput, DomSnapshotQuery};
use crate::domain::error::{AppError, Result};
use crate::domain::error_log::{ErrorLogInput, ErrorLogQuery};
use crate::domain::network_request::{NetworkRequestInput, NetworkRequestQuery};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::ping;
use crate::infrastructure::db::dom_snapshots::DomSnapshotRepository;
use crate::infrastructure::db::error_logs::ErrorLogRepository;
use crate::infrastructure::db::network_requests::NetworkRequestRepository;

/// Snapshots carry a whole serialized page.
const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub struct HttpState {
    pub error_logs: ErrorLogUseCase,
    pub dom_snapshots: DomSnapshotUseCase,
    pub network_requests: NetworkRequestUseCase,
    pub script: ScriptUseCase,
    pub pool: SqlitePool,
    pub started_at: Instant,
}

impl HttpState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        Self {
            error_logs: ErrorLogUseCase::new(Arc::new(ErrorLogRepository::new(pool.clone()))),
            dom_snapshots: DomSnapshotUseCase::new(Arc::new(DomSnapshotRepository::new(
                pool.clone(),
            ))),
            network_requests: NetworkRequestUseCase::new(Arc::new(NetworkRequestRepository::new(
                pool.clone(),
            ))),
            script: ScriptUseCase::new(config.public_url.clone(), config.gesture()),
            pool,
            started_at: Instant::now(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::ParseError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let message = match self {
            AppError::ValidationError(msg) | AppError::ParseError(msg) => msg.clone(),
            other => other.to_string(),
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

#[post("/errors")]
async fn create_error(
    data: web::Data<HttpState>,
    req: web::Json<ErrorLogInput>,
) -> Result<HttpResponse> {
    let error = data.error_logs.record_error(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": error.id })))
}

#[get("/errors")]
async fn list_errors(
    data: web::Data<HttpState>,
    query: web::Query<ErrorLogQuery>,
) -> Result<HttpResponse> {
    let page = data.error_logs.list_errors(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/dom-snapshots")]
async fn create_dom_snapshot(
    data: web::Data<HttpState>,
    req: web::Json<DomSnapshotInput>,
) -> Result<HttpResponse> {
    let snapshot = data.dom_snapshots.record_snapshot(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": snapshot.id })))
}

#[get("/dom-snapshots")]
async fn list_dom_snapshots(
    data: web::Data<HttpState>,
    query: web::Query<DomSnapshotQuery>,
) -> Result<HttpResponse> {
    let page = data.dom_snapshots.list_snapshots(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/network-requests")]
async fn create_network_request(
    data: web::Data<HttpState>,
    req: web::Json<NetworkRequestInput>,
) -> Result<HttpResponse> {
    data.network_requests
        .record_request(req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/network-requests")]
async fn list_network_requests(
    data: web::Data<HttpState>,
    query: web::Query<NetworkRequestQuery>,
) -> Result<HttpResponse> {
    let list = data
        .network_requests
        .list_requests(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptQuery {
    server_url: Option<String>,
}

#[get("/script")]
async fn serve_script(
    data: web::Data<HttpState>,
    query: web::Query<ScriptQuery>,
) -> Result<HttpResponse> {
    let body = data.script.render(query.server_url.as_deref())?;
    Ok(HttpResponse::Ok()
        .content_type("application/javascript")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(body))
}

async fn unknown_route(req: HttpRequest) -> Result<HttpResponse> {
    Err(AppError::NotFound(format!("No route for {} {}", req.method(), req.path())))
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> HttpResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match ping(&data.pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "timestamp": timestamp,
            "uptime": data.started_at.elapsed().as_secs_f64(),
        })),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "error": e.to_string(),
                "timestamp": timestamp,
            }))
        }
    }
}

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600)
}

/// Routes plus extractor configs, shared by the server and route tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _req| AppError::ParseError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ParseError(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(create_error)
            .service(list_errors)
            .service(create_dom_snapshot)
            .service(list_dom_snapshots)
            .service(create_network_request)
            .service(list_network_requests)
            .service(serve_script)
            .service(health)
            .default_service(web::to(unknown_route)),
    );
}

pub fn start_server(state: HttpState, host: &str, port: u16) -> Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))
    .map_err(|e| AppError::Internal(format!("Failed to bind collector on {}:{}: {}", host, port, e)))?
    .run();

    info!(host, port, "Collector listening");
    Ok(server)
}
