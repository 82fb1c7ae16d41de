use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_collector_db;
use crate::interfaces::http::{start_server, HttpState};

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let pool = init_collector_db(&config.database_url, config.max_connections).await?;
    info!(database_url = %config.database_url, "Collector database ready");

    let state = HttpState::new(pool, &config);
    let server = start_server(state, &config.host, config.port)?;
    server.await?;

    info!("Collector stopped");
    Ok(())
}
