use url::Url;

use crate::domain::error::{AppError, Result};

/// Ingestion routes of the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiPath {
    Errors,
    DomSnapshots,
    NetworkRequests,
}

impl ApiPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiPath::Errors => "/api/errors",
            ApiPath::DomSnapshots => "/api/dom-snapshots",
            ApiPath::NetworkRequests => "/api/network-requests",
        }
    }
}

/// The collection origin observations are posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEndpoint {
    origin: String,
}

impl CollectionEndpoint {
    pub fn parse(server_url: &str) -> Result<Self> {
        let trimmed = server_url.trim();
        let parsed = Url::parse(trimmed).map_err(|e| {
            AppError::ValidationError(format!("Invalid collection URL '{}': {}", trimmed, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::ValidationError(format!(
                "Collection URL must be http or https: {}",
                trimmed
            )));
        }

        Ok(Self {
            origin: trimmed.trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn url_for(&self, path: ApiPath) -> String {
        format!("{}{}", self.origin, path.as_str())
    }

    /// Substring match against the origin, not a parsed URL comparison.
    /// An unrelated URL that happens to contain the origin is also excluded.
    pub fn is_collection_url(&self, url: &str) -> bool {
        url.contains(&self.origin)
    }
}
