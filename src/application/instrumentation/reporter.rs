use serde::Serialize;
use serde_json::Value as JsonValue;

use super::endpoint::ApiPath;
use crate::domain::error::Result;

/// One-shot delivery of an observation to the collector.
///
/// Implementations must return immediately and must never report their own
/// failures through a wrapped console.
pub trait Reporter: Send + Sync {
    fn send(&self, path: ApiPath, payload: JsonValue);
}

/// Serializes `record` and hands it to the reporter.
pub fn report<R: Serialize>(reporter: &dyn Reporter, path: ApiPath, record: &R) -> Result<()> {
    let payload = serde_json::to_value(record)?;
    reporter.send(path, payload);
    Ok(())
}
