use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::endpoint::ApiPath;
use super::ObserverContext;
use crate::domain::dom_snapshot::GestureRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureConfig {
    pub window_ms: i64,
    pub threshold: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            window_ms: 2000,
            threshold: 3,
        }
    }
}

/// Sliding window over click timestamps. Eviction happens lazily on each click.
#[derive(Debug, Clone)]
pub struct ClickWindow {
    config: GestureConfig,
    clicks: Vec<i64>,
}

impl ClickWindow {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            clicks: Vec::new(),
        }
    }

    /// Records a click at `now_ms`. Returns the retained count when the
    /// threshold is reached; the window is empty afterwards.
    pub fn register(&mut self, now_ms: i64) -> Option<usize> {
        self.clicks.push(now_ms);
        let window_ms = self.config.window_ms;
        self.clicks.retain(|&clicked_at| now_ms - clicked_at <= window_ms);

        if self.clicks.len() >= self.config.threshold {
            let count = self.clicks.len();
            self.clicks.clear();
            Some(count)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
    }
}

pub struct GestureDetector {
    window: Mutex<ClickWindow>,
    context: Arc<ObserverContext>,
}

impl GestureDetector {
    pub(crate) fn new(config: GestureConfig, context: Arc<ObserverContext>) -> Self {
        Self {
            window: Mutex::new(ClickWindow::new(config)),
            context,
        }
    }

    pub fn on_click(&self) -> Option<GestureRecord> {
        let now_ms = self.context.now_ms();
        let click_count = self
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(now_ms)?;

        let dom_structure = match self.context.page.serialize_dom() {
            Ok(dom) => dom,
            Err(err) => {
                warn!(error = %err, click_count, "Skipping DOM snapshot, page could not be serialized");
                return None;
            }
        };

        debug!(click_count, "Rapid click gesture detected");
        let record = GestureRecord {
            url: self.context.page.url(),
            dom_structure,
            user_agent: self.context.page.user_agent(),
            session_id: self.context.session_id.to_string(),
            click_count,
            timestamp: now_ms,
        };
        self.context.emit(ApiPath::DomSnapshots, &record);
        Some(record)
    }

    pub fn pending_clicks(&self) -> usize {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
