use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::instrumentation::{
    ApiPath, CollectionEndpoint, FetchTransport, HttpRequest, Reporter,
};

/// Posts observations through a fetch transport without awaiting the result.
///
/// The transport may itself be an intercepted one; collector URLs bypass
/// interception, so reports never produce network records of their own.
pub struct TransportReporter<T> {
    transport: Arc<T>,
    endpoint: CollectionEndpoint,
}

impl<T: FetchTransport + 'static> TransportReporter<T> {
    pub fn new(transport: Arc<T>, endpoint: CollectionEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }
}

impl<T: FetchTransport + 'static> Reporter for TransportReporter<T> {
    fn send(&self, path: ApiPath, payload: JsonValue) {
        let url = self.endpoint.url_for(path);
        let request = HttpRequest::new("POST", url.clone())
            .with_header("Content-Type", "application/json")
            .with_body(payload.to_string());

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(url = %url, "No async runtime available, dropping report");
            return;
        };

        let transport = self.transport.clone();
        runtime.spawn(async move {
            match transport.fetch(request).await {
                Ok(response) if response.is_success() => {
                    debug!(url = %url, status = response.status, "Report delivered");
                }
                Ok(response) => {
                    warn!(url = %url, status = response.status, "Collector rejected report");
                }
                Err(failure) => {
                    warn!(url = %url, error = %failure, "Failed to send report");
                }
            }
        });
    }
}
