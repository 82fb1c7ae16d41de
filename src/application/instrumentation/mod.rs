//! Page instrumentation: observers installed once over the host's primitives.
//!
//! Every observation becomes a flat record handed to a [`Reporter`]. Two rules
//! keep reporting from observing itself: calls to the collection origin are
//! never intercepted, and reporters log their own failures outside the
//! wrapped console.

pub mod endpoint;
pub mod exceptions;
pub mod gesture;
pub mod host;
pub mod network;
pub mod reporter;

#[cfg(test)]
pub(crate) mod testing;

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::dom_snapshot::GestureRecord;
use crate::domain::error::Result;
use crate::domain::error_log::ErrorRecord;
use crate::domain::session::SessionId;

pub use endpoint::{ApiPath, CollectionEndpoint};
pub use exceptions::{ErrorEvent, ExceptionObserver, ScriptError, WrappedConsole};
pub use gesture::{ClickWindow, GestureConfig, GestureDetector};
pub use host::{
    CallbackTransport, Clock, ConsoleSink, FetchTransport, HttpRequest, HttpResponse,
    PageContext, SystemClock, TransportFailure, XhrHandler, XhrOutcome,
};
pub use network::{InterceptedFetch, InterceptedXhr, XHR_ERROR_MESSAGE};
pub use reporter::{report, Reporter};

/// State shared by every observer of one instrumentation instance.
pub(crate) struct ObserverContext {
    pub(crate) session_id: SessionId,
    pub(crate) endpoint: CollectionEndpoint,
    pub(crate) page: Arc<dyn PageContext>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) reporter: Arc<dyn Reporter>,
}

impl ObserverContext {
    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Hands `record` to the reporter. Failures stay here.
    pub(crate) fn emit<R: Serialize>(&self, path: ApiPath, record: &R) {
        if let Err(err) = report(self.reporter.as_ref(), path, record) {
            warn!(error = %err, path = path.as_str(), "Dropping observation that could not be reported");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentationConfig {
    pub server_url: String,
    pub gesture: GestureConfig,
}

impl InstrumentationConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            gesture: GestureConfig::default(),
        }
    }
}

/// The host's real primitives, before any decoration.
pub struct HostPrimitives {
    pub page: Arc<dyn PageContext>,
    pub console: Arc<dyn ConsoleSink>,
    pub fetch: Arc<dyn FetchTransport>,
    pub xhr: Arc<dyn CallbackTransport>,
    pub clock: Arc<dyn Clock>,
}

/// Installed observers. Built once; the host drives it through the
/// event entry points and uses the wrapped primitives in place of its own.
pub struct Instrumentation {
    context: Arc<ObserverContext>,
    gestures: GestureDetector,
    exceptions: ExceptionObserver,
    console: Arc<WrappedConsole>,
    fetch: Arc<InterceptedFetch<Arc<dyn FetchTransport>>>,
    xhr: Arc<InterceptedXhr<Arc<dyn CallbackTransport>>>,
}

impl Instrumentation {
    pub fn install(
        config: &InstrumentationConfig,
        host: HostPrimitives,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let endpoint = CollectionEndpoint::parse(&config.server_url)?;
        let session_id = SessionId::generate_at(host.clock.now_ms());
        let context = Arc::new(ObserverContext {
            session_id,
            endpoint,
            page: host.page,
            clock: host.clock,
            reporter,
        });

        let exceptions = ExceptionObserver::new(context.clone());
        let console = exceptions.wrap_console(host.console);
        let gestures = GestureDetector::new(config.gesture, context.clone());
        let fetch = Arc::new(InterceptedFetch::new(host.fetch, context.clone()));
        let xhr = Arc::new(InterceptedXhr::new(host.xhr, context.clone()));

        info!(
            session_id = %context.session_id,
            collector = context.endpoint.origin(),
            "Instrumentation installed"
        );

        Ok(Self {
            context,
            gestures,
            exceptions,
            console,
            fetch,
            xhr,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.context.session_id
    }

    pub fn endpoint(&self) -> &CollectionEndpoint {
        &self.context.endpoint
    }

    pub fn on_click(&self) -> Option<GestureRecord> {
        self.gestures.on_click()
    }

    pub fn on_error_event(&self, event: &ErrorEvent) -> ErrorRecord {
        self.exceptions.on_error_event(event)
    }

    pub fn on_unhandled_rejection(&self, reason: &serde_json::Value) -> ErrorRecord {
        self.exceptions.on_unhandled_rejection(reason)
    }

    pub fn console(&self) -> Arc<dyn ConsoleSink> {
        self.console.clone()
    }

    pub fn fetch(&self) -> Arc<dyn FetchTransport> {
        self.fetch.clone()
    }

    pub fn xhr(&self) -> Arc<dyn CallbackTransport> {
        self.xhr.clone()
    }

    /// The console as it was before installation.
    pub fn original_console(&self) -> Arc<dyn ConsoleSink> {
        self.console.restore()
    }
}
