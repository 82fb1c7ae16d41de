//! Test doubles for host primitives and the reporter.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::endpoint::{ApiPath, CollectionEndpoint};
use super::host::{
    CallbackTransport, Clock, ConsoleSink, FetchTransport, HttpRequest, HttpResponse, PageContext,
    TransportFailure, XhrHandler, XhrOutcome,
};
use super::reporter::Reporter;
use super::ObserverContext;
use crate::domain::error::{AppError, Result};
use crate::domain::network_request::NetworkRecord;
use crate::domain::session::SessionId;

pub(crate) const TEST_COLLECTOR: &str = "http://localhost:3000";

pub(crate) struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub(crate) fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub(crate) fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub(crate) struct StaticPage;

impl PageContext for StaticPage {
    fn url(&self) -> String {
        "https://shop.example.com/cart".to_string()
    }

    fn user_agent(&self) -> String {
        "Mozilla/5.0 (X11; Linux x86_64) rdebug-test".to_string()
    }

    fn serialize_dom(&self) -> Result<String> {
        Ok("<html><body>cart</body></html>".to_string())
    }
}

pub(crate) struct BrokenPage;

impl PageContext for BrokenPage {
    fn url(&self) -> String {
        "about:blank".to_string()
    }

    fn user_agent(&self) -> String {
        "rdebug-test".to_string()
    }

    fn serialize_dom(&self) -> Result<String> {
        Err(AppError::Internal("document is detached".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct RecordingReporter {
    sent: Mutex<Vec<(ApiPath, JsonValue)>>,
}

impl RecordingReporter {
    pub(crate) fn payloads(&self, path: ApiPath) -> Vec<JsonValue> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(sent_path, _)| *sent_path == path)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub(crate) fn count(&self, path: ApiPath) -> usize {
        self.payloads(path).len()
    }

    pub(crate) fn network_records(&self) -> Vec<NetworkRecord> {
        self.payloads(ApiPath::NetworkRequests)
            .into_iter()
            .map(|payload| serde_json::from_value(payload).unwrap())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn send(&self, path: ApiPath, payload: JsonValue) {
        self.sent.lock().unwrap().push((path, payload));
    }
}

#[derive(Default)]
pub(crate) struct RecordingConsole {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingConsole {
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ConsoleSink for RecordingConsole {
    fn error(&self, args: &[String]) {
        self.calls.lock().unwrap().push(args.to_vec());
    }
}

/// Answers every call with the same outcome after advancing the clock by `delay_ms`.
pub(crate) struct StubFetch {
    clock: Arc<ManualClock>,
    delay_ms: i64,
    outcome: std::result::Result<HttpResponse, TransportFailure>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl StubFetch {
    pub(crate) fn responding(clock: Arc<ManualClock>, delay_ms: i64, response: HttpResponse) -> Self {
        Self::with_outcome(clock, delay_ms, Ok(response))
    }

    pub(crate) fn failing(clock: Arc<ManualClock>, delay_ms: i64, message: &str) -> Self {
        Self::with_outcome(clock, delay_ms, Err(TransportFailure::new(message)))
    }

    fn with_outcome(
        clock: Arc<ManualClock>,
        delay_ms: i64,
        outcome: std::result::Result<HttpResponse, TransportFailure>,
    ) -> Self {
        Self {
            clock,
            delay_ms,
            outcome,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchTransport for StubFetch {
    async fn fetch(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.clock.advance(self.delay_ms);
        self.outcome.clone()
    }
}

/// Holds handlers until the test settles them.
#[derive(Default)]
pub(crate) struct DeferredXhr {
    pending: Mutex<Vec<XhrHandler>>,
}

impl DeferredXhr {
    pub(crate) fn complete(&self, outcome: XhrOutcome) {
        let handlers: Vec<XhrHandler> = self.pending.lock().unwrap().drain(..).collect();
        for handler in handlers {
            handler(outcome.clone());
        }
    }
}

impl CallbackTransport for DeferredXhr {
    fn send(&self, _request: HttpRequest, on_complete: XhrHandler) {
        self.pending.lock().unwrap().push(on_complete);
    }
}

pub(crate) fn test_context(
    reporter: Arc<dyn Reporter>,
    clock: Arc<dyn Clock>,
) -> Arc<ObserverContext> {
    test_context_with_page(reporter, clock, Arc::new(StaticPage))
}

pub(crate) fn test_context_with_page(
    reporter: Arc<dyn Reporter>,
    clock: Arc<dyn Clock>,
    page: Arc<dyn PageContext>,
) -> Arc<ObserverContext> {
    Arc::new(ObserverContext {
        session_id: SessionId::generate_at(1_700_000_000_000),
        endpoint: CollectionEndpoint::parse(TEST_COLLECTOR).unwrap(),
        page,
        clock,
        reporter,
    })
}
