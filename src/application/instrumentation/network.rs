use async_trait::async_trait;
use std::sync::Arc;

use super::endpoint::ApiPath;
use super::host::{
    CallbackTransport, FetchTransport, HttpRequest, HttpResponse, TransportFailure, XhrHandler,
    XhrOutcome,
};
use super::ObserverContext;
use crate::domain::network_request::{HeaderMap, NetworkRecord};

/// `error` of a callback-style call that failed at the transport level.
pub const XHR_ERROR_MESSAGE: &str = "Network Error";

/// What is known about a call when it is initiated.
struct CallStart {
    method: String,
    url: String,
    request_headers: Option<HeaderMap>,
    request_body: Option<String>,
    started_at: i64,
}

impl CallStart {
    fn capture(request: &HttpRequest, started_at: i64) -> Self {
        Self {
            method: request.method.to_uppercase(),
            url: request.url.clone(),
            request_headers: non_empty(&request.headers),
            request_body: request.body.clone(),
            started_at,
        }
    }

    fn finish(self, context: &ObserverContext) -> NetworkRecord {
        let finished_at = context.now_ms();
        NetworkRecord {
            url: self.url,
            method: self.method,
            status: None,
            status_text: None,
            response_time: finished_at - self.started_at,
            request_headers: self.request_headers,
            response_headers: None,
            request_body: self.request_body,
            response_body: None,
            error: None,
            user_agent: context.page.user_agent(),
            session_id: context.session_id.to_string(),
            timestamp: finished_at,
        }
    }
}

fn non_empty(headers: &HeaderMap) -> Option<HeaderMap> {
    if headers.is_empty() {
        None
    } else {
        Some(headers.clone())
    }
}

fn fill_response(record: &mut NetworkRecord, response: &HttpResponse) {
    record.status = Some(response.status);
    record.status_text = Some(response.status_text.clone());
    record.response_headers = non_empty(&response.headers);
}

/// Decorates a promise-style client. Calls to the collection origin pass
/// straight through; every other call yields exactly one record.
pub struct InterceptedFetch<T> {
    inner: T,
    context: Arc<ObserverContext>,
}

impl<T: FetchTransport> InterceptedFetch<T> {
    pub(crate) fn new(inner: T, context: Arc<ObserverContext>) -> Self {
        Self { inner, context }
    }

    pub fn original(&self) -> &T {
        &self.inner
    }

    pub fn restore(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: FetchTransport> FetchTransport for InterceptedFetch<T> {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        if self.context.endpoint.is_collection_url(&request.url) {
            return self.inner.fetch(request).await;
        }

        let start = CallStart::capture(&request, self.context.now_ms());
        let result = self.inner.fetch(request).await;
        let mut record = start.finish(&self.context);

        match &result {
            Ok(response) => {
                // Read the body from a copy; the caller gets the response untouched.
                let observed = response.clone();
                fill_response(&mut record, &observed);
                record.response_body = Some(observed.text());
            }
            Err(failure) => {
                record.error = Some(failure.message.clone());
            }
        }

        self.context.emit(ApiPath::NetworkRequests, &record);
        result
    }
}

/// Decorates a callback-style client. The page's handler always receives
/// the outcome it would have received without the decorator.
pub struct InterceptedXhr<T> {
    inner: T,
    context: Arc<ObserverContext>,
}

impl<T: CallbackTransport> InterceptedXhr<T> {
    pub(crate) fn new(inner: T, context: Arc<ObserverContext>) -> Self {
        Self { inner, context }
    }

    pub fn original(&self) -> &T {
        &self.inner
    }

    pub fn restore(self) -> T {
        self.inner
    }
}

impl<T: CallbackTransport> CallbackTransport for InterceptedXhr<T> {
    fn send(&self, request: HttpRequest, on_complete: XhrHandler) {
        if self.context.endpoint.is_collection_url(&request.url) {
            self.inner.send(request, on_complete);
            return;
        }

        let start = CallStart::capture(&request, self.context.now_ms());
        let context = self.context.clone();
        self.inner.send(
            request,
            Box::new(move |outcome: XhrOutcome| {
                let mut record = start.finish(&context);
                match &outcome {
                    XhrOutcome::Load(response) => {
                        fill_response(&mut record, response);
                        record.response_body = Some(response.text());
                    }
                    XhrOutcome::Error {
                        status,
                        status_text,
                    } => {
                        record.status = *status;
                        record.status_text = status_text.clone();
                        record.error = Some(XHR_ERROR_MESSAGE.to_string());
                    }
                }

                on_complete(outcome);
                context.emit(ApiPath::NetworkRequests, &record);
            }),
        );
    }
}
