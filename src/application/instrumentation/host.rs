//! Host primitives the observers decorate.
//!
//! A browser exposes these as globals (`console`, `fetch`, `XMLHttpRequest`,
//! `document`); here they are injected so an observer can wrap the real
//! implementation behind the same interface and hand it back on restore.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::error::Result;
use crate::domain::network_request::HeaderMap;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Read-only view of the page the instrumentation runs in.
pub trait PageContext: Send + Sync {
    fn url(&self) -> String;
    fn user_agent(&self) -> String;
    fn serialize_dom(&self) -> Result<String>;
}

pub trait ConsoleSink: Send + Sync {
    fn error(&self, args: &[String]);

    /// The sink this one decorates. Plain sinks decorate nothing.
    fn unwrapped(&self) -> Option<Arc<dyn ConsoleSink>> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Rejection of a promise-style call: the request never produced a response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportFailure {}

/// Promise-style client (`fetch`).
#[async_trait]
pub trait FetchTransport: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportFailure>;
}

#[async_trait]
impl<T: FetchTransport + ?Sized> FetchTransport for Arc<T> {
    async fn fetch(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportFailure> {
        (**self).fetch(request).await
    }
}

/// Terminal state of a callback-style call, as delivered to page handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum XhrOutcome {
    Load(HttpResponse),
    Error {
        status: Option<u16>,
        status_text: Option<String>,
    },
}

pub type XhrHandler = Box<dyn FnOnce(XhrOutcome) + Send + 'static>;

/// Callback-style client (`XMLHttpRequest`). The handler runs once, when the call settles.
pub trait CallbackTransport: Send + Sync {
    fn send(&self, request: HttpRequest, on_complete: XhrHandler);
}

impl<T: CallbackTransport + ?Sized> CallbackTransport for Arc<T> {
    fn send(&self, request: HttpRequest, on_complete: XhrHandler) {
        (**self).send(request, on_complete)
    }
}
