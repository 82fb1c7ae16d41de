use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::endpoint::ApiPath;
use super::host::ConsoleSink;
use super::ObserverContext;
use crate::domain::error_log::ErrorRecord;

/// Error object attached to a page-level failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub message: String,
    pub stack: Option<String>,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Coerces a rejection reason into an error-like shape.
    pub fn from_rejection(reason: &JsonValue) -> Self {
        match reason {
            JsonValue::String(message) => Self::new(message.clone()),
            JsonValue::Object(fields) => match fields.get("message").and_then(JsonValue::as_str) {
                Some(message) => Self {
                    message: message.to_string(),
                    stack: fields
                        .get("stack")
                        .and_then(JsonValue::as_str)
                        .map(str::to_string),
                },
                None => Self::new(reason.to_string()),
            },
            other => Self::new(other.to_string()),
        }
    }
}

/// Global error event: the thrown value when there is one, the event message otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub message: String,
    pub error: Option<ScriptError>,
}

#[derive(Clone)]
pub struct ExceptionObserver {
    context: Arc<ObserverContext>,
}

impl ExceptionObserver {
    pub(crate) fn new(context: Arc<ObserverContext>) -> Self {
        Self { context }
    }

    pub fn on_error_event(&self, event: &ErrorEvent) -> ErrorRecord {
        let error = event
            .error
            .clone()
            .unwrap_or_else(|| ScriptError::new(event.message.clone()));
        self.capture(error)
    }

    pub fn on_unhandled_rejection(&self, reason: &JsonValue) -> ErrorRecord {
        self.capture(ScriptError::from_rejection(reason))
    }

    /// Decorates `console` so that `error` calls are reported. Wrapping an
    /// already wrapped console decorates its original, never the wrapper.
    pub fn wrap_console(&self, console: Arc<dyn ConsoleSink>) -> Arc<WrappedConsole> {
        let original = console.unwrapped().unwrap_or(console);
        Arc::new(WrappedConsole {
            original,
            observer: self.clone(),
        })
    }

    fn capture(&self, error: ScriptError) -> ErrorRecord {
        let record = ErrorRecord {
            url: self.context.page.url(),
            message: error.message,
            stack: error.stack,
            user_agent: self.context.page.user_agent(),
            session_id: self.context.session_id.to_string(),
            timestamp: self.context.now_ms(),
        };
        self.context.emit(ApiPath::Errors, &record);
        record
    }
}

pub struct WrappedConsole {
    original: Arc<dyn ConsoleSink>,
    observer: ExceptionObserver,
}

impl WrappedConsole {
    /// The console this wrapper replaced.
    pub fn restore(&self) -> Arc<dyn ConsoleSink> {
        self.original.clone()
    }
}

impl ConsoleSink for WrappedConsole {
    fn error(&self, args: &[String]) {
        self.original.error(args);
        self.observer.capture(ScriptError::new(args.join(" ")));
    }

    fn unwrapped(&self) -> Option<Arc<dyn ConsoleSink>> {
        Some(self.original.clone())
    }
}
