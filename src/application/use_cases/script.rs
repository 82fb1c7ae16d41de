use serde::Serialize;

use crate::application::instrumentation::{CollectionEndpoint, GestureConfig};
use crate::domain::error::{AppError, Result};

const SCRIPT_TEMPLATE: &str = include_str!("../../../resources/scripts/rdebug.js");
const CONFIG_PLACEHOLDER: &str = "__RDEBUG_CONFIG__";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptConfig<'a> {
    server_url: &'a str,
    click_window_ms: i64,
    click_threshold: usize,
}

/// Renders the browser instrumentation script for a collection origin.
pub struct ScriptUseCase {
    default_server_url: String,
    gesture: GestureConfig,
}

impl ScriptUseCase {
    pub fn new(default_server_url: impl Into<String>, gesture: GestureConfig) -> Self {
        Self {
            default_server_url: default_server_url.into(),
            gesture,
        }
    }

    pub fn render(&self, server_url: Option<&str>) -> Result<String> {
        let requested = server_url
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.default_server_url);
        let endpoint = CollectionEndpoint::parse(requested)?;

        let config = ScriptConfig {
            server_url: endpoint.origin(),
            click_window_ms: self.gesture.window_ms,
            click_threshold: self.gesture.threshold,
        };
        let literal = serde_json::to_string(&config)
            .map_err(|e| AppError::Internal(format!("Failed to encode script config: {}", e)))?
            // Keeps an inline <script> wrapper intact.
            .replace("</", "<\\/");

        Ok(SCRIPT_TEMPLATE.replacen(CONFIG_PLACEHOLDER, &literal, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::instrumentation::XHR_ERROR_MESSAGE;

    fn use_case() -> ScriptUseCase {
        ScriptUseCase::new("http://localhost:3000", GestureConfig::default())
    }

    #[test]
    fn test_template_contains_placeholder_once() {
        assert_eq!(SCRIPT_TEMPLATE.matches(CONFIG_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn test_xhr_hook_settles_on_every_terminal_event() {
        let script = use_case().render(None).unwrap();
        for event in ["'load'", "'error'", "'abort'", "'timeout'", "'loadend'"] {
            assert!(
                script.contains(&format!("xhr.addEventListener({}", event)),
                "missing {} listener",
                event
            );
        }
        assert!(script.contains("if (settled) {"));
        assert!(script.contains(&format!("error: '{}'", XHR_ERROR_MESSAGE)));
    }

    #[test]
    fn test_render_uses_default_origin() {
        let script = use_case().render(None).unwrap();
        assert!(!script.contains(CONFIG_PLACEHOLDER));
        assert!(script.contains(
            r#"{"serverUrl":"http://localhost:3000","clickWindowMs":2000,"clickThreshold":3}"#
        ));
    }

    #[test]
    fn test_render_trims_trailing_slash_of_requested_origin() {
        let script = use_case()
            .render(Some("https://collector.example.com/"))
            .unwrap();
        assert!(script.contains(r#""serverUrl":"https://collector.example.com""#));
    }

    #[test]
    fn test_render_escapes_hostile_origin() {
        let script = use_case()
            .render(Some(r#"http://evil.example.com/"</script><script>alert(1)"#))
            .unwrap();
        assert!(!script.contains("</script>"));
        assert!(script.contains(r#"\"<\/script>"#));
    }

    #[test]
    fn test_render_rejects_invalid_origin() {
        assert!(matches!(
            use_case().render(Some("javascript:alert(1)")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            use_case().render(Some("not a url")),
            Err(AppError::ValidationError(_))
        ));
    }
}
