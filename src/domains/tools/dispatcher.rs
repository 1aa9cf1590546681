//! Tool call dispatch.
//!
//! Every call ends in exactly one [`CallToolResult`]: lookup failures,
//! validation errors, remote errors and handler panics all become error
//! results instead of escaping to the protocol layer.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

use super::error::{ToolError, ToolResult};
use super::registry::ToolRegistry;
use crate::client::RedmineClient;

/// Routes calls to registered tools, one at a time.
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    client: RedmineClient,
    in_flight: Mutex<()>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, client: RedmineClient) -> Self {
        Self {
            registry,
            client,
            in_flight: Mutex::new(()),
        }
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.registry.list()
    }

    /// Run the named tool and normalize its outcome.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let Some(handler) = self.registry.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return error_result(&ToolError::not_found(name));
        };

        let _guard = self.in_flight.lock().await;
        debug!("Running tool {}", name);

        let call = handler.call(&self.client, arguments.unwrap_or_default());
        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!("Tool {} panicked", name);
                Err(ToolError::internal(panic_message(panic.as_ref())))
            }
        };

        match outcome.and_then(non_empty) {
            Ok(text) => CallToolResult {
                content: vec![Content::text(text)],
                structured_content: None,
                is_error: None,
                meta: None,
            },
            Err(err) => {
                warn!("Tool {} failed: {}", name, err);
                error_result(&err)
            }
        }
    }
}

fn error_result(err: &ToolError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}

/// A handler that produced no text returned a malformed result.
fn non_empty(text: String) -> ToolResult<String> {
    if text.is_empty() {
        Err(ToolError::internal("tool returned no content"))
    } else {
        Ok(text)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("tool panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("tool panicked: {}", message)
    } else {
        "tool panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::domains::tools::definitions::common::NoParams;
    use crate::domains::tools::handlers::RedmineTool;
    use async_trait::async_trait;
    use reqwest::Method;
    use rmcp::model::RawContent;
    use serde_json::json;

    fn text_of(result: &CallToolResult) -> String {
        assert_eq!(result.content.len(), 1);
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    fn args(value: serde_json::Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    fn dispatcher(mock: &Arc<MockTransport>, registry: ToolRegistry) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(registry), mock.client())
    }

    struct PanickingTool;

    #[async_trait]
    impl RedmineTool for PanickingTool {
        const NAME: &'static str = "test_panic";
        const DESCRIPTION: &'static str = "Panics";
        type Params = NoParams;

        async fn execute(_client: &RedmineClient, _params: NoParams) -> ToolResult<String> {
            panic!("boom")
        }
    }

    struct SilentTool;

    #[async_trait]
    impl RedmineTool for SilentTool {
        const NAME: &'static str = "test_silent";
        const DESCRIPTION: &'static str = "Returns nothing";
        type Params = NoParams;

        async fn execute(_client: &RedmineClient, _params: NoParams) -> ToolResult<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let mock = MockTransport::new();
        let dispatcher = dispatcher(&mock, ToolRegistry::with_default_tools());

        let result = dispatcher.dispatch("redmine_nope", None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Unknown tool: redmine_nope");
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_success_leaves_error_flag_unset() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/users/current.json",
            200,
            json!({"user": {"id": 1, "firstname": "Test", "lastname": "User", "login": "t.user"}}),
        );
        let dispatcher = dispatcher(&mock, ToolRegistry::with_default_tools());

        let result = dispatcher.dispatch("redmine_get_current_user", None).await;
        assert_eq!(result.is_error, None);
        assert_eq!(text_of(&result), "Current User:\n\nTest User (t.user)\nID: 1");
    }

    #[tokio::test]
    async fn test_missing_required_field_is_error_result() {
        let mock = MockTransport::new();
        let dispatcher = dispatcher(&mock, ToolRegistry::with_default_tools());

        let result = dispatcher
            .dispatch("redmine_create_issue", args(json!({"subject": "Broken"})))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("Validation error:"));
        assert!(text_of(&result).contains("project_id"));
    }

    #[tokio::test]
    async fn test_delete_time_entry_result() {
        let mock = MockTransport::new();
        mock.on(Method::DELETE, "/time_entries/42.json", 204, serde_json::Value::Null);
        let dispatcher = dispatcher(&mock, ToolRegistry::with_default_tools());

        let result = dispatcher
            .dispatch("redmine_delete_time_entry", args(json!({"id": 42})))
            .await;
        assert_eq!(result.is_error, None);
        assert_eq!(text_of(&result), "Time entry #42 deleted successfully.");
    }

    #[tokio::test]
    async fn test_retry_recovers_from_single_503() {
        let mock = MockTransport::new();
        mock.on(Method::GET, "/trackers.json", 503, json!({"errors": ["busy"]}));
        mock.on(
            Method::GET,
            "/trackers.json",
            200,
            json!({"trackers": [{"id": 1, "name": "Bug"}]}),
        );
        let dispatcher = dispatcher(&mock, ToolRegistry::with_default_tools());

        let result = dispatcher.dispatch("redmine_list_trackers", None).await;
        assert_eq!(result.is_error, None);
        assert_eq!(text_of(&result), "Available Issue Trackers:\n\n- Bug (ID: 1)\n");
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_surfaces_remote_error() {
        let mock = MockTransport::new();
        mock.on(Method::GET, "/trackers.json", 503, json!({"errors": ["busy"]}));
        let dispatcher = dispatcher(&mock, ToolRegistry::with_default_tools());

        let result = dispatcher.dispatch("redmine_list_trackers", None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Redmine API error (503): busy");
        assert_eq!(mock.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let mock = MockTransport::new();
        let mut registry = ToolRegistry::new();
        registry.register::<PanickingTool>();
        let dispatcher = dispatcher(&mock, registry);

        let result = dispatcher.dispatch("test_panic", None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Internal error: tool panicked: boom");

        // The lock is released and later calls still run.
        let again = dispatcher.dispatch("test_panic", None).await;
        assert_eq!(again.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_empty_text_is_internal_error() {
        let mock = MockTransport::new();
        let mut registry = ToolRegistry::new();
        registry.register::<SilentTool>();
        let dispatcher = dispatcher(&mock, registry);

        let result = dispatcher.dispatch("test_silent", None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Internal error: tool returned no content");
    }

    #[tokio::test]
    async fn test_concurrent_calls_each_get_a_result() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/issue_statuses.json",
            200,
            json!({"issue_statuses": [{"id": 1, "name": "New"}]}),
        );
        let dispatcher = Arc::new(dispatcher(&mock, ToolRegistry::with_default_tools()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.dispatch("redmine_list_statuses", None).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(text_of(&result), "Available Issue Statuses:\n\n- New (ID: 1)\n");
        }
        assert_eq!(mock.requests().len(), 4);
    }
}
