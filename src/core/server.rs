//! MCP Server implementation.
//!
//! [`McpServer`] implements rmcp's `ServerHandler`. It answers `tools/list`
//! from the tool registry and hands every `tools/call` to the
//! [`ToolDispatcher`], which always produces a tool result. Framing,
//! `initialize` and unknown methods are handled by rmcp itself.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use tracing::{info, instrument};

use super::config::Config;
use crate::client::RedmineClient;
use crate::domains::tools::{ToolDispatcher, ToolRegistry};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tool lookup and call normalization.
    dispatcher: Arc<ToolDispatcher>,
}

impl McpServer {
    /// Create a server exposing the full Redmine tool catalog.
    pub fn new(config: Config, client: RedmineClient) -> Self {
        let registry = Arc::new(ToolRegistry::with_default_tools());
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(ToolDispatcher::new(registry, client)),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// All tool descriptors in registration order.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.dispatcher.tools()
    }

    /// Call a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        self.dispatcher.dispatch(name, arguments).await
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Redmine issue tracker access: issues, projects, users, time entries, \
                 wiki pages, lookups, search and raw API requests."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.dispatcher.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        Ok(self
            .dispatcher
            .dispatch(&request.name, request.arguments)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::core::config::{AuthConfig, RedmineConfig};
    use reqwest::Method;
    use serde_json::json;
    use url::Url;

    fn test_server(mock: &Arc<MockTransport>) -> McpServer {
        let url = Url::parse("https://redmine.example.com").unwrap();
        let redmine = RedmineConfig::new(url, AuthConfig::ApiKey("secret".into()));
        McpServer::new(Config::new(redmine), mock.client())
    }

    #[test]
    fn test_info_advertises_tools_only() {
        let server = test_server(&MockTransport::new());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, server.name());
        assert_eq!(info.server_info.version, server.version());
    }

    #[test]
    fn test_lists_full_catalog() {
        let server = test_server(&MockTransport::new());
        assert_eq!(server.list_tools().len(), 26);
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/projects/demo.json",
            200,
            json!({"project": {"id": 3, "name": "Demo", "identifier": "demo", "status": 1}}),
        );
        let server = test_server(&mock);
        let arguments = json!({"id": "demo"}).as_object().cloned();

        let first = server.call_tool("redmine_get_project", arguments.clone()).await;
        let second = server.call_tool("redmine_get_project", arguments).await;
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(first.is_error, None);
    }
}
