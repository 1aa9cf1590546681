//! Escape hatch for Redmine endpoints without a dedicated tool.

use async_trait::async_trait;
use reqwest::Method;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{Query, RedmineClient};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{Validate, Validator};

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CustomRequestParams {
    #[schemars(description = "HTTP method: GET, POST, PUT or DELETE")]
    pub method: String,

    #[schemars(description = "API path (e.g., \"/issues.json\")")]
    pub path: String,

    #[schemars(description = "Request body data (for POST/PUT)")]
    pub data: Option<Map<String, Value>>,

    #[schemars(description = "Query parameters (for GET)")]
    pub params: Option<Map<String, Value>>,
}

impl CustomRequestParams {
    fn http_method(&self) -> Option<Method> {
        match self.method.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    }
}

impl Validate for CustomRequestParams {
    fn validate(&self, v: &mut Validator) {
        if self.http_method().is_none() {
            v.error("method", format!("must be one of: {}", METHODS.join(", ")));
        }
        if !self.path.starts_with('/') {
            v.error("path", "must start with /");
        }
    }
}

/// Query values as sent on the wire: strings verbatim, other JSON as text.
fn query_pairs(params: Option<Map<String, Value>>) -> Query {
    params
        .into_iter()
        .flatten()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

pub struct CustomRequestTool;

#[async_trait]
impl RedmineTool for CustomRequestTool {
    const NAME: &'static str = "redmine_custom_request";
    const DESCRIPTION: &'static str = "Make a custom API request to Redmine";
    type Params = CustomRequestParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let method = params
            .http_method()
            .ok_or_else(|| ToolError::internal(format!("unsupported method {}", params.method)))?;
        let body = params.data.map(Value::Object);
        let query = query_pairs(params.params);

        let (status, body) = client
            .custom_request(method, &params.path, body, query)
            .await?;

        match body {
            Some(body) => serde_json::to_string_pretty(&body)
                .map_err(|e| ToolError::internal(format!("failed to render response: {}", e))),
            None => Ok(format!(
                "Request completed successfully (HTTP {}).",
                status
            )),
        }
    }
}
