//! Helpers shared across Redmine tool definitions.

use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Query;
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::validation::{DEFAULT_LIMIT, Validate};

/// Parameters of tools that take no arguments. Extra keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

impl Validate for NoParams {}

/// Ordered query-string builder that skips absent filters.
#[derive(Debug, Default)]
pub struct QueryParams(Query);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl Display) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Boolean flag in Redmine's form: `1` when set, blank otherwise.
    pub fn flag(self, key: &str, value: Option<bool>) -> Self {
        self.opt(key, value.map(|set| if set { "1" } else { "" }))
    }

    /// `offset` and `limit` with defaults applied. Returns the offset used.
    pub fn page(self, limit: Option<i64>, offset: Option<i64>) -> (Self, u64) {
        let offset = offset.and_then(|o| u64::try_from(o).ok()).unwrap_or(0);
        let limit = limit
            .and_then(|l| u64::try_from(l).ok())
            .unwrap_or(DEFAULT_LIMIT);
        (self.push("offset", offset).push("limit", limit), offset)
    }

    pub fn build(self) -> Query {
        self.0
    }
}

/// Serialize a parameter struct into a request body.
pub fn request_body<T: Serialize>(params: &T) -> ToolResult<Value> {
    serde_json::to_value(params)
        .map_err(|e| ToolError::internal(format!("failed to encode request body: {}", e)))
}

/// `include` values with `required` appended when missing.
pub fn with_include(include: Option<Vec<String>>, required: &str) -> Vec<String> {
    let mut include = include.unwrap_or_default();
    if !include.iter().any(|i| i == required) {
        include.push(required.to_string());
    }
    include
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::Value;

    use crate::client::mock::MockTransport;
    use crate::domains::tools::error::ToolResult;
    use crate::domains::tools::handlers::{Handler, RedmineTool, ToolHandler};

    /// Call tool `T` with JSON arguments against a scripted transport.
    pub async fn call<T: RedmineTool>(
        mock: &std::sync::Arc<MockTransport>,
        arguments: Value,
    ) -> ToolResult<String> {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Default::default(),
        };
        Handler::<T>::new().call(&mock.client(), arguments).await
    }
}
