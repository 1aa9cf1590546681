//! Tool handler traits.
//!
//! [`RedmineTool`] is what a tool definition implements: a name, a
//! description, a typed parameter struct and an `execute` function.
//! [`ToolHandler`] is the object-safe form stored in the registry;
//! [`Handler`] bridges the two by deserializing and validating arguments
//! before calling `execute`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::error::ToolResult;
use super::validation::{Validate, parse_arguments};
use crate::client::RedmineClient;

/// A Redmine tool with typed parameters.
#[async_trait]
pub trait RedmineTool: Send + Sync + 'static {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    type Params: DeserializeOwned + JsonSchema + Validate + Send + 'static;

    /// Run the tool against validated parameters and render the result.
    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String>;
}

/// Object-safe tool interface used by the registry and dispatcher.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_schema(&self) -> Arc<JsonObject>;

    /// Parse, validate and execute.
    async fn call(&self, client: &RedmineClient, arguments: JsonObject) -> ToolResult<String>;

    /// Create a Tool model for this tool (metadata).
    fn to_tool(&self) -> Tool {
        Tool {
            name: self.name().into(),
            description: Some(self.description().into()),
            input_schema: self.input_schema(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Adapts a [`RedmineTool`] to [`ToolHandler`].
pub struct Handler<T>(PhantomData<fn() -> T>);

impl<T> Handler<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Handler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: RedmineTool> ToolHandler for Handler<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn description(&self) -> &'static str {
        T::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<T::Params>()
    }

    async fn call(&self, client: &RedmineClient, arguments: JsonObject) -> ToolResult<String> {
        let params = parse_arguments::<T::Params>(arguments)?;
        T::execute(client, params).await
    }
}
