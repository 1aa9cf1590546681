//! Tools domain module.
//!
//! Tools are the operations MCP clients can call. Each one maps to one or
//! more Redmine REST calls and renders the answer as text.
//!
//! ## Architecture
//!
//! - `definitions/` - tool implementations, one file per Redmine resource
//! - `handlers.rs` - the `RedmineTool` trait and its object-safe adapter
//! - `validation.rs` - argument parsing and field rules
//! - `format.rs` - plain-text rendering of Redmine resources
//! - `registry.rs` - name lookup and ordered listing
//! - `dispatcher.rs` - turns every call into exactly one tool result
//! - `error.rs` - tool error taxonomy
//!
//! ## Adding a New Tool
//!
//! 1. Define a params struct and a unit struct implementing `RedmineTool`
//!    in the matching file under `definitions/`
//! 2. Export it from `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::with_default_tools`

pub mod definitions;
pub mod dispatcher;
mod error;
pub mod format;
mod handlers;
mod registry;
pub mod validation;

pub use dispatcher::ToolDispatcher;
pub use error::{ToolError, ToolResult};
pub use handlers::{Handler, RedmineTool, ToolHandler};
pub use registry::ToolRegistry;
pub use validation::{IdArg, ValidationError};
