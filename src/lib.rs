//! Redmine MCP Server Library
//!
//! Exposes a Redmine instance to MCP clients as a fixed catalog of tools
//! served over stdio.
//!
//! # Architecture
//!
//! - **client**: Redmine REST client with retry and error translation
//! - **core**: configuration, error handling, the MCP server and its transport
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool definitions, validation, formatting and dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use redmine_mcp_server::client::RedmineClient;
//! use redmine_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = RedmineClient::new(&config.redmine)?;
//!     let transport = TransportService::new(config.transport.clone());
//!     transport.run(McpServer::new(config, client)).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use client::{ClientError, RedmineClient};
pub use core::{Config, Error, McpServer, Result};
