//! Transport layer for the MCP server.
//!
//! The server speaks MCP over standard input/output. Log output goes to
//! stderr so stdout carries protocol frames only.
//!
//! # Feature Flags
//!
//! - `stdio` (default): STDIO transport

mod config;
mod error;
mod service;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::{DEFAULT_HANDSHAKE_TIMEOUT_MS, TransportConfig, TransportKind};
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
