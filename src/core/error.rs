//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type for everything that can stop the
//! server from starting or keep it from running. Per-call tool failures are
//! reported to the client as tool results instead (see
//! [`crate::domains::tools::ToolError`]).

use thiserror::Error;

use super::config::ConfigError;
use super::transport::TransportError;
use crate::client::ClientError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Redmine client could not be constructed.
    #[error("Redmine client error: {0}")]
    Client(#[from] ClientError),

    /// The MCP transport failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err: Error = ConfigError::Missing("REDMINE_URL").into();
        assert_eq!(err.to_string(), "Configuration error: REDMINE_URL is required");
    }

    #[test]
    fn test_transport_error_display() {
        let err: Error = TransportError::HandshakeTimeout(30_000).into();
        assert!(err.to_string().contains("30000 ms"));
    }

    #[test]
    fn test_client_error_display() {
        let err: Error = ClientError::RequestSetup("invalid CA bundle".into()).into();
        assert_eq!(
            err.to_string(),
            "Redmine client error: Request setup error: invalid CA bundle"
        );
    }
}
