//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// Default time allowed for the client to complete the MCP handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 30_000;

/// Which channel the server speaks MCP over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,
}

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport channel.
    pub kind: TransportKind,

    /// Milliseconds to wait for the client's `initialize` exchange.
    pub handshake_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(not(feature = "stdio"))]
        compile_error!("The stdio transport feature must be enabled");

        Self {
            kind: TransportKind::Stdio,
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::default()
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self.kind {
            #[cfg(feature = "stdio")]
            TransportKind::Stdio => "STDIO (standard MCP mode)".to_string(),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self.kind, TransportKind::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stdio_with_handshake_timeout() {
        let config = TransportConfig::default();
        assert!(config.is_stdio());
        assert_eq!(config.handshake_timeout_ms, 30_000);
        assert_eq!(config.description(), "STDIO (standard MCP mode)");
    }
}
