//! STDIO transport implementation.
//!
//! Standard input/output transport for MCP. The session ends when stdin
//! closes or the process receives SIGINT/SIGTERM.

use std::time::Duration;

use rmcp::ServiceExt;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport {
    handshake_timeout: Duration,
}

impl StdioTransport {
    pub fn new(handshake_timeout_ms: u64) -> Self {
        Self {
            handshake_timeout: Duration::from_millis(handshake_timeout_ms),
        }
    }

    /// Run the STDIO transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let service = tokio::time::timeout(
            self.handshake_timeout,
            server.serve(rmcp::transport::stdio()),
        )
        .await
        .map_err(|_| TransportError::HandshakeTimeout(self.handshake_timeout.as_millis() as u64))?
        .map_err(|e| TransportError::init(e.to_string()))?;

        let token = service.cancellation_token();
        let signals = tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, closing session");
            token.cancel();
        });

        let outcome = service.waiting().await;
        signals.abort();

        if let Err(e) = tokio::io::stdout().flush().await {
            warn!("Failed to flush stdout: {}", e);
        }

        let reason = outcome.map_err(|e| TransportError::service(e.to_string()))?;
        info!("STDIO transport finished: {:?}", reason);
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
