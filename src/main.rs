//! MCP Server Entry Point
//!
//! Loads and validates configuration, initializes logging, builds the
//! Redmine client and serves MCP over stdio until the client disconnects or
//! the process is signalled.

use anyhow::Result;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use redmine_mcp_server::client::RedmineClient;
use redmine_mcp_server::core::{Config, Error, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration problems are fatal before any request is served.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", Error::from(e));
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!(
        "Redmine at {} using {}",
        config.redmine.url,
        config.redmine.auth.mode()
    );
    if !config.redmine.ssl_verify {
        warn!("TLS certificate verification is disabled");
    }

    if let Err(e) = serve(config).await {
        error!("{}", e);
        return Err(e.into());
    }

    info!("Server shutting down");

    Ok(())
}

/// Build the client and serve until the session ends.
async fn serve(config: Config) -> redmine_mcp_server::Result<()> {
    let client = RedmineClient::new(&config.redmine)?;

    let transport = TransportService::new(config.transport.clone());
    info!("Transport: {}", transport.config().description());

    let server = McpServer::new(config, client);
    info!("Server initialized");

    transport.run(server).await?;
    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout carries the MCP protocol.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
