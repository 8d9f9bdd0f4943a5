use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docbridge::config::{PlatformArgs, PlatformConfig};
use docbridge::mcp;
use docbridge::platform::{Connection, HttpConnector};

#[derive(Parser)]
#[command(name = "docbridge")]
#[command(about = "MCP gateway for a project-management platform's document API")]
struct Cli {
    #[command(flatten)]
    platform: PlatformArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (default)
    Mcp,
    /// Serve MCP over streamable HTTP at /mcp
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Connect to the platform and check that it answers
    Ping {
        /// How long to wait for an answer, in milliseconds
        #[arg(long, default_value = "5000")]
        timeout_ms: u64,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "docbridge=info,tower_http=info".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn ping(connection: &Connection, timeout: Duration) -> bool {
    if let Err(e) = connection.connect().await {
        tracing::error!(error = %e, "Could not connect");
        return false;
    }
    connection.ping(timeout).await
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, None | Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = PlatformConfig::from(cli.platform);
    tracing::info!(url = %config.url, workspace = %config.workspace, "Platform configured");
    let connection = Arc::new(Connection::new(config, Arc::new(HttpConnector::new())));

    let outcome = match cli.command {
        None | Some(Commands::Mcp) => mcp::run_stdio_server(connection.clone())
            .await
            .map(|_| ExitCode::SUCCESS),
        Some(Commands::Serve { port }) => mcp::run_http_server(connection.clone(), port)
            .await
            .map(|_| ExitCode::SUCCESS),
        Some(Commands::Ping { timeout_ms }) => {
            if ping(&connection, Duration::from_millis(timeout_ms)).await {
                println!("connected");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("unreachable");
                Ok(ExitCode::FAILURE)
            }
        }
    };

    connection.disconnect().await;
    outcome
}
