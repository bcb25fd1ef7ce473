//! `scanbridge` - HTTP bridge for a USB fingerprint scanner.
//!
//! Starts the fingerprint API on the configured address and runs until
//! Ctrl-C. The scanner is opened lazily on the first request that needs it
//! and released once on shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use scanbridge_hardware::mock::MockScanner;
use scanbridge_hardware::{AnyScannerDriver, DeviceSession};
use scanbridge_network::{ApiRouter, DEFAULT_MAX_REQUEST_SIZE, HttpServer, HttpServerConfig};
use scanbridge_service::FingerprintService;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "SCANBRIDGE_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Maximum number of simultaneous connections
    #[arg(long, env = "SCANBRIDGE_MAX_CONNECTIONS", default_value_t = 100)]
    max_connections: usize,

    /// Maximum request size in bytes, head and body together
    #[arg(long, env = "SCANBRIDGE_MAX_REQUEST_SIZE", default_value_t = DEFAULT_MAX_REQUEST_SIZE)]
    max_request_size: usize,

    /// Scanner backend
    #[arg(long, env = "SCANBRIDGE_DRIVER", value_enum, default_value_t = Driver::Simulated)]
    driver: Driver,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "SCANBRIDGE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Driver {
    /// Simulated scanner that is always plugged in
    Simulated,
    /// Simulated scanner with nothing attached
    Absent,
}

impl Driver {
    fn build(self) -> AnyScannerDriver {
        let (scanner, _handle) = match self {
            Self::Simulated => MockScanner::new(),
            Self::Absent => MockScanner::absent(),
        };
        AnyScannerDriver::Mock(scanner)
    }
}

impl Args {
    fn server_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            bind_addr: self.bind,
            max_connections: self.max_connections,
            max_request_size: self.max_request_size,
        }
    }
}

fn initialize_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level: {log_level}"))?,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level)?;

    info!(driver = ?args.driver, "Starting scanbridge");

    let session = Arc::new(DeviceSession::new(args.driver.build()));
    let router = ApiRouter::new(FingerprintService::new(Arc::clone(&session)));

    let server = HttpServer::bind(args.server_config())
        .await
        .context("failed to start HTTP server")?;

    server
        .run(router, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Received signal, initiating graceful shutdown...");
        })
        .await?;

    session.dispose().await;
    info!("Scanner released, exiting");
    Ok(())
}
