//! HTTP server for the fingerprint API.
//!
//! Accepts TCP connections, frames each one with [`HttpCodec`], and hands
//! every request to an [`ApiRouter`]. Each connection runs in its own task,
//! so a slow capture on one connection never blocks accepting others; the
//! device session behind the router is what serializes hardware access.
//!
//! # Architecture
//!
//! ```text
//! Browser A ┐
//!           │
//! Browser B ├──> HttpServer ──> ApiRouter ──> FingerprintService ──> DeviceSession
//!           │        │
//! curl      ┘        └──> HttpCodec (request framing)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use scanbridge_hardware::DeviceSession;
//! use scanbridge_hardware::mock::MockScanner;
//! use scanbridge_network::{ApiRouter, HttpServer, HttpServerConfig};
//! use scanbridge_service::FingerprintService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (driver, _handle) = MockScanner::new();
//! let session = Arc::new(DeviceSession::new(driver));
//! let router = ApiRouter::new(FingerprintService::new(Arc::clone(&session)));
//!
//! let server = HttpServer::bind(HttpServerConfig::default()).await?;
//! server.run(router, async { tokio::signal::ctrl_c().await.ok(); }).await?;
//!
//! session.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Shutdown
//!
//! When the shutdown future resolves the listener stops accepting. Idle
//! keep-alive connections are closed at once; connections in the middle of
//! a request get [`SHUTDOWN_GRACE`] to finish before they are aborted.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use scanbridge_hardware::ScannerDriver;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};
use uuid::Uuid;

use crate::codec::{DEFAULT_MAX_REQUEST_SIZE, HttpCodec};
use crate::error::{HttpError, Result};
use crate::http::HttpResponse;
use crate::router::{ApiRouter, with_cors};

/// How long in-flight requests may run after shutdown is requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Configuration for the HTTP server
///
/// # Example
///
/// ```
/// use scanbridge_network::HttpServerConfig;
///
/// let config = HttpServerConfig {
///     bind_addr: "0.0.0.0:8080".parse().unwrap(),
///     ..HttpServerConfig::default()
/// };
/// assert_eq!(config.max_connections, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Maximum number of simultaneous connections
    pub max_connections: usize,

    /// Maximum size of one request, head and body together
    pub max_request_size: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_connections: 100,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }
}

/// HTTP/1.1 server for the fingerprint API.
#[derive(Debug)]
pub struct HttpServer {
    listener: TcpListener,
    config: HttpServerConfig,
}

impl HttpServer {
    /// Bind the server to the configured address
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::BindFailed`] if the address is in use, not
    /// local, or needs privileges the process lacks.
    pub async fn bind(config: HttpServerConfig) -> Result<Self> {
        info!("Binding HTTP server to {}", config.bind_addr);

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| HttpError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        Ok(Self { listener, config })
    }

    /// Address the listener is actually bound to.
    ///
    /// Differs from the configured address when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Only fails if the listener address cannot be read at startup.
    /// Per-connection failures are logged and never end the loop.
    pub async fn run<D, S>(self, router: ApiRouter<D>, shutdown: S) -> Result<()>
    where
        D: ScannerDriver + 'static,
        S: Future<Output = ()>,
    {
        let local_addr = self.local_addr()?;
        info!(
            "HTTP server listening on {} (max {} connections)",
            local_addr, self.config.max_connections
        );

        let limiter = Arc::new(Semaphore::new(self.config.max_connections));
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Connection task failed");
                    }
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    let Ok(permit) = Arc::clone(&limiter).try_acquire_owned() else {
                        error!(
                            peer = %peer,
                            max_connections = self.config.max_connections,
                            "Connection rejected: maximum connections reached"
                        );
                        drop(stream);
                        continue;
                    };

                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
                    }
                    debug!(peer = %peer, "Accepted connection");

                    let router = router.clone();
                    let stop = stop_rx.clone();
                    let max_request_size = self.config.max_request_size;
                    connections.spawn(async move {
                        serve_connection(stream, peer, router, max_request_size, stop).await;
                        drop(permit);
                    });
                }
            }
        }

        // Wakes idle connections; busy ones notice after their response.
        let _ = stop_tx.send(true);
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                remaining = connections.len(),
                "Connections still busy after grace period, aborting"
            );
            connections.shutdown().await;
        }

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve one connection until the peer closes, asks to close, or shutdown begins.
async fn serve_connection<D: ScannerDriver>(
    stream: TcpStream,
    peer: SocketAddr,
    router: ApiRouter<D>,
    max_request_size: usize,
    mut stop: watch::Receiver<bool>,
) {
    let mut framed = Framed::new(stream, HttpCodec::with_max_request_size(max_request_size));

    loop {
        let next = tokio::select! {
            next = framed.next() => next,
            _ = stop.changed() => {
                debug!(peer = %peer, "Closing idle connection for shutdown");
                break;
            }
        };

        let request = match next {
            None => {
                trace!(peer = %peer, "Connection closed by peer");
                break;
            }
            Some(Ok(request)) => request,
            Some(Err(HttpError::Io(e))) => {
                debug!(peer = %peer, error = %e, "Connection read failed");
                break;
            }
            Some(Err(e)) => {
                warn!(peer = %peer, error = %e, "Rejecting malformed request");
                let response = with_cors(HttpResponse::error(e.status(), &e.to_string()))
                    .with_header("Connection", "close");
                if let Err(e) = framed.send(response).await {
                    debug!(peer = %peer, error = %e, "Failed to write error response");
                }
                break;
            }
        };

        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            %request_id,
            method = %request.method,
            path = %request.path,
            peer = %peer
        );
        let keep_alive = request.keep_alive();
        let started = Instant::now();

        let mut response = router.handle(&request).instrument(span.clone()).await;
        if !keep_alive {
            response = response.with_header("Connection", "close");
        }
        span.in_scope(|| {
            info!(
                status = response.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request completed"
            );
        });

        if let Err(e) = framed.send(response).await {
            warn!(peer = %peer, error = %e, "Failed to write response");
            break;
        }
        if !keep_alive {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.max_request_size, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_server_bind_ephemeral_port() {
        let config = HttpServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..HttpServerConfig::default()
        };

        let server = HttpServer::bind(config).await.unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_server_bind_in_use() {
        let first = HttpServer::bind(HttpServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..HttpServerConfig::default()
        })
        .await
        .unwrap();
        let taken = first.local_addr().unwrap();

        let result = HttpServer::bind(HttpServerConfig {
            bind_addr: taken,
            ..HttpServerConfig::default()
        })
        .await;
        assert!(matches!(result, Err(HttpError::BindFailed { addr, .. }) if addr == taken));
    }
}
