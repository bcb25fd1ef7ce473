//! HTTP transport for the scanbridge fingerprint API.
//!
//! This crate exposes a [`FingerprintService`] over HTTP/1.1. It handles
//! connection management, request framing and routing, and leaves every
//! fingerprint decision to the service.
//!
//! # Components
//!
//! - **HttpCodec**: tokio-util codec turning bytes into [`HttpRequest`] values
//! - **ApiRouter**: path and method dispatch, JSON rendering, CORS, panic containment
//! - **HttpServer**: accept loop with a connection limit and graceful shutdown
//!
//! # Example
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
//! let service = FingerprintService::new(Arc::new(DeviceSession::new(driver)));
//!
//! let server = HttpServer::bind(HttpServerConfig {
//!     bind_addr: "127.0.0.1:8080".parse()?,
//!     ..HttpServerConfig::default()
//! })
//! .await?;
//! server.run(ApiRouter::new(service), std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`FingerprintService`]: scanbridge_service::FingerprintService

pub mod codec;
pub mod error;
pub mod http;
pub mod router;
pub mod server;

pub use codec::{DEFAULT_MAX_REQUEST_SIZE, HttpCodec};
pub use error::{HttpError, Result};
pub use http::{HttpRequest, HttpResponse};
pub use router::{ApiRouter, Route};
pub use server::{HttpServer, HttpServerConfig, SHUTDOWN_GRACE};
