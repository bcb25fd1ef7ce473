//! Request routing for the fingerprint API.
//!
//! [`ApiRouter`] maps a request to one [`FingerprintService`] operation and
//! renders the result as JSON. It never fails: unknown routes, wrong
//! methods, unreadable bodies and even panicking handlers all produce a
//! response. Every response carries permissive CORS headers.
//!
//! | Method | Path |
//! |---|---|
//! | GET  | `/api/fingerprint/health` |
//! | GET  | `/api/fingerprint/status` (also `/api/fingerprint/test`) |
//! | GET  | `/api/fingerprint/device-info` |
//! | POST | `/api/fingerprint/capture` |
//! | POST | `/api/fingerprint/test-capture` |
//! | POST | `/api/fingerprint/compare` |
//! | POST | `/api/fingerprint/register` |
//! | POST | `/api/fingerprint/verify` |

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use scanbridge_hardware::ScannerDriver;
use scanbridge_service::FingerprintService;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::http::{HttpRequest, HttpResponse};

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    Status,
    DeviceInfo,
    Capture,
    TestCapture,
    Compare,
    Register,
    Verify,
}

impl Route {
    /// Resolve a request path.
    ///
    /// Matching ignores ASCII case and a trailing `/`. The query string must
    /// already be removed.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/').to_ascii_lowercase();
        let route = match path.as_str() {
            "/api/fingerprint/health" => Self::Health,
            "/api/fingerprint/status" | "/api/fingerprint/test" => Self::Status,
            "/api/fingerprint/device-info" => Self::DeviceInfo,
            "/api/fingerprint/capture" => Self::Capture,
            "/api/fingerprint/test-capture" => Self::TestCapture,
            "/api/fingerprint/compare" => Self::Compare,
            "/api/fingerprint/register" => Self::Register,
            "/api/fingerprint/verify" => Self::Verify,
            _ => return None,
        };
        Some(route)
    }

    /// The one method this route answers to.
    pub fn method(self) -> &'static str {
        match self {
            Self::Health | Self::Status | Self::DeviceInfo => "GET",
            Self::Capture
            | Self::TestCapture
            | Self::Compare
            | Self::Register
            | Self::Verify => "POST",
        }
    }
}

/// Routes HTTP requests to fingerprint operations.
#[derive(Debug)]
pub struct ApiRouter<D> {
    service: FingerprintService<D>,
}

impl<D> Clone for ApiRouter<D> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<D: ScannerDriver> ApiRouter<D> {
    /// Route requests to `service`.
    pub fn new(service: FingerprintService<D>) -> Self {
        Self { service }
    }

    /// Produce the response for one request.
    pub async fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let response = if request.method == "OPTIONS" {
            HttpResponse::empty(200)
        } else {
            guarded(self.dispatch(request)).await
        };
        with_cors(response)
    }

    async fn dispatch(&self, request: &HttpRequest) -> HttpResponse {
        let Some(route) = Route::from_path(&request.path) else {
            debug!(path = %request.path, "No route");
            return HttpResponse::error(404, "Not found");
        };
        if request.method != route.method() {
            debug!(method = %request.method, ?route, "Method not allowed");
            return HttpResponse::error(405, "Method not allowed").with_header("Allow", route.method());
        }

        match route {
            Route::Health => json(&self.service.health()),
            Route::Status => json(&self.service.status().await),
            Route::DeviceInfo => json(&self.service.device_info().await),
            Route::Capture => json(&self.service.capture(parse_body(route, &request.body)).await),
            Route::TestCapture => json(&self.service.test_capture(parse_body(route, &request.body))),
            Route::Compare => json(&self.service.compare(parse_body(route, &request.body)).await),
            Route::Register => json(&self.service.register(parse_body(route, &request.body)).await),
            Route::Verify => json(&self.service.verify(parse_body(route, &request.body)).await),
        }
    }
}

/// Deserialize a request body, falling back to the default request.
fn parse_body<T: DeserializeOwned + Default>(route: Route, body: &[u8]) -> T {
    if body.iter().all(u8::is_ascii_whitespace) {
        warn!(?route, "Empty request body, using defaults");
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!(?route, error = %e, "Malformed JSON body, using defaults");
        T::default()
    })
}

fn json<T: Serialize>(value: &T) -> HttpResponse {
    HttpResponse::json(200, value).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize response");
        HttpResponse::error(500, &e.to_string())
    })
}

pub(crate) fn with_cors(mut response: HttpResponse) -> HttpResponse {
    for (name, value) in CORS_HEADERS {
        response.headers.push((name.to_string(), value.to_string()));
    }
    response
}

/// Run a handler, turning a panic into a 500 response.
async fn guarded<F>(handler: F) -> HttpResponse
where
    F: Future<Output = HttpResponse>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(error = %message, "Request handler panicked");
            HttpResponse::error(500, &message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Internal server error".to_string()
    }
}
