//! Fingerprint operations over a shared device session.
//!
//! [`FingerprintService`] turns request values into response values. It
//! never fails: device errors, vendor status codes and undecodable templates
//! all come back as `success: false` with a readable message. Templates are
//! decoded before the session lock is taken, so bad input never waits behind
//! a capture.

use std::sync::Arc;

use chrono::Utc;
use scanbridge_core::{SecurityLevel, Template};
use scanbridge_hardware::{DeviceError, DeviceSession, MatchOutcome, Primitive, ScannerDriver};
use tracing::{debug, info, instrument, warn};

use crate::error::{OperationError, Result};
use crate::models::{
    CaptureRequest, CaptureResponse, CompareRequest, CompareResponse, DeviceInfo,
    DeviceInfoResponse, HealthResponse, RegisterRequest, RegisterResponse, StatusResponse,
    TestCaptureResponse, VerifyRequest, VerifyResponse,
};

/// Operation dispatcher for the fingerprint API.
///
/// Cloning is cheap; all clones share the same session.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scanbridge_hardware::DeviceSession;
/// use scanbridge_hardware::mock::MockScanner;
/// use scanbridge_service::FingerprintService;
/// use scanbridge_service::models::CaptureRequest;
///
/// #[tokio::main]
/// async fn main() {
///     let (driver, _handle) = MockScanner::new();
///     let service = FingerprintService::new(Arc::new(DeviceSession::new(driver)));
///
///     let response = service.capture(CaptureRequest::default()).await;
///     assert!(response.success);
///     assert!(response.template_encoded.is_some());
/// }
/// ```
#[derive(Debug)]
pub struct FingerprintService<D> {
    session: Arc<DeviceSession<D>>,
}

impl<D> Clone for FingerprintService<D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<D: ScannerDriver> FingerprintService<D> {
    /// Create a service dispatching to `session`.
    pub fn new(session: Arc<DeviceSession<D>>) -> Self {
        Self { session }
    }

    /// The session this service dispatches to.
    pub fn session(&self) -> &Arc<DeviceSession<D>> {
        &self.session
    }

    /// Liveness check; never touches the device.
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            success: true,
            message: "Fingerprint API is running".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Report whether a device handle is open without opening one.
    pub async fn status(&self) -> StatusResponse {
        StatusResponse {
            success: true,
            message: "Fingerprint API status".to_string(),
            device_initialized: self.session.is_initialized().await,
            timestamp: Utc::now(),
        }
    }

    /// Echo a capture request back as parsed, without touching the device.
    pub fn test_capture(&self, request: CaptureRequest) -> TestCaptureResponse {
        debug!(?request, "Test capture request received");
        TestCaptureResponse {
            success: true,
            message: "Test capture request received".to_string(),
            received_request: request,
            timestamp: Utc::now(),
        }
    }

    /// Read live device parameters.
    #[instrument(skip(self))]
    pub async fn device_info(&self) -> DeviceInfoResponse {
        match self.session.device_info().await {
            Ok(params) => {
                debug!(device_id = params.device_id, "Device information retrieved");
                DeviceInfoResponse {
                    success: true,
                    message: "Device information retrieved successfully".to_string(),
                    info: Some(DeviceInfo::from(&params)),
                }
            }
            Err(e) => {
                let error = OperationError::from(e);
                warn!(error = %error, "Device info failed");
                DeviceInfoResponse::failure(error.to_string())
            }
        }
    }

    /// Capture a fingerprint and return the image and template.
    #[instrument(
        skip(self, request),
        fields(timeout_ms = request.timeout_ms, quality_threshold = request.quality_threshold)
    )]
    pub async fn capture(&self, request: CaptureRequest) -> CaptureResponse {
        let capture = match self
            .session
            .capture_image(request.quality_threshold, request.timeout_ms)
            .await
        {
            Ok(capture) => capture,
            Err(e) => {
                let message = capture_failure_message(&e);
                warn!(error = %message, "Capture failed");
                return CaptureResponse::failure(message);
            }
        };

        info!(
            quality = capture.quality,
            elapsed_ms = capture.capture_time_ms,
            "Fingerprint captured"
        );
        CaptureResponse {
            success: true,
            message: "Fingerprint captured successfully".to_string(),
            image_encoded: Some(scanbridge_core::codec::encode(&capture.png_image)),
            quality: Some(capture.quality),
            capture_time_ms: Some(capture.capture_time_ms),
            template_encoded: Some(scanbridge_core::codec::encode(&capture.template)),
        }
    }

    /// Compare two templates.
    #[instrument(skip(self, request), fields(security_level = %request.security_level))]
    pub async fn compare(&self, request: CompareRequest) -> CompareResponse {
        let outcome = self
            .match_fields(
                ("template1", request.template1.as_deref()),
                ("template2", request.template2.as_deref()),
                &request.security_level,
            )
            .await;

        match outcome {
            Ok(MatchOutcome { matched, score }) => CompareResponse {
                success: true,
                message: if matched {
                    "Fingerprints match"
                } else {
                    "Fingerprints do not match"
                }
                .to_string(),
                matched: Some(matched),
                score: Some(score),
            },
            Err(e) => CompareResponse::failure(e.to_string()),
        }
    }

    /// Register a finger from two captures that must match each other.
    ///
    /// On success the first template is returned unchanged as the
    /// registered template; nothing is stored server-side.
    #[instrument(skip(self, request), fields(security_level = %request.security_level))]
    pub async fn register(&self, request: RegisterRequest) -> RegisterResponse {
        let outcome = self
            .match_fields(
                ("template1", request.template1.as_deref()),
                ("template2", request.template2.as_deref()),
                &request.security_level,
            )
            .await;

        match outcome {
            Ok(MatchOutcome {
                matched: true,
                score,
            }) => RegisterResponse {
                success: true,
                message: "Registration successful".to_string(),
                registered: Some(true),
                score: Some(score),
                registered_template: request.template1,
            },
            Ok(MatchOutcome {
                matched: false,
                score,
            }) => RegisterResponse {
                success: true,
                message: "Registration failed - fingerprints do not match".to_string(),
                registered: Some(false),
                score: Some(score),
                registered_template: None,
            },
            Err(e) => RegisterResponse::failure(e.to_string()),
        }
    }

    /// Verify a probe template against a registered one.
    #[instrument(skip(self, request), fields(security_level = %request.security_level))]
    pub async fn verify(&self, request: VerifyRequest) -> VerifyResponse {
        let outcome = self
            .match_fields(
                ("registeredTemplate", request.registered_template.as_deref()),
                ("verifyTemplate", request.verify_template.as_deref()),
                &request.security_level,
            )
            .await;

        match outcome {
            Ok(MatchOutcome { matched, score }) => VerifyResponse {
                success: true,
                message: if matched {
                    "Verification successful"
                } else {
                    "Verification failed"
                }
                .to_string(),
                verified: Some(matched),
                score: Some(score),
            },
            Err(e) => VerifyResponse::failure(e.to_string()),
        }
    }

    /// Decode both fields, resolve the level, and run the matcher.
    async fn match_fields(
        &self,
        (first_field, first): (&str, Option<&str>),
        (second_field, second): (&str, Option<&str>),
        security_level: &str,
    ) -> Result<MatchOutcome> {
        let result = async {
            let first = Template::from_field(first_field, first)?;
            let second = Template::from_field(second_field, second)?;
            let level = SecurityLevel::from_name(security_level);

            let outcome = self
                .session
                .match_templates(first.as_bytes(), second.as_bytes(), level)
                .await?;
            info!(matched = outcome.matched, score = outcome.score, level = %level, "Templates matched");
            Ok::<_, OperationError>(outcome)
        }
        .await;

        if let Err(e) = &result {
            if e.is_bad_input() {
                warn!(error = %e, "Rejected template input");
            } else {
                warn!(error = %e, "Match failed");
            }
        }
        result
    }
}

fn capture_failure_message(error: &DeviceError) -> String {
    match error {
        DeviceError::OperationFailed {
            primitive: Primitive::CreateTemplate,
            ..
        } => format!("Template creation failed: {error}"),
        other => OperationError::from(other.clone()).to_string(),
    }
}
