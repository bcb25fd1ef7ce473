//! Integration tests for DeviceSession concurrency
//!
//! These tests drive one session from many Tokio tasks on a multi-threaded
//! runtime and check that the driver never sees two primitives at once.

use std::sync::Arc;
use std::time::Duration;

use scanbridge_core::SecurityLevel;
use scanbridge_hardware::mock::MockScanner;
use scanbridge_hardware::{DeviceError, DeviceSession, Primitive};
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_captures_are_serialized() {
    let (driver, handle) = MockScanner::new();
    handle.set_capture_delay(Duration::from_millis(20));
    let session = Arc::new(DeviceSession::new(driver));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let session = Arc::clone(&session);
        tasks.push(tokio::spawn(async move {
            session.capture_image(50, 10_000).await
        }));
    }

    for task in tasks {
        let capture = timeout(Duration::from_secs(5), task)
            .await
            .expect("Capture task timeout")
            .unwrap()
            .unwrap();
        assert_eq!(capture.raw_image.len(), 260 * 300);
    }

    assert_eq!(handle.call_count(Primitive::GetImage), 8);
    assert_eq!(handle.overlapping_calls(), 0);
    // Lazy initialization ran exactly once despite the race.
    assert_eq!(handle.call_count(Primitive::EnumerateDevice), 1);
    assert_eq!(handle.call_count(Primitive::OpenDevice), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_operations_are_serialized() {
    let (driver, handle) = MockScanner::new();
    handle.set_capture_delay(Duration::from_millis(10));
    let session = Arc::new(DeviceSession::new(driver));
    let template = handle.template();

    let mut tasks = Vec::new();
    for i in 0..12 {
        let session = Arc::clone(&session);
        let template = template.clone();
        tasks.push(tokio::spawn(async move {
            match i % 3 {
                0 => session.capture_image(50, 10_000).await.map(|_| ()),
                1 => session
                    .match_templates(&template, &template, SecurityLevel::Normal)
                    .await
                    .map(|outcome| assert!(outcome.matched)),
                _ => session.device_info().await.map(|_| ()),
            }
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(handle.call_count(Primitive::GetImage), 4);
    assert_eq!(handle.call_count(Primitive::MatchTemplate), 4);
    assert_eq!(handle.overlapping_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests_without_device() {
    let (driver, handle) = MockScanner::absent();
    let session = Arc::new(DeviceSession::new(driver));

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let session = Arc::clone(&session);
        tasks.push(tokio::spawn(async move { session.capture_image(50, 1000).await }));
    }

    for task in tasks {
        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, DeviceError::NoDeviceFound);
    }

    // Every request retries initialization on its own.
    assert_eq!(handle.call_count(Primitive::EnumerateDevice), 4);
    assert_eq!(handle.call_count(Primitive::GetImage), 0);
    assert_eq!(handle.overlapping_calls(), 0);
}

#[tokio::test]
async fn test_session_recovers_after_replug() {
    let (driver, handle) = MockScanner::absent();
    let session = DeviceSession::new(driver);

    assert!(session.capture_image(50, 1000).await.is_err());

    handle.plug_in(scanbridge_hardware::DeviceDescriptor::new("Simulated FDU05", 0));
    let capture = session.capture_image(50, 1000).await.unwrap();
    assert_eq!(capture.quality, 80);
    assert!(session.is_initialized().await);

    session.dispose().await;
    assert!(!handle.is_open());
}
