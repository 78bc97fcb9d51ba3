//! Telemetry integration tests.
//!
//! Tests verify:
//! - One record per request, success or failure
//! - Rotation of the log through real requests
//! - Concurrent requests never interleave records

use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;
use tempfile::TempDir;

use apercus_server::telemetry::{generation, TelemetryRecord};
use apercus_server::TelemetryRecorder;

use super::test_utils::{post_download, read_telemetry, router_for, Fixture, MockImageStore};

#[tokio::test]
async fn test_one_record_per_request() {
    let fixture = Fixture::new().with_image("1", b"one");

    for body in [
        r#"{"matricules": ["1"]}"#,
        r#"{"matricules": ["2"]}"#,
        r#"{}"#,
        r#"{"matricules": ["1", "../x"]}"#,
    ] {
        post_download(fixture.router(), body).await;
    }

    // The malformed request leaves no record.
    let records = fixture.telemetry();
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .all(|r| matches!(r, TelemetryRecord::ZipGenerated { .. })));
}

#[tokio::test]
async fn test_duration_is_rounded() {
    let fixture = Fixture::new().with_image("1", b"one");
    post_download(fixture.router(), r#"{"matricules": ["1"]}"#).await;

    match &fixture.telemetry()[0] {
        TelemetryRecord::ZipGenerated {
            duration_seconds, ..
        } => {
            assert!(*duration_seconds >= 0.0);
            assert_eq!(*duration_seconds, (duration_seconds * 100.0).round() / 100.0);
        }
        other => panic!("unexpected record: {:?}", other),
    }
}

#[tokio::test]
async fn test_log_rotates_through_requests() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("download.log");
    let store = MockImageStore::new().with_image("1", Bytes::from_static(b"one"));

    // Each record is well over 100 bytes, so every write rotates.
    for _ in 0..5 {
        let recorder = TelemetryRecorder::open(&log, 100, 2).unwrap();
        let response = post_download(
            router_for(store.clone(), recorder, None),
            r#"{"matricules": ["1"]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(read_telemetry(&log).len(), 1);
    assert_eq!(read_telemetry(&generation(&log, 1)).len(), 1);
    assert_eq!(read_telemetry(&generation(&log, 2)).len(), 1);
    assert!(!generation(&log, 3).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_write_whole_records() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("download.log");
    let store = MockImageStore::new()
        .with_image("1", Bytes::from_static(b"one"))
        .with_image("2", Bytes::from_static(b"two"))
        .with_unreadable_image("3");
    let recorder = TelemetryRecorder::open(&log, 10 * 1024 * 1024, 5).unwrap();
    let router = router_for(store, recorder, None);

    let tasks: Vec<_> = (0..40)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let body = if i % 4 == 0 {
                    r#"{"matricules": ["1", "3"]}"#
                } else {
                    r#"{"matricules": ["1", "2"]}"#
                };
                post_download(router, body).await.status()
            })
        })
        .collect();

    let mut failures = 0;
    for task in tasks {
        if task.await.unwrap() == StatusCode::INTERNAL_SERVER_ERROR {
            failures += 1;
        }
    }
    assert_eq!(failures, 10);

    let records = read_telemetry(&log);
    assert_eq!(records.len(), 40);
    let errors = records
        .iter()
        .filter(|r| matches!(r, TelemetryRecord::ZipError { .. }))
        .count();
    assert_eq!(errors, 10);
}

#[tokio::test]
async fn test_recorder_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("download.log");

    let first = TelemetryRecorder::open(&log, 1024, 5).unwrap();
    first
        .record_success("1.2.3.4", 0, 22, &[], Duration::from_millis(3))
        .await
        .unwrap();
    drop(first);

    let second = TelemetryRecorder::open(&log, 1024, 5).unwrap();
    second.record_failure("1.2.3.4", "boom").await.unwrap();

    assert_eq!(read_telemetry(&log).len(), 2);
}
