//! Integration tests for complete file and camera submissions.

mod common;

use posecheck_app::SubmissionOutcome;
use posecheck_capture::{AcquireError, SyntheticCameraBackend, WEBCAM_FRAME_NAME};
use posecheck_core::AnalysisMode;
use serde_json::json;

#[test]
fn workflow_end_to_end_tests_file_submission_stores_result() {
    let transport = common::ScriptedTransport::responding(200, r#"{"has_bad_posture":false,"issues":[]}"#);
    let mut h = common::harness(transport.clone());

    h.controller
        .select_file(Some(common::jpeg_file("squat.jpg", 2 * 1024 * 1024)))
        .expect("file should be accepted");
    assert_eq!(h.controller.analyze_file(), SubmissionOutcome::Completed);

    let state = h.controller.state();
    assert_eq!(
        state.result().map(|result| result.body().clone()),
        Some(json!({"has_bad_posture": false, "issues": []}))
    );
    assert!(!state.loading());
    assert!(state.error().is_none());

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen[0].payload.file_name, "squat.jpg");
    assert_eq!(seen[0].mode, AnalysisMode::Squat);
}

#[test]
fn workflow_end_to_end_tests_permission_denied_surfaces_error() {
    let transport = common::ScriptedTransport::responding(200, "{}");
    let camera = SyntheticCameraBackend::failing_with(AcquireError::NotAllowed);
    let mut h = common::harness_with_camera(transport, camera);
    h.controller.set_mode(AnalysisMode::Sitting);

    assert!(!h.controller.start_webcam());

    let state = h.controller.state();
    assert!(state.error().unwrap().to_lowercase().contains("permission"));
    assert!(!state.loading());
    assert_eq!(state.mode(), AnalysisMode::Sitting);
}

#[test]
fn workflow_end_to_end_tests_server_error_message_is_surfaced() {
    let transport = common::ScriptedTransport::responding(500, r#"{"detail":"model overloaded"}"#);
    let mut h = common::harness(transport);

    h.controller.select_file(Some(common::jpeg_file("a.jpg", 64)));
    assert_eq!(h.controller.analyze_file(), SubmissionOutcome::Failed);

    let state = h.controller.state();
    assert!(state.error().unwrap().contains("model overloaded"));
    assert!(state.result().is_none());
    assert!(!state.loading());
}

#[test]
fn workflow_end_to_end_tests_camera_frame_is_submitted_as_jpeg() {
    let transport = common::ScriptedTransport::responding(
        200,
        r#"{"has_bad_posture":true,"issues":["hunched shoulders"]}"#,
    );
    let stats_camera = SyntheticCameraBackend::new();
    let stats = stats_camera.stats();
    let mut h = common::harness_with_camera(transport.clone(), stats_camera);

    assert!(h.controller.start_webcam());
    assert!(h.controller.can_capture());
    assert_eq!(h.controller.capture_and_analyze(), SubmissionOutcome::Completed);
    assert!(h.controller.state().result().unwrap().flagged());
    assert!(h.controller.can_capture(), "camera returns to live after settle");

    {
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].payload.file_name, WEBCAM_FRAME_NAME);
        assert_eq!(seen[0].payload.mime_type, "image/jpeg");
    }

    h.controller.stop_webcam();
    assert!(h.controller.state().result().is_none());
    assert_eq!(stats.live_streams(), 0);
}

#[test]
fn workflow_end_to_end_tests_missing_file_fails_without_request() {
    let transport = common::ScriptedTransport::responding(200, "{}");
    let mut h = common::harness(transport.clone());

    assert!(!h.controller.can_analyze_file());
    assert_eq!(h.controller.analyze_file(), SubmissionOutcome::Failed);
    assert_eq!(h.controller.state().error(), Some("Please select a file first"));
    assert!(!h.controller.state().loading());
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn workflow_end_to_end_tests_invalid_selection_clears_previous_state() {
    let transport = common::ScriptedTransport::responding(200, r#"{"has_bad_posture":false}"#);
    let mut h = common::harness(transport);
    h.controller.select_file(Some(common::jpeg_file("ok.jpg", 32)));
    h.controller.analyze_file();
    assert!(h.controller.state().result().is_some());

    let rejected = h.controller.select_file(Some(posecheck_capture::SelectedFile::new(
        "notes.pdf",
        "application/pdf",
        vec![1; 32],
    )));

    assert!(rejected.is_none());
    assert!(h.controller.state().result().is_none());
    assert!(h.controller.state().error().unwrap().contains("Unsupported file type"));
    assert_eq!(h.previews.live_count(), 0);
}

#[test]
fn workflow_end_to_end_tests_dropping_controller_releases_resources() {
    let transport = common::ScriptedTransport::responding(200, "{}");
    let camera = SyntheticCameraBackend::new();
    let stats = camera.stats();
    let h = common::harness_with_camera(transport, camera);
    let previews = h.previews.clone();
    let mut controller = h.controller;

    controller.select_file(Some(common::jpeg_file("a.jpg", 8)));
    controller.start_webcam();
    assert_eq!(previews.live_count(), 1);
    assert_eq!(stats.live_streams(), 1);

    drop(controller);
    assert_eq!(previews.live_count(), 0);
    assert_eq!(stats.live_streams(), 0);
}
