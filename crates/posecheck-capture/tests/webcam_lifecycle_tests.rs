//! Integration tests for the camera state machine and device ownership.

use posecheck_capture::{
    AcquireError, CaptureError, ReadyState, SyntheticCameraBackend, WEBCAM_FRAME_NAME,
    WebcamCaptureSession, WebcamState,
};

#[test]
fn webcam_lifecycle_tests_start_capture_stop() {
    let backend = SyntheticCameraBackend::new();
    let stats = backend.stats();
    let mut session = WebcamCaptureSession::new(Box::new(backend));

    session.start().expect("camera should start");
    assert_eq!(session.state(), WebcamState::Live);
    assert_eq!(stats.live_streams(), 1);

    let payload = session.capture_frame().expect("frame should capture");
    assert_eq!(payload.file_name, WEBCAM_FRAME_NAME);
    assert_eq!(payload.mime_type, "image/jpeg");
    assert!(!payload.is_empty());
    assert_eq!(session.state(), WebcamState::CaptureInFlight);

    session.settle_capture();
    assert_eq!(session.state(), WebcamState::Live);

    assert!(session.stop());
    assert_eq!(session.state(), WebcamState::Idle);
    assert_eq!(stats.live_streams(), 0);
}

#[test]
fn webcam_lifecycle_tests_stop_when_idle_is_noop() {
    let mut session = WebcamCaptureSession::new(Box::new(SyntheticCameraBackend::new()));
    assert!(!session.stop());
    assert!(!session.stop());
    assert_eq!(session.state(), WebcamState::Idle);
}

#[test]
fn webcam_lifecycle_tests_restart_acquires_fresh_stream() {
    let backend = SyntheticCameraBackend::new();
    let stats = backend.stats();
    let mut session = WebcamCaptureSession::new(Box::new(backend));

    session.start().unwrap();
    session.stop();
    session.start().unwrap();

    assert_eq!(stats.acquisitions(), 2);
    assert_eq!(stats.live_streams(), 1);
}

#[test]
fn webcam_lifecycle_tests_maps_acquisition_failures() {
    let cases = [
        (AcquireError::NotAllowed, "permission"),
        (AcquireError::NotFound, "no camera found"),
        (AcquireError::NotReadable, "another application"),
    ];
    for (cause, expected) in cases {
        let mut session = WebcamCaptureSession::new(Box::new(SyntheticCameraBackend::failing_with(cause)));
        let error = session.start().unwrap_err();
        assert!(
            error.user_message().to_lowercase().contains(expected),
            "{error}"
        );
        assert_eq!(session.state(), WebcamState::Idle);
    }

    let mut unsupported = WebcamCaptureSession::new(Box::new(SyntheticCameraBackend::unsupported()));
    assert!(matches!(unsupported.start(), Err(CaptureError::DeviceUnsupported)));
    assert_eq!(unsupported.state(), WebcamState::Idle);
}

#[test]
fn webcam_lifecycle_tests_capture_requires_decoded_frame() {
    let backend = SyntheticCameraBackend::new().with_ready_state(ReadyState::HaveMetadata);
    let mut session = WebcamCaptureSession::new(Box::new(backend));
    assert!(matches!(session.capture_frame(), Err(CaptureError::NotLive)));

    session.start().unwrap();
    assert!(matches!(session.capture_frame(), Err(CaptureError::NotReady)));
    assert_eq!(session.state(), WebcamState::Live);
}

#[test]
fn webcam_lifecycle_tests_playback_failure_is_not_fatal() {
    let backend = SyntheticCameraBackend::new().with_playback_error("autoplay blocked");
    let mut session = WebcamCaptureSession::new(Box::new(backend));
    session.start().expect("playback failure should only be logged");
    assert_eq!(session.state(), WebcamState::Live);
}

#[test]
fn webcam_lifecycle_tests_unknown_dimensions_fall_back_to_preferred() {
    let backend = SyntheticCameraBackend::new().with_dimensions(None);
    let mut session = WebcamCaptureSession::new(Box::new(backend));
    session.start().unwrap();

    let payload = session.capture_frame().unwrap();
    let decoded = image::load_from_memory(&payload.bytes).expect("payload should be a jpeg");
    assert_eq!((decoded.width(), decoded.height()), (640, 480));
}

#[test]
fn webcam_lifecycle_tests_second_capture_while_in_flight_is_rejected() {
    let mut session = WebcamCaptureSession::new(Box::new(SyntheticCameraBackend::new()));
    session.start().unwrap();
    session.capture_frame().unwrap();
    assert!(matches!(session.capture_frame(), Err(CaptureError::CaptureInFlight)));
}

#[test]
fn webcam_lifecycle_tests_teardown_releases_device() {
    let backend = SyntheticCameraBackend::new();
    let stats = backend.stats();
    {
        let mut session = WebcamCaptureSession::new(Box::new(backend));
        session.start().unwrap();
        assert_eq!(stats.live_streams(), 1);
    }
    assert_eq!(stats.live_streams(), 0);
}
