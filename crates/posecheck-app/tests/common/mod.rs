//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use posecheck_app::{ManualClock, WorkflowController};
use posecheck_capture::{
    FileCaptureSession, InMemoryPreviewHost, SelectedFile, SyntheticCameraBackend,
    WebcamCaptureSession,
};
use posecheck_client::{
    AnalysisClient, AnalysisRequest, AnalysisTransport, TransportError, TransportResponse,
};
use posecheck_core::MediaPolicy;

/// Transport replaying one scripted outcome and recording every request.
#[derive(Debug)]
pub struct ScriptedTransport {
    outcome: Result<TransportResponse, TransportError>,
    pub seen: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedTransport {
    #[allow(dead_code)]
    pub fn responding(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(TransportResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[allow(dead_code)]
    pub fn failing(error: TransportError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[allow(dead_code)]
    pub fn request_count(&self) -> usize {
        self.seen.lock().expect("request log lock").len()
    }
}

impl AnalysisTransport for ScriptedTransport {
    fn post(&self, request: AnalysisRequest) -> Result<TransportResponse, TransportError> {
        self.seen.lock().expect("request log lock").push(request);
        self.outcome.clone()
    }
}

/// Handles kept by tests to observe controller side effects.
#[allow(dead_code)]
pub struct Harness {
    pub controller: WorkflowController,
    pub transport: Arc<ScriptedTransport>,
    pub previews: Arc<InMemoryPreviewHost>,
    pub clock: Arc<ManualClock>,
}

/// Builds a controller over a scripted transport and the given camera.
#[allow(dead_code)]
pub fn harness_with_camera(
    transport: Arc<ScriptedTransport>,
    camera: SyntheticCameraBackend,
) -> Harness {
    let previews = Arc::new(InMemoryPreviewHost::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let client = AnalysisClient::new("http://127.0.0.1:8000/", Duration::from_millis(30_000), transport.clone());
    let controller = WorkflowController::new(
        client,
        FileCaptureSession::new(MediaPolicy::default(), previews.clone()),
        WebcamCaptureSession::new(Box::new(camera)),
        clock.clone(),
        Duration::from_millis(5_000),
    );

    Harness {
        controller,
        transport,
        previews,
        clock,
    }
}

/// Builds a controller with a working synthetic camera.
#[allow(dead_code)]
pub fn harness(transport: Arc<ScriptedTransport>) -> Harness {
    harness_with_camera(transport, SyntheticCameraBackend::new())
}

/// A JPEG-typed file of `size` bytes.
#[allow(dead_code)]
pub fn jpeg_file(name: &str, size: usize) -> SelectedFile {
    SelectedFile::new(name, "image/jpeg", vec![0xD8; size])
}
