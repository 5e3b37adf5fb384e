//! Deterministic camera backend for tests, CI, and the CLI test pattern.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::webcam::{AcquireError, CameraBackend, CameraStream, ReadyState, RgbaFrame, StreamRequest};

/// Counters shared between a synthetic backend and its streams.
#[derive(Debug, Default)]
pub struct SyntheticCameraStats {
    acquisitions: AtomicUsize,
    live_streams: AtomicUsize,
    frames: AtomicUsize,
}

impl SyntheticCameraStats {
    /// Streams granted so far.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Streams whose tracks have not been stopped.
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    /// Frames handed out.
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

/// Synthetic camera producing a gradient test pattern.
#[derive(Debug)]
pub struct SyntheticCameraBackend {
    supported: bool,
    failure: Option<AcquireError>,
    dimensions: Option<(u32, u32)>,
    ready_state: ReadyState,
    playback_error: Option<String>,
    stats: Arc<SyntheticCameraStats>,
}

impl SyntheticCameraBackend {
    /// Creates a working 640x480 camera that is immediately ready.
    pub fn new() -> Self {
        Self {
            supported: true,
            failure: None,
            dimensions: Some((640, 480)),
            ready_state: ReadyState::HaveEnoughData,
            playback_error: None,
            stats: Arc::new(SyntheticCameraStats::default()),
        }
    }

    /// Platform without any camera API.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Every acquisition fails with `error`.
    pub fn failing_with(error: AcquireError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    /// Overrides the native dimensions reported by streams (`None` = unknown).
    pub fn with_dimensions(mut self, dimensions: Option<(u32, u32)>) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Overrides the readiness reported by streams.
    pub fn with_ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    /// Makes playback start fail with `detail`.
    pub fn with_playback_error(mut self, detail: impl Into<String>) -> Self {
        self.playback_error = Some(detail.into());
        self
    }

    /// Shared counters for leak assertions.
    pub fn stats(&self) -> Arc<SyntheticCameraStats> {
        self.stats.clone()
    }
}

impl Default for SyntheticCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticCameraBackend {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn acquire(&mut self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, AcquireError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.stats.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.stats.live_streams.fetch_add(1, Ordering::SeqCst);

        let (width, height) = self
            .dimensions
            .unwrap_or((request.ideal_width, request.ideal_height));

        Ok(Box::new(SyntheticStream {
            width,
            height,
            report_dimensions: self.dimensions.is_some(),
            ready_state: self.ready_state,
            playback_error: self.playback_error.clone(),
            stopped: false,
            stats: self.stats.clone(),
        }))
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    report_dimensions: bool,
    ready_state: ReadyState,
    playback_error: Option<String>,
    stopped: bool,
    stats: Arc<SyntheticCameraStats>,
}

impl CameraStream for SyntheticStream {
    fn start_playback(&mut self) -> Result<(), String> {
        match &self.playback_error {
            Some(detail) => Err(detail.clone()),
            None => Ok(()),
        }
    }

    fn ready_state(&self) -> ReadyState {
        if self.stopped {
            ReadyState::HaveNothing
        } else {
            self.ready_state
        }
    }

    fn native_dimensions(&self) -> Option<(u32, u32)> {
        self.report_dimensions.then_some((self.width, self.height))
    }

    fn current_frame(&mut self) -> Option<RgbaFrame> {
        if self.stopped || self.ready_state < ReadyState::HaveCurrentData {
            return None;
        }

        let sequence = self.stats.frames.fetch_add(1, Ordering::SeqCst);
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                rgba.extend_from_slice(&[
                    (x * 255 / self.width.max(1)) as u8,
                    (y * 255 / self.height.max(1)) as u8,
                    (sequence % 255) as u8,
                    255,
                ]);
            }
        }

        Some(RgbaFrame {
            width: self.width,
            height: self.height,
            rgba,
        })
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stats.live_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
