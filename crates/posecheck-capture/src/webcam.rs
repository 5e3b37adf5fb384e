//! Camera lifecycle and frame snapshot.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use posecheck_core::MediaPayload;
use tracing::{debug, info, warn};

use crate::CaptureError;

/// Preferred stream width requested from the device.
pub const PREFERRED_WIDTH: u32 = 640;
/// Preferred stream height requested from the device.
pub const PREFERRED_HEIGHT: u32 = 480;
/// JPEG quality used for captured frames (0.8 on a 0..1 scale).
pub const JPEG_QUALITY: u8 = 80;
/// Attachment name used for captured frames.
pub const WEBCAM_FRAME_NAME: &str = "webcam_frame.jpg";
/// MIME type of captured frames.
pub const WEBCAM_FRAME_MIME: &str = "image/jpeg";

/// Camera direction hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera, facing the user.
    User,
    /// Rear camera.
    Environment,
}

/// Stream acquisition request passed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    /// Ideal width hint.
    pub ideal_width: u32,
    /// Ideal height hint.
    pub ideal_height: u32,
    /// Camera direction hint.
    pub facing: FacingMode,
    /// Whether audio tracks are requested.
    pub audio: bool,
}

impl StreamRequest {
    /// Video-only, front-facing, 640x480 request.
    pub fn preferred() -> Self {
        Self {
            ideal_width: PREFERRED_WIDTH,
            ideal_height: PREFERRED_HEIGHT,
            facing: FacingMode::User,
            audio: false,
        }
    }
}

/// Failure reported by a camera backend while acquiring a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// Access refused by the user or platform policy.
    NotAllowed,
    /// No matching device.
    NotFound,
    /// Device exists but cannot be opened, usually because it is in use.
    NotReadable,
    /// Anything else, with a backend description.
    Other(String),
}

/// Decode readiness of the live preview, ordered from least to most ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// Nothing decoded.
    HaveNothing,
    /// Dimensions known, no frame yet.
    HaveMetadata,
    /// Current frame decoded.
    HaveCurrentData,
    /// Current and next frame decoded.
    HaveFutureData,
    /// Playback can continue uninterrupted.
    HaveEnoughData,
}

/// One decoded video frame in RGBA row-major layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Platform camera API.
pub trait CameraBackend: Send {
    /// Returns `false` when the platform exposes no camera API at all.
    fn is_supported(&self) -> bool;

    /// Acquires a new stream. Each call yields an independent stream.
    ///
    /// # Errors
    /// Returns [`AcquireError`] describing why no stream was granted.
    fn acquire(&mut self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, AcquireError>;
}

/// One acquired device stream bound to a live preview.
pub trait CameraStream: Send {
    /// Starts preview playback.
    ///
    /// # Errors
    /// Returns a description when playback cannot start.
    fn start_playback(&mut self) -> Result<(), String>;

    /// Current decode readiness.
    fn ready_state(&self) -> ReadyState;

    /// Native frame dimensions, when known.
    fn native_dimensions(&self) -> Option<(u32, u32)>;

    /// Returns the frame currently shown by the preview.
    fn current_frame(&mut self) -> Option<RgbaFrame>;

    /// Stops every track. A stopped stream is never used again.
    fn stop_tracks(&mut self);
}

/// Camera session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebcamState {
    /// No stream held.
    Idle,
    /// Waiting for the backend to grant a stream.
    Acquiring,
    /// Stream held and previewing.
    Live,
    /// A captured frame is being analyzed.
    CaptureInFlight,
}

// Holding this guard is holding the device; dropping it stops the tracks.
struct ActiveStream {
    stream: Box<dyn CameraStream>,
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        self.stream.stop_tracks();
    }
}

/// Owns the camera device lock for the lifetime of one live stream.
pub struct WebcamCaptureSession {
    backend: Box<dyn CameraBackend>,
    state: WebcamState,
    active: Option<ActiveStream>,
}

impl WebcamCaptureSession {
    /// Creates an idle session over `backend`.
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend,
            state: WebcamState::Idle,
            active: None,
        }
    }

    /// Returns current state.
    pub fn state(&self) -> WebcamState {
        self.state
    }

    /// Returns `true` while a stream is held.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Acquires the camera and starts the live preview.
    ///
    /// Calling `start` while a stream is already held is a no-op. Playback
    /// failures are logged and do not fail the call.
    ///
    /// # Errors
    /// Returns a device-family [`CaptureError`]; the session is back in
    /// [`WebcamState::Idle`] afterwards.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.active.is_some() {
            debug!(stage = "webcam", action = "start_ignored", "stream already active");
            return Ok(());
        }

        self.state = WebcamState::Acquiring;

        if !self.backend.is_supported() {
            self.state = WebcamState::Idle;
            warn!(stage = "webcam", action = "start_failed", "camera api unsupported");
            return Err(CaptureError::DeviceUnsupported);
        }

        let request = StreamRequest::preferred();
        let stream = match self.backend.acquire(&request) {
            Ok(stream) => stream,
            Err(error) => {
                self.state = WebcamState::Idle;
                warn!(stage = "webcam", action = "start_failed", cause = ?error);
                return Err(error.into());
            }
        };

        let mut active = ActiveStream { stream };
        if let Err(detail) = active.stream.start_playback() {
            warn!(stage = "webcam", action = "playback_failed", detail = %detail);
        }

        self.active = Some(active);
        self.state = WebcamState::Live;
        info!(
            stage = "webcam",
            action = "started",
            width = request.ideal_width,
            height = request.ideal_height,
        );
        Ok(())
    }

    /// Releases the stream and returns to [`WebcamState::Idle`].
    ///
    /// Idempotent; returns `true` when a stream was actually released.
    pub fn stop(&mut self) -> bool {
        let released = self.active.take().is_some();
        self.state = WebcamState::Idle;
        if released {
            info!(stage = "webcam", action = "stopped", "camera tracks released");
        }
        released
    }

    /// Snapshots the current preview frame as a JPEG payload.
    ///
    /// The frame is drawn into a raster of the stream's native size (640x480
    /// when unknown). On success the session moves to
    /// [`WebcamState::CaptureInFlight`] until [`Self::settle_capture`].
    ///
    /// # Errors
    /// [`CaptureError::NotLive`] or [`CaptureError::CaptureInFlight`] outside
    /// `Live`, [`CaptureError::NotReady`] before a frame is decoded, and
    /// [`CaptureError::EmptyFrame`]/[`CaptureError::Encode`] on encoder failure.
    pub fn capture_frame(&mut self) -> Result<MediaPayload, CaptureError> {
        match self.state {
            WebcamState::Live => {}
            WebcamState::CaptureInFlight => return Err(CaptureError::CaptureInFlight),
            WebcamState::Idle | WebcamState::Acquiring => return Err(CaptureError::NotLive),
        }

        let active = self.active.as_mut().ok_or(CaptureError::NotLive)?;
        if active.stream.ready_state() < ReadyState::HaveCurrentData {
            return Err(CaptureError::NotReady);
        }

        let (width, height) = active
            .stream
            .native_dimensions()
            .filter(|(width, height)| *width > 0 && *height > 0)
            .unwrap_or((PREFERRED_WIDTH, PREFERRED_HEIGHT));
        let frame = active.stream.current_frame().ok_or(CaptureError::NotReady)?;

        let jpeg = encode_frame(frame, width, height)?;
        self.state = WebcamState::CaptureInFlight;
        debug!(stage = "webcam", action = "frame_captured", width, height, size = jpeg.len());

        Ok(MediaPayload::new(WEBCAM_FRAME_NAME, WEBCAM_FRAME_MIME, jpeg))
    }

    /// Returns from [`WebcamState::CaptureInFlight`] to [`WebcamState::Live`].
    pub fn settle_capture(&mut self) {
        if self.state == WebcamState::CaptureInFlight {
            self.state = WebcamState::Live;
        }
    }
}

impl Drop for WebcamCaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Draws `frame` into a `width` x `height` raster and encodes it as JPEG.
///
/// # Errors
/// Returns [`CaptureError::Encode`] when the frame buffer does not match its
/// declared geometry or the encoder fails, and [`CaptureError::EmptyFrame`]
/// when encoding yields no bytes.
pub fn encode_frame(frame: RgbaFrame, width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    let source = RgbaImage::from_raw(frame.width, frame.height, frame.rgba).ok_or_else(|| {
        CaptureError::Encode(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        ))
    })?;

    let raster = if source.width() == width && source.height() == height {
        source
    } else {
        image::imageops::resize(&source, width, height, FilterType::Triangle)
    };
    let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();

    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(rgb.as_raw(), width, height, image::ColorType::Rgb8.into())
        .map_err(|error| CaptureError::Encode(error.to_string()))?;

    if jpeg.is_empty() {
        return Err(CaptureError::EmptyFrame);
    }
    Ok(jpeg)
}
