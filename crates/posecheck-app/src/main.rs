#![warn(missing_docs)]
//! # posecheck binary
//!
//! Terminal entry point: submits one file (or one synthetic camera frame) to
//! the analysis service and prints the verdict.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use posecheck_analysis_contract::AnnotatedImage;
use posecheck_app::{
    AppConfig, AppError, SubmissionOutcome, SystemClock, WorkflowController, app_version,
    init_logging, parse_mode, project_status,
};
use posecheck_capture::{
    FileCaptureSession, InMemoryPreviewHost, SelectedFile, SyntheticCameraBackend,
    WebcamCaptureSession,
};
use posecheck_client::{AnalysisClient, HttpTransport};
use posecheck_ui::selected_file_summary;
use tracing::{error, info};

/// Posture analysis client.
#[derive(Debug, Parser)]
#[command(name = "posecheck", version = app_version(), about)]
struct Cli {
    /// Image or video file to analyze.
    #[arg(required_unless_present = "test_pattern")]
    file: Option<PathBuf>,

    /// Analysis mode (`squat` or `sitting`).
    #[arg(long, default_value = "squat")]
    mode: String,

    /// Analysis service base URL (overrides POSECHECK_API_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in milliseconds (overrides POSECHECK_TIMEOUT_MS).
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Submit a frame from the synthetic test-pattern camera instead of a file.
    #[arg(long, conflicts_with = "file")]
    test_pattern: bool,

    /// Write an inline annotated image from the response to this path.
    #[arg(long)]
    save_annotated: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("posecheck: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, AppError> {
    init_logging(cli.verbose)?;

    let mut config = AppConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout = Duration::from_millis(timeout_ms);
    }
    let mode = parse_mode(&cli.mode)?;

    info!(
        stage = "startup",
        action = "config",
        version = app_version(),
        base_url = %config.api_base_url,
        timeout_ms = config.request_timeout.as_millis() as u64,
    );

    let transport = HttpTransport::new()?;
    let client = AnalysisClient::new(
        config.api_base_url.clone(),
        config.request_timeout,
        Arc::new(transport),
    );
    let mut controller = WorkflowController::new(
        client,
        FileCaptureSession::new(config.media_policy(), Arc::new(InMemoryPreviewHost::new())),
        WebcamCaptureSession::new(Box::new(SyntheticCameraBackend::new())),
        Arc::new(SystemClock),
        config.error_ttl,
    );
    controller.set_mode(mode);

    let outcome = match cli.file {
        Some(path) if !cli.test_pattern => {
            let file = read_selected_file(&path)?;
            println!("{}", selected_file_summary(&file.name, file.size()));
            if controller.select_file(Some(file)).is_some() {
                controller.analyze_file()
            } else {
                SubmissionOutcome::Failed
            }
        }
        _ => {
            if controller.start_webcam() {
                controller.capture_and_analyze()
            } else {
                SubmissionOutcome::Failed
            }
        }
    };

    let status = project_status(controller.state());
    if let Some(message) = status.error {
        error!(stage = "submission", action = "failed", message = %message);
        eprintln!("{message}");
        return Ok(ExitCode::FAILURE);
    }

    let Some(view) = status.result else {
        eprintln!("no analysis result ({outcome:?})");
        return Ok(ExitCode::FAILURE);
    };
    println!("Mode: {}", status.mode);
    print!("{view}");

    if let Some(target) = cli.save_annotated {
        save_annotated(view.annotated_image.as_ref(), &target)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn read_selected_file(path: &Path) -> Result<SelectedFile, AppError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = sniff_mime_type(&bytes);
    Ok(SelectedFile::new(name, mime_type, bytes))
}

fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    match infer::get(bytes).map(|kind| kind.mime_type()) {
        Some("video/x-msvideo") => "video/avi",
        Some(mime_type) => mime_type,
        None => "application/octet-stream",
    }
}

fn save_annotated(image: Option<&AnnotatedImage>, target: &Path) -> Result<(), AppError> {
    match image {
        Some(image @ AnnotatedImage::DataUri { .. }) => {
            let bytes = image.decode_inline()?;
            std::fs::write(target, &bytes)?;
            println!("Annotated image written to {}", target.display());
        }
        Some(_) => println!("Annotated image is remote; nothing written"),
        None => println!("No annotated image in response"),
    }
    Ok(())
}
