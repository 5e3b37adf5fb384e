#![warn(missing_docs)]
//! # posecheck-ui
//!
//! ## Purpose
//! Projects workflow values into display-ready text.
//!
//! ## Responsibilities
//! - Render an analysis verdict as a headline, an issue list, and an
//!   annotated image reference.
//! - Label analysis modes for selectors.
//! - Summarize the selected file.
//!
//! ## Data flow
//! [`posecheck_analysis_contract::AnalysisResult`] -> [`ResultView`] -> shell
//! output (terminal today).
//!
//! ## Ownership and lifetimes
//! Views own their strings so they can outlive the workflow state they were
//! projected from.
//!
//! ## Error model
//! Projection is total; malformed results degrade to the neutral rendering.

use std::fmt;

use posecheck_analysis_contract::{AnalysisResult, AnnotatedImage};
use posecheck_core::{AnalysisMode, MIB};

/// Headline shown for a flagged verdict.
pub const HEADLINE_FLAGGED: &str = "Issues in Posture";
/// Headline shown for a clean verdict.
pub const HEADLINE_CLEAN: &str = "Good Posture";
/// Heading above the issue list.
pub const ISSUES_HEADING: &str = "You need to improve your Posture";

/// Verdict severity used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No posture problem reported.
    Good,
    /// At least one posture problem reported.
    NeedsWork,
}

/// Display projection of one analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    /// Verdict severity.
    pub verdict: Verdict,
    /// Headline text.
    pub headline: &'static str,
    /// Issues in server order; empty hides the issues section.
    pub issues: Vec<String>,
    /// Annotated image, when the service returned one.
    pub annotated_image: Option<AnnotatedImage>,
}

impl ResultView {
    /// Projects `result` for display.
    pub fn from_result(result: &AnalysisResult) -> Self {
        let verdict = if result.flagged() {
            Verdict::NeedsWork
        } else {
            Verdict::Good
        };

        Self {
            verdict,
            headline: match verdict {
                Verdict::NeedsWork => HEADLINE_FLAGGED,
                Verdict::Good => HEADLINE_CLEAN,
            },
            issues: result.issues(),
            annotated_image: result.annotated_image().map(AnnotatedImage::parse),
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis: {}", self.headline)?;

        if !self.issues.is_empty() {
            writeln!(f, "{ISSUES_HEADING}:")?;
            for issue in &self.issues {
                writeln!(f, "  - {issue}")?;
            }
        }

        match &self.annotated_image {
            Some(AnnotatedImage::DataUri { mime_type, .. }) => {
                writeln!(f, "Pose Analysis: inline {mime_type} image")?
            }
            Some(AnnotatedImage::Url(url)) => writeln!(f, "Pose Analysis: {url}")?,
            Some(AnnotatedImage::Other(reference)) => writeln!(f, "Pose Analysis: {reference}")?,
            None => {}
        }
        Ok(())
    }
}

/// Selector label for `mode`.
pub fn mode_label(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Squat => "Squats",
        AnalysisMode::Sitting => "Sitting Pose",
    }
}

/// One-line summary of a selected file, sized in MiB with two decimals.
pub fn selected_file_summary(name: &str, size_bytes: u64) -> String {
    format!("Selected: {name} ({:.2}MB)", size_bytes as f64 / MIB as f64)
}
