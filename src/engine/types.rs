use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use super::filter_graph::format_degrees;
use super::probe::StreamPair;

/// Default interpupillary distance in millimeters
pub const DEFAULT_IPD_MM: f64 = 64.0;

/// What the user asked for
#[derive(Debug, Clone, PartialEq)]
pub struct JobParams {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub ipd_mm: f64,
}

impl JobParams {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, ipd_mm: f64) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ipd_mm,
        }
    }
}

/// Parse free-text IPD. Only finite numbers are accepted.
pub fn parse_ipd(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Editable IPD text: every digit kept, `64` shown as `64.0`
pub fn format_ipd(ipd_mm: f64) -> String {
    format_degrees(ipd_mm)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

/// A dispatched job as tracked by the form
#[derive(Debug, Clone)]
pub struct StereoJob {
    pub id: Uuid,
    pub params: JobParams,
    pub status: JobStatus,

    // Runtime
    pub frame: u64,
    pub total_frames: Option<u64>,
    pub fps: Option<f64>,
    pub speed: Option<f64>,
    pub progress_pct: f64,
    pub eta_seconds: Option<u64>,
    /// Configuration currently encoding
    pub config: Option<String>,
}

impl StereoJob {
    pub fn new(params: JobParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            params,
            status: JobStatus::Pending,
            frame: 0,
            total_frames: None,
            fps: None,
            speed: None,
            progress_pct: 0.0,
            eta_seconds: None,
            config: None,
        }
    }
}

/// Outcome of a successful job
#[derive(Debug, Clone)]
pub struct JobReport {
    pub output_path: PathBuf,
    pub sidecar_path: PathBuf,
    /// Name of the encode configuration that succeeded
    pub config: String,
    pub streams: StreamPair,
    pub elapsed: Duration,
}
