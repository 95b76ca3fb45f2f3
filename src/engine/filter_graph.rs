//! Filter graph for dual-fisheye -> side-by-side stereo.
//!
//! The graph normalizes both lens streams, joins them into one full-sphere
//! equirectangular frame, re-projects a 180° field of view per eye with
//! opposite yaw, scales each eye to a square and stacks them left|right.

use super::probe::StreamId;

/// Label of the final stacked output pad, used with `-map`
pub const OUTPUT_LABEL: &str = "[out]";

/// Yaw offset in degrees for an IPD in millimeters.
///
/// `ipd / 10` is an empirical mapping for this projection, not a derived
/// one. 64mm gives ±6.4°.
pub fn yaw_offset(ipd_mm: f64) -> f64 {
    ipd_mm / 10.0
}

/// Ordered filter stages, ready to be joined with `;`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    stages: Vec<String>,
}

impl FilterGraph {
    /// Build the stereo graph.
    ///
    /// * `front`, `back` - lens streams, in that order
    /// * `yaw` - per-eye offset in degrees; left gets `-yaw`, right `+yaw`
    /// * `eye_size` - square edge length of each eye after scaling
    pub fn stereo(front: &StreamId, back: &StreamId, yaw: f64, eye_size: u32) -> Self {
        let stages = vec![
            format!("[{front}]format=yuvj420p[front]"),
            format!("[{back}]format=yuvj420p[back]"),
            "[front][back]hstack[full360]".to_string(),
            eye_projection("left", -yaw),
            eye_projection("right", yaw),
            eye_scale("left", eye_size),
            eye_scale("right", eye_size),
            format!("[left_scaled][right_scaled]hstack{OUTPUT_LABEL}"),
        ];

        Self { stages }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    /// Value for `-filter_complex`
    pub fn to_arg(&self) -> String {
        self.stages.join(";")
    }
}

fn eye_projection(eye: &str, yaw: f64) -> String {
    format!(
        "[full360]v360=input=e:output=e:d_fov=180:yaw={}:h_flip=1[{eye}]",
        format_degrees(yaw)
    )
}

fn eye_scale(eye: &str, size: u32) -> String {
    format!("[{eye}]scale={size}:{size},format=yuv420p[{eye}_scaled]")
}

/// Always keeps a fractional digit: `6.4`, `-6.4`, `6.0`
pub fn format_degrees(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
