// Quest sidecar metadata

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::StereoError;

/// Headset hints written next to the output as `<name>.json`.
///
/// Everything but `IPD` is fixed, so two runs with the same IPD produce
/// byte-identical files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestMetadata {
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "Stereoscopic")]
    pub stereoscopic: String,
    #[serde(rename = "ProjectionType")]
    pub projection_type: String,
    #[serde(rename = "Layout")]
    pub layout: String,
    #[serde(rename = "QuestOptimized")]
    pub quest_optimized: String,
    #[serde(rename = "InitialFov")]
    pub initial_fov: u32,
    #[serde(rename = "IPD")]
    pub ipd: f64,
}

impl QuestMetadata {
    pub fn new(ipd_mm: f64) -> Self {
        Self {
            format: "360_TB".to_string(),
            stereoscopic: "true".to_string(),
            projection_type: "equirectangular".to_string(),
            layout: "top-bottom".to_string(),
            quest_optimized: "true".to_string(),
            initial_fov: 97,
            ipd: ipd_mm,
        }
    }

    /// Pretty JSON with 4-space indentation
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// `movie.mp4` -> `movie.json`
pub fn sidecar_path(video_path: &Path) -> PathBuf {
    video_path.with_extension("json")
}

/// Write (or replace) the sidecar for `video_path`
pub fn write_sidecar(video_path: &Path, ipd_mm: f64) -> Result<PathBuf, StereoError> {
    let json_path = sidecar_path(video_path);
    let json = QuestMetadata::new(ipd_mm)
        .to_json()
        .map_err(|e| StereoError::Metadata {
            path: json_path.clone(),
            source: e.into(),
        })?;

    fs::write(&json_path, json).map_err(|source| StereoError::Metadata {
        path: json_path.clone(),
        source,
    })?;

    info!("Added metadata to {}", json_path.display());
    Ok(json_path)
}
