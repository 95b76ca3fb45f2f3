//! Encode configurations and the hardware -> software fallback chain.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

use super::error::StereoError;
use super::ffmpeg_info::{CommandRunner, Engine, format_command};
use super::filter_graph::{FilterGraph, OUTPUT_LABEL};
use super::probe::ProbeReport;
use super::progress::{EncodeProgress, ProgressParser};

/// Color and container flags shared by every configuration
pub const TRAILER_ARGS: &[&str] = &[
    "-pix_fmt",
    "yuv420p",
    "-color_range",
    "1",
    "-colorspace",
    "bt709",
    "-color_primaries",
    "bt709",
    "-color_trc",
    "bt709",
    "-metadata:s:v:0",
    "stereo_mode=left-right",
    "-metadata:s:v:0",
    "projection_type=equirectangular",
    "-movflags",
    "+faststart",
];

/// One complete way of encoding the stereo output
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeConfig {
    pub name: String,
    /// Square edge length of each eye
    pub eye_size: u32,
    /// Encoder and rate-control arguments
    pub output_args: Vec<String>,
}

impl EncodeConfig {
    /// NVIDIA NVENC H.264, bitrate capped at 150M, 2048px eyes
    pub fn nvenc() -> Self {
        Self {
            name: "nvenc".to_string(),
            eye_size: 2048,
            output_args: to_args(&[
                "-c:v",
                "h264_nvenc",
                "-preset",
                "p7",
                "-tune",
                "hq",
                "-b:v",
                "100M",
                "-maxrate",
                "150M",
                "-bufsize",
                "200M",
            ]),
        }
    }

    /// libx264 at CRF 23, 2880px eyes
    pub fn x264() -> Self {
        Self {
            name: "x264".to_string(),
            eye_size: 2880,
            output_args: to_args(&[
                "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p",
            ]),
        }
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Hardware first, then software
pub fn default_configs() -> Vec<EncodeConfig> {
    vec![EncodeConfig::nvenc(), EncodeConfig::x264()]
}

/// Inputs shared by every attempt of one job
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub probe: &'a ProbeReport,
    pub yaw: f64,
}

/// Temporary encode target next to the output: `clip.mp4` -> `clip.partial.mp4`.
/// The extension is kept so ffmpeg still picks the right muxer.
pub fn staging_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!("{}.partial", stem),
    };
    output.with_file_name(name)
}

/// Full encode invocation for one configuration, writing to `target`
pub fn build_encode_cmd(
    engine: &Engine,
    request: &EncodeRequest<'_>,
    config: &EncodeConfig,
    target: &Path,
) -> Command {
    let streams = &request.probe.streams;
    let graph = FilterGraph::stereo(&streams.front, &streams.back, request.yaw, config.eye_size);

    let mut cmd = engine.command();
    cmd.args(["-progress", "pipe:1", "-nostats"]);
    cmd.arg("-i").arg(request.input);
    cmd.arg("-filter_complex").arg(graph.to_arg());
    cmd.arg("-map").arg(OUTPUT_LABEL);
    cmd.args(&config.output_args);
    cmd.args(TRAILER_ARGS);
    cmd.arg("-y").arg(target);
    cmd
}

/// Try each configuration in order until one succeeds.
///
/// Each attempt encodes into a staging file; only a successful attempt is
/// moved over `request.output`, so a failed run never clobbers a previous
/// good output. Returns the configuration that worked.
pub fn encode_with_fallback(
    engine: &Engine,
    runner: &dyn CommandRunner,
    request: &EncodeRequest<'_>,
    configs: &[EncodeConfig],
    on_progress: &mut dyn FnMut(EncodeProgress),
) -> Result<EncodeConfig, StereoError> {
    let staging = staging_path(request.output);
    let total_frames = request.probe.total_frames();
    let mut attempts = Vec::new();

    for config in configs {
        let cmd = build_encode_cmd(engine, request, config, &staging);
        info!("Processing with command: {}", format_command(&cmd));

        let mut parser = ProgressParser::new();
        let mut on_line = |line: &str| {
            if parser.parse_line(line) {
                on_progress(EncodeProgress::from_parser(
                    &config.name,
                    &parser,
                    request.probe.duration_s,
                    total_frames,
                ));
            }
        };

        match runner.run(cmd, &mut on_line) {
            Ok(output) if output.success => {
                info!("Video processing successful with {} configuration", config.name);
                fs::rename(&staging, request.output).map_err(|e| {
                    remove_staging(&staging);
                    StereoError::io(
                        format!(
                            "Failed to move {} to {}",
                            staging.display(),
                            request.output.display()
                        ),
                        e,
                    )
                })?;
                return Ok(config.clone());
            }
            Ok(output) => {
                warn!(
                    "Configuration {} failed ({}): {}",
                    config.name,
                    output.status,
                    output.stderr_tail(20)
                );
                attempts.push(format!("{}: {}", config.name, output.status));
            }
            Err(e) => {
                warn!("Configuration {} could not start: {}", config.name, e);
                attempts.push(format!("{}: {}", config.name, e));
            }
        }

        remove_staging(&staging);
    }

    Err(StereoError::AllConfigurationsFailed { attempts })
}

fn remove_staging(staging: &Path) {
    if staging.exists() {
        if let Err(e) = fs::remove_file(staging) {
            warn!("Failed to remove partial output {}: {}", staging.display(), e);
        }
    }
}
