// Input probing by reading `ffmpeg -i` diagnostics

use std::fmt;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

use super::ffmpeg_info::{CommandRunner, Engine};

/// Front lens substream used when the probe can't tell (GoPro MAX layout)
pub const DEFAULT_FRONT_STREAM: &str = "0:0";
/// Back lens substream used when the probe can't tell
pub const DEFAULT_BACK_STREAM: &str = "0:5";

const STREAM_MARKER: &str = "Stream #";
const HEVC_MARKER: &str = "Video: hevc";

/// A decodable substream, `input:index` as printed by ffmpeg
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Front and back lens streams
///
/// Detection takes the first two HEVC video streams in the order ffmpeg
/// lists them and assumes front comes first. Files that reorder or
/// interleave their lenses will get swapped eyes; nothing here can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPair {
    pub front: StreamId,
    pub back: StreamId,
    /// False when the hardcoded defaults were substituted
    pub detected: bool,
}

impl StreamPair {
    pub fn defaults() -> Self {
        Self {
            front: StreamId::new(DEFAULT_FRONT_STREAM),
            back: StreamId::new(DEFAULT_BACK_STREAM),
            detected: false,
        }
    }

    /// First two candidates, or the defaults when there are fewer than two
    pub fn from_candidates(candidates: Vec<StreamId>) -> Self {
        let mut iter = candidates.into_iter();
        match (iter.next(), iter.next()) {
            (Some(front), Some(back)) => Self {
                front,
                back,
                detected: true,
            },
            _ => Self::defaults(),
        }
    }
}

/// Everything learned from one probe run
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub streams: StreamPair,
    pub duration_s: Option<f64>,
    /// Frame rate of the front stream
    pub fps: Option<f64>,
}

impl Default for ProbeReport {
    fn default() -> Self {
        Self {
            streams: StreamPair::defaults(),
            duration_s: None,
            fps: None,
        }
    }
}

impl ProbeReport {
    /// Expected output frame count, when both duration and rate are known
    pub fn total_frames(&self) -> Option<u64> {
        match (self.duration_s, self.fps) {
            (Some(d), Some(f)) if d > 0.0 && f > 0.0 => Some((d * f).round() as u64),
            _ => None,
        }
    }
}

pub fn build_probe_cmd(engine: &Engine, input: &Path) -> Command {
    let mut cmd = engine.command();
    cmd.arg("-i").arg(input);
    cmd
}

/// Probe `input` for its lens streams. Never fails: any problem degrades to
/// the default stream pair.
pub fn probe_streams(engine: &Engine, runner: &dyn CommandRunner, input: &Path) -> ProbeReport {
    // No output target, so ffmpeg always exits non-zero here; only stderr matters
    let output = match runner.run(build_probe_cmd(engine, input), &mut |_| {}) {
        Ok(output) => output,
        Err(e) => {
            warn!("File probe failed: {}", e);
            warn!(
                "Falling back to default streams {} and {}",
                DEFAULT_FRONT_STREAM, DEFAULT_BACK_STREAM
            );
            return ProbeReport::default();
        }
    };

    info!("File probe result: {}", output.stderr);

    let report = parse_probe_output(&output.stderr);
    if report.streams.detected {
        info!(
            "Using front stream: {}, back stream: {}",
            report.streams.front, report.streams.back
        );
    } else {
        warn!(
            "Could not find both front and back video streams; falling back to {} and {}",
            DEFAULT_FRONT_STREAM, DEFAULT_BACK_STREAM
        );
    }
    report
}

/// Parse the whole stderr of `ffmpeg -i`
pub fn parse_probe_output(stderr: &str) -> ProbeReport {
    let video_lines: Vec<&str> = stderr.lines().filter(|l| is_video_stream_line(l)).collect();

    let candidates = video_lines
        .iter()
        .filter_map(|l| parse_stream_id(l))
        .collect::<Vec<_>>();
    let streams = StreamPair::from_candidates(candidates);

    let fps = if streams.detected {
        video_lines.first().and_then(|l| parse_stream_fps(l))
    } else {
        None
    };

    ProbeReport {
        streams,
        duration_s: parse_duration(stderr),
        fps,
    }
}

fn is_video_stream_line(line: &str) -> bool {
    line.contains(STREAM_MARKER) && line.contains(HEVC_MARKER)
}

/// `Stream #0:5[0x6](und): Video: ...` -> `0:5`
fn parse_stream_id(line: &str) -> Option<StreamId> {
    let (_, rest) = line.split_once(STREAM_MARKER)?;
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let id = id.trim_end_matches(':');

    if id.is_empty() {
        None
    } else {
        Some(StreamId::new(id))
    }
}

/// `Duration: 00:01:23.45, start: ...` -> 83.45
pub fn parse_duration(stderr: &str) -> Option<f64> {
    let line = stderr.lines().find(|l| l.contains("Duration:"))?;
    let (_, rest) = line.split_once("Duration:")?;
    let stamp = rest.split(',').next()?.trim();
    parse_timestamp(stamp)
}

fn parse_timestamp(stamp: &str) -> Option<f64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_stream_fps(line: &str) -> Option<f64> {
    line.split(',')
        .map(str::trim)
        .find_map(|field| field.strip_suffix(" fps"))
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|f| *f > 0.0)
}
