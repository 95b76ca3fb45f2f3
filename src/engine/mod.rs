// Conversion engine - independent of UI

pub mod encode;
pub mod error;
pub mod ffmpeg_info;
pub mod filter_graph;
pub mod locator;
pub mod metadata;
pub mod probe;
pub mod processor;
pub mod progress;
pub mod types;
pub mod worker;

pub use encode::{
    EncodeConfig, EncodeRequest, TRAILER_ARGS, build_encode_cmd, default_configs,
    encode_with_fallback, staging_path,
};
pub use error::StereoError;
pub use ffmpeg_info::{CommandRunner, Engine, RunOutput, SystemRunner, format_command};
pub use filter_graph::{FilterGraph, yaw_offset};
pub use locator::{EngineLocator, FixedLocator, SystemLocator};
pub use metadata::{QuestMetadata, sidecar_path, write_sidecar};
pub use probe::{ProbeReport, StreamId, StreamPair, parse_probe_output, probe_streams};
pub use processor::Processor;
pub use progress::{EncodeProgress, ProgressParser, format_eta};
pub use types::{DEFAULT_IPD_MM, JobParams, JobReport, JobStatus, StereoJob, format_ipd, parse_ipd};
