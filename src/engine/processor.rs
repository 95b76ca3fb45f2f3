//! The stereo conversion pipeline: probe, build graph, encode with
//! fallback, write sidecar.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::encode::{
    EncodeConfig, EncodeRequest, build_encode_cmd, default_configs, encode_with_fallback,
    staging_path,
};
use super::error::StereoError;
use super::ffmpeg_info::{CommandRunner, Engine, SystemRunner};
use super::filter_graph::yaw_offset;
use super::locator::EngineLocator;
use super::metadata::write_sidecar;
use super::probe::{ProbeReport, probe_streams};
use super::progress::EncodeProgress;
use super::types::{JobParams, JobReport};

/// Owns the resolved engine and runs jobs against it
pub struct Processor {
    engine: Engine,
    runner: Arc<dyn CommandRunner>,
    configs: Vec<EncodeConfig>,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("engine", &self.engine)
            .field("configs", &self.configs)
            .finish_non_exhaustive()
    }
}

impl Processor {
    /// Resolve the engine. Fails immediately when it can't be found.
    pub fn new(locator: &dyn EngineLocator) -> Result<Self, StereoError> {
        info!("Initializing stereo processor...");
        let engine = locator.locate()?;
        info!("Using FFmpeg from: {}", engine.path().display());

        Ok(Self {
            engine,
            runner: Arc::new(SystemRunner),
            configs: default_configs(),
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the fallback chain (tried in order)
    pub fn with_configs(mut self, configs: Vec<EncodeConfig>) -> Self {
        self.configs = configs;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn probe(&self, input: &Path) -> ProbeReport {
        probe_streams(&self.engine, self.runner.as_ref(), input)
    }

    /// Run one job to completion
    pub fn process(
        &self,
        params: &JobParams,
        on_progress: &mut dyn FnMut(EncodeProgress),
    ) -> Result<JobReport, StereoError> {
        let started = Instant::now();
        info!(
            "Starting video processing at: {}",
            chrono::Local::now().format("%H:%M:%S")
        );

        let result = self.process_inner(params, started, on_progress);
        if let Err(e) = &result {
            error!("Error during processing: {}", e);
        }
        result
    }

    fn process_inner(
        &self,
        params: &JobParams,
        started: Instant,
        on_progress: &mut dyn FnMut(EncodeProgress),
    ) -> Result<JobReport, StereoError> {
        let (input, output) = resolve_paths(params);
        info!("Input path: {}", input.display());
        info!("Output path: {}", output.display());

        let size = fs::metadata(&input).map_err(|_| StereoError::InputNotFound(input.clone()))?;
        if !size.is_file() {
            return Err(StereoError::InputNotFound(input));
        }
        info!(
            "Input file size: {:.2} GB",
            size.len() as f64 / (1024.0 * 1024.0 * 1024.0)
        );

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StereoError::io(
                    format!("Failed to create output directory: {}", parent.display()),
                    e,
                )
            })?;
            info!("Output directory ready: {}", parent.display());
        }

        let probe = self.probe(&input);
        let yaw = yaw_offset(params.ipd_mm);
        info!("IPD {} mm -> yaw offset ±{}°", params.ipd_mm, yaw);

        let request = EncodeRequest {
            input: &input,
            output: &output,
            probe: &probe,
            yaw,
        };
        let config = encode_with_fallback(
            &self.engine,
            self.runner.as_ref(),
            &request,
            &self.configs,
            on_progress,
        )?;

        let sidecar_path = write_sidecar(&output, params.ipd_mm)?;

        let elapsed = started.elapsed();
        info!(
            "Processing completed in {:.2} minutes",
            elapsed.as_secs_f64() / 60.0
        );

        Ok(JobReport {
            output_path: output,
            sidecar_path,
            config: config.name,
            streams: probe.streams,
            elapsed,
        })
    }

    /// Commands a job would run, without running the encode
    pub fn dry_run(&self, params: &JobParams) -> Result<Vec<Command>, StereoError> {
        let (input, output) = resolve_paths(params);
        if !input.is_file() {
            return Err(StereoError::InputNotFound(input));
        }

        let probe = self.probe(&input);
        let request = EncodeRequest {
            input: &input,
            output: &output,
            probe: &probe,
            yaw: yaw_offset(params.ipd_mm),
        };
        let staging = staging_path(&output);

        Ok(self
            .configs
            .iter()
            .map(|config| build_encode_cmd(&self.engine, &request, config, &staging))
            .collect())
    }
}

fn resolve_paths(params: &JobParams) -> (PathBuf, PathBuf) {
    let resolve = |p: &Path| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());
    (resolve(&params.input_path), resolve(&params.output_path))
}
