use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use stereoscoper::config::Config;
use stereoscoper::engine::{self, JobParams, Processor, format_eta};
use stereoscoper::logging::{self, LogOptions, LogSink};
use stereoscoper::ui;

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        eprintln!("Using built-in defaults.");
        Config::default()
    })
}

fn init_logging(options: LogOptions) {
    if let Err(e) = logging::init(options) {
        eprintln!("Warning: {:#}", e);
    }
}

/// Locate the engine and apply the configured fallback policy
fn build_processor(config: &Config) -> Result<Processor> {
    let locator = config.engine_locator();
    Ok(Processor::new(locator.as_ref())?.with_configs(config.encode_configs()))
}

pub fn run(cli: Cli) {
    match cli.command {
        // Before load_config, which would create the file itself
        Some(Commands::InitConfig) => handle_init_config(),
        Some(Commands::CheckFfmpeg) => {
            let config = load_config();
            init_logging(console_and_file(&config));
            handle_check_ffmpeg(&config);
        }
        Some(Commands::Probe { file }) => {
            let config = load_config();
            init_logging(console_and_file(&config));
            handle_probe(&config, &file);
        }
        None => {
            let config = load_config();
            init_logging(console_and_file(&config));

            // clap guarantees both paths when no subcommand is given
            let (Some(input), Some(output)) = (cli.input_path, cli.output_path) else {
                eprintln!("Error: --input_path and --output_path are required");
                process::exit(2);
            };
            let params = JobParams::new(input, output, cli.ipd.unwrap_or(config.defaults.ipd_mm));

            if cli.dry_run {
                handle_dry_run(&config, &params);
            } else {
                handle_process(&config, &params);
            }
        }
    }
}

fn console_and_file(config: &Config) -> LogOptions {
    LogOptions {
        file: Some(config.logging.file.clone()),
        console: true,
        sink: None,
    }
}

/// No arguments: open the form
pub fn run_interactive() {
    let config = load_config();

    let (sink, log_rx) = LogSink::channel();
    init_logging(LogOptions {
        file: Some(config.logging.file.clone()),
        console: false,
        sink: Some(sink),
    });

    // Engine lookup happens before the terminal is taken over
    let processor = match build_processor(&config) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = ui::run_ui(processor, &config, log_rx) {
        eprintln!("Error running UI: {}", e);
        process::exit(1);
    }
}

fn handle_process(config: &Config, params: &JobParams) {
    let result = build_processor(config).and_then(|processor| {
        let mut on_progress = |p: engine::EncodeProgress| {
            print!(
                "\rProgress: {:5.1}% | Frame {} | FPS {} | Speed {} | ETA {}   ",
                p.progress_pct,
                p.frame,
                p.fps.map(|f| format!("{:.1}", f)).unwrap_or_else(|| "-".to_string()),
                p.speed.map(|s| format!("{:.2}x", s)).unwrap_or_else(|| "-".to_string()),
                format_eta(p.eta_seconds)
            );
            let _ = io::stdout().flush();
        };
        let report = processor.process(params, &mut on_progress)?;
        println!();
        Ok(report)
    });

    match result {
        Ok(report) => {
            println!("Output video: {}", report.output_path.display());
            println!("Metadata: {}", report.sidecar_path.display());
            println!(
                "Encoder: {} ({:.2} minutes)",
                report.config,
                report.elapsed.as_secs_f64() / 60.0
            );
        }
        Err(e) => {
            println!();
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_dry_run(config: &Config, params: &JobParams) {
    let result = build_processor(config)
        .and_then(|processor| processor.dry_run(params).context("Dry run failed"));

    match result {
        Ok(commands) => {
            println!(
                "Dry run: {} encode command(s), tried in order",
                commands.len()
            );
            for cmd in &commands {
                println!("{}", engine::format_command(cmd));
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_check_ffmpeg(config: &Config) {
    let engine = match build_processor(config) {
        Ok(processor) => processor.engine().clone(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    println!("ffmpeg found: {}", engine.path().display());
    match engine.version() {
        Ok(version) => println!("{}", version),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_probe(config: &Config, file: &Path) {
    let processor = match build_processor(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if !file.is_file() {
        eprintln!("Error: {:#}", engine::StereoError::InputNotFound(file.to_path_buf()));
        process::exit(1);
    }

    let report = processor.probe(file);
    println!(
        "Streams: front {} back {}{}",
        report.streams.front,
        report.streams.back,
        if report.streams.detected {
            ""
        } else {
            " (defaults)"
        }
    );
    match report.duration_s {
        Some(d) => println!("Duration: {:.2} seconds", d),
        None => println!("Duration: unknown"),
    }
    match report.fps {
        Some(fps) => println!("Frame rate: {:.3} fps", fps),
        None => println!("Frame rate: unknown"),
    }
    if let Some(frames) = report.total_frames() {
        println!("Frames: ~{}", frames);
    }
}

fn handle_init_config() {
    let path: Option<PathBuf> = Config::config_path().ok();
    let exists = path.as_ref().is_some_and(|p| p.exists());

    match Config::load() {
        Ok(cfg) => {
            match &path {
                Some(p) if exists => println!("Config loaded successfully from {}", p.display()),
                Some(p) => println!("Default config created at {}", p.display()),
                None => println!("Config loaded, but config path unknown"),
            }
            println!("{:#?}", cfg);
        }
        Err(e) => {
            println!("Config missing or invalid: {:#}", e);
            println!("Creating default config...");

            if let Err(err) = Config::default().save() {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            }
            match &path {
                Some(p) => println!("Default config saved to {}", p.display()),
                None => println!("Default config saved (path unknown)"),
            }
        }
    }
}
