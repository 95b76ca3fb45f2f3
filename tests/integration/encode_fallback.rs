// Hardware -> software fallback and output safety

use crate::common::fakes::arg_after;
use crate::common::{FakeLocator, FakeRunner, Scripted, gopro_probe_stderr};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stereoscoper::config::Config;
use stereoscoper::engine::{
    EncodeConfig, EncodeRequest, Engine, JobParams, ProbeReport, Processor, StereoError,
    encode_with_fallback, parse_probe_output,
};
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("GS010012.360");
    fs::write(&input, b"fisheye").unwrap();
    let output = dir.path().join("GS010012_sbs.mp4");
    (dir, input, output)
}

fn run_job(runner: Arc<FakeRunner>, input: &Path, output: &Path) -> Result<String, StereoError> {
    Processor::new(&FakeLocator::found("ffmpeg"))
        .unwrap()
        .with_runner(runner)
        .process(&JobParams::new(input, output, 64.0), &mut |_| {})
        .map(|report| report.config)
}

#[test]
fn test_hardware_failure_falls_back_with_same_streams_and_yaw() {
    let (_dir, input, output) = setup();
    let runner = Arc::new(FakeRunner::new(vec![
        Scripted::Stderr(gopro_probe_stderr()),
        Scripted::FailAfterWriting("Cannot load libcuda.so.1\n".to_string()),
        Scripted::encode_ok(b"software"),
    ]));

    let config = run_job(Arc::clone(&runner), &input, &output).unwrap();
    assert_eq!(config, "x264");

    let encodes = runner.encode_calls();
    assert_eq!(encodes.len(), 2);
    assert_eq!(arg_after(&encodes[0], "-c:v"), Some("h264_nvenc"));
    assert_eq!(arg_after(&encodes[1], "-c:v"), Some("libx264"));

    let first = arg_after(&encodes[0], "-filter_complex").unwrap();
    let second = arg_after(&encodes[1], "-filter_complex").unwrap();
    for graph in [first, second] {
        assert!(graph.starts_with("[0:0]format=yuvj420p[front];[0:5]format=yuvj420p[back]"));
        assert!(graph.contains("yaw=-6.4:"));
        assert!(graph.contains("yaw=6.4:"));
    }
    // Only the eye size differs between the two graphs
    assert_eq!(
        first.replace("2048:2048", "2880:2880"),
        second
    );

    assert_eq!(fs::read(&output).unwrap(), b"software");
}

#[test]
fn test_all_configurations_failed_keeps_prior_output() {
    let (dir, input, output) = setup();
    fs::write(&output, b"previous good encode").unwrap();

    let runner = Arc::new(FakeRunner::new(vec![
        Scripted::Stderr(gopro_probe_stderr()),
        Scripted::FailAfterWriting("nvenc error\n".to_string()),
        Scripted::SpawnError,
    ]));

    let err = run_job(Arc::clone(&runner), &input, &output).unwrap_err();
    match err {
        StereoError::AllConfigurationsFailed { attempts } => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].starts_with("nvenc: "));
            assert!(attempts[1].starts_with("x264: "));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(fs::read(&output).unwrap(), b"previous good encode");
    assert!(!dir.path().join("GS010012_sbs.partial.mp4").exists());
    assert!(!dir.path().join("GS010012_sbs.json").exists());
}

#[test]
fn test_single_configuration_chain_stops_after_first_failure() {
    let engine = Engine::new("ffmpeg");
    let runner = FakeRunner::new(vec![Scripted::Stderr("boom\n".to_string())]);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.mp4");
    let probe: ProbeReport = parse_probe_output(&gopro_probe_stderr());
    let request = EncodeRequest {
        input: Path::new("in.360"),
        output: &output,
        probe: &probe,
        yaw: 6.4,
    };

    let result = encode_with_fallback(
        &engine,
        &runner,
        &request,
        &[EncodeConfig::nvenc()],
        &mut |_| {},
    );

    assert!(matches!(
        result,
        Err(StereoError::AllConfigurationsFailed { ref attempts }) if attempts.len() == 1
    ));
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn test_disabled_software_fallback_never_runs_x264() {
    let (_dir, input, output) = setup();
    let mut config = Config::default();
    config.defaults.disable_software_fallback = true;

    let runner = Arc::new(FakeRunner::new(vec![
        Scripted::Stderr(gopro_probe_stderr()),
        Scripted::FailAfterWriting("No NVENC capable devices found\n".to_string()),
        Scripted::encode_ok(b"software"),
    ]));
    let processor = Processor::new(&FakeLocator::found("ffmpeg"))
        .unwrap()
        .with_runner(runner.clone())
        .with_configs(config.encode_configs());

    let err = processor
        .process(&JobParams::new(&input, &output, 64.0), &mut |_| {})
        .unwrap_err();

    assert!(matches!(
        err,
        StereoError::AllConfigurationsFailed { ref attempts } if attempts.len() == 1
    ));
    let encodes = runner.encode_calls();
    assert_eq!(encodes.len(), 1);
    assert_eq!(arg_after(&encodes[0], "-c:v"), Some("h264_nvenc"));
    assert!(!output.exists());
}
