// End-to-end pipeline runs against a scripted engine

use crate::common::fakes::arg_after;
use crate::common::{FakeLocator, FakeRunner, Scripted, gopro_probe_stderr};
use std::fs;
use std::sync::Arc;
use stereoscoper::engine::{EncodeProgress, JobParams, Processor, StereoError};
use tempfile::TempDir;

fn processor(runner: Arc<FakeRunner>) -> Processor {
    Processor::new(&FakeLocator::found("/opt/ffmpeg/bin/ffmpeg"))
        .unwrap()
        .with_runner(runner)
}

fn input_file(dir: &TempDir) -> std::path::PathBuf {
    let input = dir.path().join("GS010012.360");
    fs::write(&input, b"fisheye").unwrap();
    input
}

#[test]
fn test_two_lens_streams_default_ipd() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&dir);
    let output = dir.path().join("out").join("GS010012_sbs.mp4");

    let runner = Arc::new(FakeRunner::new(vec![
        Scripted::Stderr(gopro_probe_stderr()),
        Scripted::encode_ok(b"stereo"),
    ]));
    let processor = processor(Arc::clone(&runner));

    let mut updates: Vec<EncodeProgress> = Vec::new();
    let report = processor
        .process(&JobParams::new(&input, &output, 64.0), &mut |p| updates.push(p))
        .unwrap();

    // Probe then one encode
    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][0], "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(arg_after(&calls[0], "-i"), Some(input.to_str().unwrap()));

    let graph = arg_after(&calls[1], "-filter_complex").unwrap();
    let front = graph.find("[0:0]").unwrap();
    let back = graph.find("[0:5]").unwrap();
    assert!(front < back);
    assert!(graph.contains("yaw=-6.4:h_flip=1[left]"));
    assert!(graph.contains("yaw=6.4:h_flip=1[right]"));
    assert_eq!(arg_after(&calls[1], "-c:v"), Some("h264_nvenc"));

    // Staged then moved into place
    assert_eq!(fs::read(&output).unwrap(), b"stereo");
    assert!(!dir.path().join("out").join("GS010012_sbs.partial.mp4").exists());
    assert_eq!(report.output_path, output);
    assert_eq!(report.config, "nvenc");
    assert!(report.streams.detected);

    let sidecar = fs::read_to_string(&report.sidecar_path).unwrap();
    assert_eq!(report.sidecar_path, dir.path().join("out").join("GS010012_sbs.json"));
    assert!(sidecar.contains("\"IPD\": 64.0"));
    assert!(sidecar.contains("\"Format\": \"360_TB\""));
    assert!(sidecar.contains("\"Layout\": \"top-bottom\""));

    // 10s at 30 fps -> 300 frames
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].total_frames, Some(300));
    assert!((updates[0].progress_pct - 50.0).abs() < 1e-9);
    assert_eq!(updates[1].progress_pct, 100.0);
    assert_eq!(updates[1].config, "nvenc");
}

#[test]
fn test_missing_input_never_invokes_engine() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(vec![]));
    let processor = processor(Arc::clone(&runner));

    let params = JobParams::new(
        dir.path().join("missing.360"),
        dir.path().join("out.mp4"),
        64.0,
    );
    let err = processor.process(&params, &mut |_| {}).unwrap_err();

    assert!(matches!(err, StereoError::InputNotFound(ref p) if p.ends_with("missing.360")));
    assert!(runner.calls().is_empty());
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_directory_input_is_not_a_file() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(vec![]));
    let processor = processor(Arc::clone(&runner));

    let params = JobParams::new(dir.path(), dir.path().join("out.mp4"), 64.0);
    let err = processor.process(&params, &mut |_| {}).unwrap_err();

    assert!(matches!(err, StereoError::InputNotFound(_)));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_engine_absent_fails_construction() {
    let err = Processor::new(&FakeLocator::missing()).unwrap_err();
    assert!(matches!(err, StereoError::EngineNotFound { .. }));
}

#[test]
fn test_probe_without_lens_streams_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&dir);
    let output = dir.path().join("out.mp4");

    let runner = Arc::new(FakeRunner::new(vec![
        Scripted::Stderr("Stream #0:0: Video: h264, 1920x1080, 30 fps\n".to_string()),
        Scripted::encode_ok(b"stereo"),
    ]));
    let report = processor(Arc::clone(&runner))
        .process(&JobParams::new(&input, &output, 64.0), &mut |_| {})
        .unwrap();

    assert!(!report.streams.detected);
    let graph = arg_after(&runner.encode_calls()[0], "-filter_complex")
        .unwrap()
        .to_string();
    assert!(graph.starts_with("[0:0]format=yuvj420p[front];[0:5]format=yuvj420p[back]"));
}

#[test]
fn test_probe_spawn_error_still_encodes() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&dir);
    let output = dir.path().join("out.mp4");

    let runner = Arc::new(FakeRunner::new(vec![
        Scripted::SpawnError,
        Scripted::encode_ok(b"stereo"),
    ]));
    let report = processor(Arc::clone(&runner))
        .process(&JobParams::new(&input, &output, 64.0), &mut |_| {})
        .unwrap();

    assert_eq!(report.config, "nvenc");
    assert!(output.exists());
}

#[test]
fn test_sidecar_identical_across_runs_except_ipd() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&dir);

    let run = |name: &str, ipd: f64| {
        let runner = Arc::new(FakeRunner::new(vec![
            Scripted::Stderr(gopro_probe_stderr()),
            Scripted::encode_ok(b"stereo"),
        ]));
        let report = processor(runner)
            .process(&JobParams::new(&input, dir.path().join(name), ipd), &mut |_| {})
            .unwrap();
        fs::read_to_string(report.sidecar_path).unwrap()
    };

    let first = run("a.mp4", 64.0);
    let second = run("b.mp4", 64.0);
    let third = run("c.mp4", 58.5);

    assert_eq!(first, second);
    assert_eq!(
        first.replace("\"IPD\": 64.0", "\"IPD\": 58.5"),
        third
    );
}

#[test]
fn test_dry_run_lists_every_configuration() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&dir);
    let output = dir.path().join("out.mp4");

    let runner = Arc::new(FakeRunner::new(vec![Scripted::Stderr(gopro_probe_stderr())]));
    let commands = processor(Arc::clone(&runner))
        .dry_run(&JobParams::new(&input, &output, 64.0))
        .unwrap();

    assert_eq!(commands.len(), 2);
    // Only the probe ran
    assert_eq!(runner.calls().len(), 1);
    assert!(!output.exists());
}
