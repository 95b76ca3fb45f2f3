// Background worker talks to the form only through its channel

use crate::common::{FakeLocator, FakeRunner, Scripted, gopro_probe_stderr};
use std::fs;
use std::sync::Arc;
use std::sync::mpsc;
use stereoscoper::engine::worker::{WorkerMessage, spawn_job};
use stereoscoper::engine::{JobParams, Processor};
use tempfile::TempDir;
use uuid::Uuid;

fn processor(script: Vec<Scripted>) -> Arc<Processor> {
    Arc::new(
        Processor::new(&FakeLocator::found("ffmpeg"))
            .unwrap()
            .with_runner(Arc::new(FakeRunner::new(script))),
    )
}

#[test]
fn test_successful_job_message_sequence() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.360");
    fs::write(&input, b"x").unwrap();
    let output = dir.path().join("out.mp4");

    let (tx, rx) = mpsc::channel();
    let job_id = Uuid::new_v4();
    let handle = spawn_job(
        processor(vec![
            Scripted::Stderr(gopro_probe_stderr()),
            Scripted::encode_ok(b"stereo"),
        ]),
        job_id,
        JobParams::new(&input, &output, 64.0),
        tx,
    );
    handle.join().unwrap();

    let messages: Vec<WorkerMessage> = rx.try_iter().collect();
    assert!(matches!(messages.first(), Some(WorkerMessage::JobStarted { job_id: id }) if *id == job_id));

    let progress_count = messages
        .iter()
        .filter(|m| matches!(m, WorkerMessage::ProgressUpdate { .. }))
        .count();
    assert_eq!(progress_count, 2);

    match messages.last() {
        Some(WorkerMessage::JobCompleted {
            job_id: id,
            output_path,
            sidecar_path,
            config,
        }) => {
            assert_eq!(*id, job_id);
            assert_eq!(output_path, &output);
            assert_eq!(sidecar_path, &dir.path().join("out.json"));
            assert_eq!(config, "nvenc");
        }
        other => panic!("unexpected last message: {other:?}"),
    }
}

#[test]
fn test_failed_job_reports_error_chain() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let job_id = Uuid::new_v4();

    spawn_job(
        processor(vec![]),
        job_id,
        JobParams::new(dir.path().join("nope.360"), dir.path().join("out.mp4"), 64.0),
        tx,
    )
    .join()
    .unwrap();

    let messages: Vec<WorkerMessage> = rx.try_iter().collect();
    assert_eq!(messages.len(), 2);
    match &messages[1] {
        WorkerMessage::JobFailed { job_id: id, error } => {
            assert_eq!(*id, job_id);
            assert!(error.starts_with("Input file not found: "));
            assert!(error.ends_with("nope.360"));
        }
        other => panic!("unexpected message: {other:?}"),
    }
}
