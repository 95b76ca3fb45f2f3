// Form validation and state transitions driven by worker messages

use std::path::PathBuf;
use stereoscoper::engine::worker::WorkerMessage;
use stereoscoper::engine::{EncodeProgress, JobStatus};
use stereoscoper::ui::state::{
    AppState, STATUS_COMPLETE, STATUS_INVALID_IPD, STATUS_MISSING_PATHS, STATUS_PROCESSING,
    STATUS_READY,
};
use uuid::Uuid;

fn filled_state() -> AppState {
    let mut state = AppState::new(64.0);
    state.form.input_path = "/media/GS010012.360".to_string();
    state.form.output_path = "/media/GS010012_sbs".to_string();
    state
}

#[test]
fn test_missing_paths_blocks_dispatch() {
    let mut state = AppState::new(64.0);
    assert_eq!(state.status, STATUS_READY);

    state.form.input_path = "/media/GS010012.360".to_string();
    assert!(state.begin_job().is_none());
    assert_eq!(state.status, STATUS_MISSING_PATHS);
    assert!(state.job.is_none());

    state.form.input_path = "   ".to_string();
    state.form.output_path = "/media/out.mp4".to_string();
    assert!(state.begin_job().is_none());
    assert_eq!(state.status, STATUS_MISSING_PATHS);
}

#[test]
fn test_invalid_ipd_blocks_dispatch() {
    for bad in ["", "abc", "6 4", "inf", "NaN"] {
        let mut state = filled_state();
        state.form.ipd = bad.to_string();
        assert!(state.begin_job().is_none(), "accepted {bad:?}");
        assert_eq!(state.status, STATUS_INVALID_IPD);
    }
}

#[test]
fn test_dispatch_applies_mp4_default() {
    let mut state = filled_state();
    state.form.ipd = " 62.5 ".to_string();

    let (id, params) = state.begin_job().unwrap();

    assert_eq!(params.output_path, PathBuf::from("/media/GS010012_sbs.mp4"));
    assert_eq!(params.ipd_mm, 62.5);
    assert_eq!(state.form.output_path, "/media/GS010012_sbs.mp4");
    assert_eq!(state.status, STATUS_PROCESSING);
    assert!(state.is_running());
    assert_eq!(state.job.as_ref().map(|j| j.id), Some(id));

    // Trigger disabled while running
    assert!(state.begin_job().is_none());
}

#[test]
fn test_progress_then_completion() {
    let mut state = filled_state();
    let (job_id, _) = state.begin_job().unwrap();

    state.apply_worker_message(WorkerMessage::JobStarted { job_id });
    assert_eq!(state.job.as_ref().unwrap().status, JobStatus::Running);

    state.apply_worker_message(WorkerMessage::ProgressUpdate {
        job_id,
        progress: EncodeProgress {
            config: "nvenc".to_string(),
            frame: 150,
            total_frames: Some(300),
            fps: Some(30.0),
            speed: Some(1.0),
            progress_pct: 50.0,
            eta_seconds: Some(5),
        },
    });
    let job = state.job.as_ref().unwrap();
    assert_eq!(job.frame, 150);
    assert_eq!(job.config.as_deref(), Some("nvenc"));
    assert_eq!(state.status, "Processing: 50.0%");

    state.apply_worker_message(WorkerMessage::JobCompleted {
        job_id,
        output_path: PathBuf::from("/media/GS010012_sbs.mp4"),
        sidecar_path: PathBuf::from("/media/GS010012_sbs.json"),
        config: "x264".to_string(),
    });
    let job = state.job.as_ref().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.progress_pct, 100.0);
    assert_eq!(job.config.as_deref(), Some("x264"));
    assert_eq!(state.status, STATUS_COMPLETE);
    assert!(!state.is_running());

    // Trigger re-enabled
    assert!(state.begin_job().is_some());
}

#[test]
fn test_failure_reenables_trigger() {
    let mut state = filled_state();
    let (job_id, _) = state.begin_job().unwrap();

    state.apply_worker_message(WorkerMessage::JobFailed {
        job_id,
        error: "All processing configurations failed".to_string(),
    });

    assert_eq!(state.status, "Error: All processing configurations failed");
    assert_eq!(state.job.as_ref().unwrap().status, JobStatus::Failed);
    assert!(!state.is_running());
    assert!(state.begin_job().is_some());
}

#[test]
fn test_messages_for_other_jobs_are_ignored() {
    let mut state = filled_state();
    state.begin_job().unwrap();

    state.apply_worker_message(WorkerMessage::JobFailed {
        job_id: Uuid::new_v4(),
        error: "stale".to_string(),
    });

    assert_eq!(state.status, STATUS_PROCESSING);
    assert!(state.is_running());
}
