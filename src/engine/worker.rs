// Background job runner for the interactive form

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use uuid::Uuid;

use super::processor::Processor;
use super::progress::EncodeProgress;
use super::types::JobParams;

/// Message from the worker to the UI thread
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Job picked up by the worker
    JobStarted { job_id: Uuid },

    /// Progress snapshot from the running encode
    ProgressUpdate {
        job_id: Uuid,
        progress: EncodeProgress,
    },

    /// Video and sidecar written
    JobCompleted {
        job_id: Uuid,
        output_path: PathBuf,
        sidecar_path: PathBuf,
        config: String,
    },

    /// Job failed with error
    JobFailed { job_id: Uuid, error: String },
}

/// Run `params` on a new thread. The worker only talks back through `tx`;
/// it never touches UI state.
pub fn spawn_job(
    processor: Arc<Processor>,
    job_id: Uuid,
    params: JobParams,
    tx: Sender<WorkerMessage>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(WorkerMessage::JobStarted { job_id });

        let tx_progress = tx.clone();
        let mut on_progress = move |progress: EncodeProgress| {
            let _ = tx_progress.send(WorkerMessage::ProgressUpdate { job_id, progress });
        };

        let msg = match processor.process(&params, &mut on_progress) {
            Ok(report) => WorkerMessage::JobCompleted {
                job_id,
                output_path: report.output_path,
                sidecar_path: report.sidecar_path,
                config: report.config,
            },
            Err(e) => WorkerMessage::JobFailed {
                job_id,
                error: format!("{:#}", anyhow::Error::new(e)),
            },
        };
        let _ = tx.send(msg);
    })
}
