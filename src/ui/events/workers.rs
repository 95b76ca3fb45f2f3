use super::*;
use crate::engine::worker;
use tracing::info;

/// Process at most this many worker messages per frame to keep input snappy
const MAX_MESSAGES_PER_FRAME: usize = 64;

pub(super) fn start_job(state: &mut AppState, dispatcher: &Dispatcher) {
    let Some((job_id, params)) = state.begin_job() else {
        return;
    };

    info!(
        "Starting conversion: {} -> {} (IPD {} mm)",
        params.input_path.display(),
        params.output_path.display(),
        params.ipd_mm
    );

    // Detached: the form learns about completion through the channel
    let _ = worker::spawn_job(
        Arc::clone(&dispatcher.processor),
        job_id,
        params,
        dispatcher.worker_tx.clone(),
    );
}

pub(super) fn drain_worker_messages(rx: &Receiver<WorkerMessage>, state: &mut AppState) {
    for _ in 0..MAX_MESSAGES_PER_FRAME {
        match rx.try_recv() {
            Ok(msg) => state.apply_worker_message(msg),
            Err(_) => break,
        }
    }
}
