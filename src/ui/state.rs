// Application state management

use ratatui::layout::Rect;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::engine::worker::WorkerMessage;
use crate::engine::{JobParams, JobStatus, StereoJob, format_ipd, parse_ipd};
use crate::ui::browser::BrowserState;
use crate::ui::focus::FormFocus;

/// Lines kept in the log pane
pub const LOG_CAPACITY: usize = 1000;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_MISSING_PATHS: &str = "Please select input and output files";
pub const STATUS_INVALID_IPD: &str = "Invalid IPD value";
pub const STATUS_PROCESSING: &str = "Processing...";
pub const STATUS_COMPLETE: &str = "Processing complete!";

/// Text inputs of the form
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub input_path: String,
    pub output_path: String,
    pub ipd: String,
    pub focus: FormFocus,
    /// Cursor as a char index into the focused text field
    pub cursor_pos: usize,
}

impl FormState {
    pub fn new(default_ipd: f64) -> Self {
        Self {
            ipd: format_ipd(default_ipd),
            ..Default::default()
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormFocus::InputPath => Some(&mut self.input_path),
            FormFocus::OutputPath => Some(&mut self.output_path),
            FormFocus::Ipd => Some(&mut self.ipd),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self.focus {
            FormFocus::InputPath => Some(&self.input_path),
            FormFocus::OutputPath => Some(&self.output_path),
            FormFocus::Ipd => Some(&self.ipd),
            _ => None,
        }
    }

    fn field_len(&self) -> usize {
        self.field().map(|f| f.chars().count()).unwrap_or(0)
    }

    /// Move focus, parking the cursor at the end of the new field
    pub fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
        self.cursor_pos = self.field_len();
    }

    pub fn insert_char(&mut self, c: char) {
        let pos = self.cursor_pos;
        if let Some(field) = self.field_mut() {
            let chars: Vec<char> = field.chars().collect();
            let pos = pos.min(chars.len());
            let mut new_string: String = chars.iter().take(pos).collect();
            new_string.push(c);
            new_string.extend(chars.iter().skip(pos));
            *field = new_string;
            self.cursor_pos = pos + 1;
        }
    }

    pub fn backspace(&mut self) {
        let pos = self.cursor_pos;
        if pos == 0 {
            return;
        }
        if let Some(field) = self.field_mut() {
            let mut chars: Vec<char> = field.chars().collect();
            if pos <= chars.len() {
                chars.remove(pos - 1);
                *field = chars.into_iter().collect();
                self.cursor_pos = pos - 1;
            }
        }
    }

    pub fn delete(&mut self) {
        let pos = self.cursor_pos;
        if let Some(field) = self.field_mut() {
            let mut chars: Vec<char> = field.chars().collect();
            if pos < chars.len() {
                chars.remove(pos);
                *field = chars.into_iter().collect();
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor_pos = (self.cursor_pos + 1).min(self.field_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_pos = self.field_len();
    }

    /// Presence of both paths and a parseable IPD; nothing else is checked here
    pub fn validate(&self) -> Result<JobParams, &'static str> {
        let input = self.input_path.trim();
        let output = self.output_path.trim();
        if input.is_empty() || output.is_empty() {
            return Err(STATUS_MISSING_PATHS);
        }

        let ipd_mm = parse_ipd(&self.ipd).ok_or(STATUS_INVALID_IPD)?;

        Ok(JobParams::new(
            PathBuf::from(input),
            with_default_extension(Path::new(output)),
            ipd_mm,
        ))
    }
}

/// `clip.360` -> `clip_sbs.mp4` in the same directory
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_sbs.mp4", stem))
}

/// Save dialogs default to MP4
pub fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("mp4")
    }
}

/// Quit while a job is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitConfirmationState;

pub struct AppState {
    pub form: FormState,
    pub job: Option<StereoJob>,
    pub status: String,
    pub log: VecDeque<String>,
    /// Lines scrolled up from the bottom of the log
    pub log_scroll: usize,
    pub browser: Option<BrowserState>,
    pub quit_modal: Option<QuitConfirmationState>,
    /// Frame counter for the indeterminate progress animation
    pub tick: u64,
    /// Last rendered button area, for mouse clicks
    pub button_area: Rect,
}

impl AppState {
    pub fn new(default_ipd: f64) -> Self {
        let mut form = FormState::new(default_ipd);
        form.set_focus(FormFocus::InputPath);

        Self {
            form,
            job: None,
            status: STATUS_READY.to_string(),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            log_scroll: 0,
            browser: None,
            quit_modal: None,
            tick: 0,
            button_area: Rect::default(),
        }
    }

    /// A job is on the worker thread; the trigger is disabled
    pub fn is_running(&self) -> bool {
        self.job
            .as_ref()
            .is_some_and(|j| matches!(j.status, JobStatus::Pending | JobStatus::Running))
    }

    /// Validate the form and mark a new job as dispatched.
    /// Returns what the worker should run, or `None` with the status set.
    pub fn begin_job(&mut self) -> Option<(Uuid, JobParams)> {
        if self.is_running() {
            return None;
        }

        let params = match self.form.validate() {
            Ok(params) => params,
            Err(msg) => {
                self.status = msg.to_string();
                return None;
            }
        };

        // Reflect the .mp4 default back into the field
        self.form.output_path = params.output_path.to_string_lossy().to_string();
        if self.form.focus == FormFocus::OutputPath {
            self.form.cursor_end();
        }

        let job = StereoJob::new(params.clone());
        let id = job.id;
        self.job = Some(job);
        self.status = STATUS_PROCESSING.to_string();
        Some((id, params))
    }

    pub fn apply_worker_message(&mut self, msg: WorkerMessage) {
        let msg_id = match &msg {
            WorkerMessage::JobStarted { job_id }
            | WorkerMessage::ProgressUpdate { job_id, .. }
            | WorkerMessage::JobCompleted { job_id, .. }
            | WorkerMessage::JobFailed { job_id, .. } => *job_id,
        };
        let Some(job) = self.job.as_mut().filter(|j| j.id == msg_id) else {
            return;
        };

        match msg {
            WorkerMessage::JobStarted { .. } => {
                job.status = JobStatus::Running;
            }
            WorkerMessage::ProgressUpdate { progress, .. } => {
                job.frame = progress.frame;
                job.total_frames = progress.total_frames;
                job.fps = progress.fps;
                job.speed = progress.speed;
                job.progress_pct = progress.progress_pct;
                job.eta_seconds = progress.eta_seconds;
                job.config = Some(progress.config);
                if job.progress_pct > 0.0 {
                    self.status = format!("Processing: {:.1}%", job.progress_pct);
                }
            }
            WorkerMessage::JobCompleted { config, .. } => {
                job.status = JobStatus::Done;
                job.progress_pct = 100.0;
                job.eta_seconds = None;
                job.config = Some(config);
                self.status = STATUS_COMPLETE.to_string();
            }
            WorkerMessage::JobFailed { error, .. } => {
                job.status = JobStatus::Failed;
                self.status = format!("Error: {}", error);
            }
        }
    }

    /// Append a log message; multi-line messages become one entry per line
    pub fn push_log(&mut self, message: String) {
        for line in message.lines() {
            if self.log.len() >= LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(line.to_string());
        }
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        self.log_scroll = (self.log_scroll + lines).min(self.log.len().saturating_sub(1));
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.log_scroll = self.log_scroll.saturating_sub(lines);
    }
}
