//! Process-wide logging.
//!
//! Every message goes to the log file. The console layer is only installed
//! in CLI mode (the form owns the terminal), and the form passes its own
//! [`LogSink`] to mirror messages into the log pane.

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt as tracing_fmt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "stereo_processor.log";

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Receives formatted log lines (the form's log pane)
#[derive(Debug, Clone)]
pub struct LogSink {
    tx: Sender<String>,
}

impl LogSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end for the consumer
    pub fn channel() -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

/// `2025-01-01 12:00:00 - INFO - message`
pub fn format_line(level: &Level, message: &str) -> String {
    format!(
        "{} - {} - {}",
        Local::now().format(TIMESTAMP_FORMAT),
        level,
        message
    )
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push_str(&format!(" {}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

/// Layer forwarding each event to a [`LogSink`]
pub struct SinkLayer {
    sink: LogSink,
}

impl SinkLayer {
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = format!("{}{}", visitor.message, visitor.fields);
        // Receiver gone means the form closed; nothing left to show it on
        let _ = self
            .sink
            .tx
            .send(format_line(event.metadata().level(), &message));
    }
}

/// Where log output goes
#[derive(Debug, Default)]
pub struct LogOptions {
    /// Append-mode log file
    pub file: Option<PathBuf>,
    /// Also print to stderr
    pub console: bool,
    /// Mirror into a UI pane
    pub sink: Option<LogSink>,
}

/// Assemble the subscriber for `options`.
///
/// A log file that can't be opened only drops the file layer; the error is
/// handed back next to a subscriber that still feeds the console and sink.
pub fn build(options: LogOptions) -> (impl Subscriber + Send + Sync + 'static, Option<anyhow::Error>) {
    let (file_layer, file_error) = match &options.file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (
                Some(
                    tracing_fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_timer(LocalTime)
                        .with_writer(Mutex::new(file)),
                ),
                None,
            ),
            Err(e) => (
                None,
                Some(
                    anyhow::Error::new(e)
                        .context(format!("Failed to open log file: {}", path.display())),
                ),
            ),
        },
        None => (None, None),
    };

    let console_layer = options.console.then(|| {
        tracing_fmt::layer()
            .with_target(false)
            .with_timer(LocalTime)
            .with_writer(std::io::stderr)
    });

    let sink_layer = options.sink.map(SinkLayer::new);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(console_layer)
        .with(file_layer)
        .with(sink_layer);

    (subscriber, file_error)
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(options: LogOptions) -> Result<()> {
    let (subscriber, file_error) = build(options);
    subscriber.try_init().context("Failed to install logger")?;

    if let Some(e) = file_error {
        warn!("{:#}; continuing without a log file", e);
    }
    Ok(())
}
