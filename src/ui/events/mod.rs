// Event handling and main UI loop

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::engine::Processor;
use crate::engine::worker::WorkerMessage;
use crate::ui::{BrowserModal, FormScreen, QuitModal, state::AppState};

mod browser;
mod form;
mod workers;

// Event types sent from dedicated event thread to main loop
enum UiEvent {
    Input(Event), // Keyboard, mouse, or other terminal events
    Tick,         // Periodic redraw and animation
}

/// Spawn a dedicated thread for event polling.
fn spawn_event_thread(tx: mpsc::Sender<UiEvent>) {
    let tick_rate = Duration::from_millis(50);

    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::from_secs(0));

            if event::poll(timeout).unwrap_or(false) {
                if let Ok(evt) = event::read() {
                    if tx.send(UiEvent::Input(evt)).is_err() {
                        break; // Main thread dropped the receiver
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(UiEvent::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
    });
}

/// Everything the key handlers need besides the state itself
pub(crate) struct Dispatcher {
    processor: Arc<Processor>,
    worker_tx: Sender<WorkerMessage>,
}

impl Dispatcher {
    pub(crate) fn new(processor: Arc<Processor>, worker_tx: Sender<WorkerMessage>) -> Self {
        Self {
            processor,
            worker_tx,
        }
    }
}

pub fn run_ui(processor: Arc<Processor>, config: &Config, log_rx: Receiver<String>) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(config.defaults.ipd_mm);

    let (event_tx, event_rx) = mpsc::channel();
    spawn_event_thread(event_tx);

    let (worker_tx, worker_rx) = mpsc::channel();
    let dispatcher = Dispatcher::new(processor, worker_tx);

    let result = run_app(
        &mut terminal,
        &mut app_state,
        &dispatcher,
        event_rx,
        &worker_rx,
        &log_rx,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    dispatcher: &Dispatcher,
    event_rx: Receiver<UiEvent>,
    worker_rx: &Receiver<WorkerMessage>,
    log_rx: &Receiver<String>,
) -> io::Result<()> {
    loop {
        let mut pending_ticks: u64 = 0;
        let mut pending_inputs: Vec<Event> = Vec::new();

        // Block for one event, then drain the queue
        match event_rx.recv() {
            Ok(UiEvent::Tick) => pending_ticks += 1,
            Ok(UiEvent::Input(ev)) => pending_inputs.push(ev),
            Err(_) => return Ok(()),
        }
        while let Ok(evt) = event_rx.try_recv() {
            match evt {
                UiEvent::Tick => pending_ticks += 1,
                UiEvent::Input(ev) => pending_inputs.push(ev),
            }
        }

        for input in pending_inputs {
            match input {
                Event::Key(key) => {
                    if handle_key(key, state, dispatcher) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(mouse, state, dispatcher),
                _ => {}
            }
        }

        state.tick = state.tick.wrapping_add(pending_ticks);

        workers::drain_worker_messages(worker_rx, state);
        while let Ok(line) = log_rx.try_recv() {
            state.push_log(line);
        }

        terminal.draw(|frame| {
            FormScreen::render(frame, state);

            if let Some(ref mut browser) = state.browser {
                BrowserModal::render(frame, browser);
            }
            if state.quit_modal.is_some() {
                let pct = state.job.as_ref().map(|j| j.progress_pct).unwrap_or(0.0);
                QuitModal::render(frame, pct);
            }
        })?;
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Returns true when the app should exit
pub(crate) fn handle_key(key: KeyEvent, state: &mut AppState, dispatcher: &Dispatcher) -> bool {
    if key.kind != event::KeyEventKind::Press {
        return false;
    }

    if state.quit_modal.is_some() {
        return form::handle_quit_modal_key(key, state);
    }

    if state.browser.is_some() {
        browser::handle_browser_key(key, state);
        return false;
    }

    // Quit on Esc, Ctrl+C, or 'q' outside text fields
    let wants_quit = key.code == KeyCode::Esc
        || is_ctrl(&key, 'c')
        || (!state.form.focus.is_text_field() && matches!(key.code, KeyCode::Char('q' | 'Q')));
    if wants_quit {
        return form::request_quit(state);
    }

    if is_ctrl(&key, 'o') {
        browser::open_browser(state);
        return false;
    }

    if is_ctrl(&key, 'r') {
        workers::start_job(state, dispatcher);
        return false;
    }

    form::handle_form_key(key, state, dispatcher);
    false
}

fn handle_mouse(mouse: MouseEvent, state: &mut AppState, dispatcher: &Dispatcher) {
    if state.browser.is_some() || state.quit_modal.is_some() {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let area = state.button_area;
            let inside = mouse.column >= area.x
                && mouse.column < area.x + area.width
                && mouse.row >= area.y
                && mouse.row < area.y + area.height;
            if inside {
                workers::start_job(state, dispatcher);
            }
        }
        MouseEventKind::ScrollUp => state.scroll_log_up(3),
        MouseEventKind::ScrollDown => state.scroll_log_down(3),
        _ => {}
    }
}
