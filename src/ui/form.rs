// Conversion form screen

use crate::engine::{JobStatus, format_eta};
use crate::ui::components::{Footer, render_button, render_text_field};
use crate::ui::focus::FormFocus;
use crate::ui::state::AppState;
use crate::ui::widgets::{EnhancedProgress, ProgressState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct FormScreen;

impl FormScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Inputs
                Constraint::Length(3), // Process button
                Constraint::Length(4), // Progress
                Constraint::Length(1), // Status
                Constraint::Min(3),    // Log pane
                Constraint::Length(1), // Footer
            ])
            .split(area);

        Self::render_inputs(frame, chunks[0], state);
        Self::render_button(frame, chunks[1], state);
        Self::render_progress(frame, chunks[2], state);
        Self::render_status(frame, chunks[3], state);
        Self::render_log(frame, chunks[4], state);

        Footer::form(state.is_running()).render(chunks[5], frame.buffer_mut());
    }

    fn render_inputs(frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Stereo Conversion ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let form = &state.form;
        let fields = [
            (FormFocus::InputPath, "Input:", form.input_path.as_str()),
            (FormFocus::OutputPath, "Output:", form.output_path.as_str()),
            (FormFocus::Ipd, "IPD (mm):", form.ipd.as_str()),
        ];

        let mut cursor = None;
        for (row, (focus, label, value)) in rows.iter().zip(fields) {
            let cursor_pos = (form.focus == focus && state.browser.is_none() && state.quit_modal.is_none())
                .then_some(form.cursor_pos);
            if let Some(pos) = render_text_field(label, value, cursor_pos, *row, frame.buffer_mut()) {
                cursor = Some(pos);
            }
        }

        if let Some((x, y)) = cursor {
            frame.set_cursor_position(Position::new(x, y));
        }
    }

    fn render_button(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let running = state.is_running();
        let label = if running { "Processing..." } else { "Process" };
        let block = Block::default().borders(Borders::ALL).border_style(
            if state.form.focus == FormFocus::ProcessButton {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        state.button_area = area;
        render_button(
            label,
            "Ctrl+R",
            state.form.focus == FormFocus::ProcessButton,
            !running,
            inner,
            frame.buffer_mut(),
        );
    }

    /// Bar state for the current job
    pub fn progress_state(state: &AppState) -> ProgressState {
        match &state.job {
            None => ProgressState::Idle,
            Some(job) => match job.status {
                JobStatus::Done => ProgressState::Done,
                JobStatus::Failed => ProgressState::Failed,
                JobStatus::Pending | JobStatus::Running => {
                    if job.total_frames.is_some() && job.progress_pct > 0.0 {
                        ProgressState::Running
                    } else {
                        ProgressState::Indeterminate { tick: state.tick }
                    }
                }
            },
        }
    }

    fn render_progress(frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Progress ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let percent = state.job.as_ref().map(|j| j.progress_pct).unwrap_or(0.0);
        frame.render_widget(
            EnhancedProgress::new(percent, Self::progress_state(state)),
            rows[0],
        );

        let (frames, fps, speed, eta, config) = match &state.job {
            Some(job) => (
                match job.total_frames {
                    Some(total) => format!("{}/{}", job.frame, total),
                    None => job.frame.to_string(),
                },
                job.fps
                    .map(|f| format!("{:.1}", f))
                    .unwrap_or_else(|| "-".to_string()),
                job.speed
                    .map(|s| format!("{:.2}x", s))
                    .unwrap_or_else(|| "-".to_string()),
                format_eta(job.eta_seconds),
                job.config.clone().unwrap_or_else(|| "-".to_string()),
            ),
            None => (
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                format_eta(None),
                "-".to_string(),
            ),
        };

        let label = Style::default().fg(Color::Gray);
        let line = Line::from(vec![
            Span::styled("Frames: ", label),
            Span::raw(frames),
            Span::raw("  "),
            Span::styled("FPS: ", label),
            Span::raw(fps),
            Span::raw("  "),
            Span::styled("Speed: ", label),
            Span::raw(speed),
            Span::raw("  "),
            Span::styled("ETA: ", label),
            Span::raw(eta),
            Span::raw("  "),
            Span::styled("Encoder: ", label),
            Span::raw(config),
            Span::raw("  "),
            Span::styled(format!("{:.1}%", percent), Style::default().fg(Color::White).bold()),
        ]);
        frame.render_widget(Paragraph::new(line), rows[1]);
    }

    fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
        let color = match state.job.as_ref().map(|j| j.status) {
            Some(JobStatus::Failed) => Color::Red,
            Some(JobStatus::Done) => Color::Green,
            _ if state.status.starts_with("Please") || state.status.starts_with("Invalid") => {
                Color::Yellow
            }
            _ => Color::White,
        };

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                state.status.clone(),
                Style::default().fg(color),
            )))
            .alignment(Alignment::Left),
            area,
        );
    }

    fn render_log(frame: &mut Frame, area: Rect, state: &AppState) {
        let title = if state.log_scroll > 0 {
            format!(" Log (↑{}) ", state.log_scroll)
        } else {
            " Log ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(if state.form.focus == FormFocus::LogPane {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        let inner = block.inner(area);

        // Newest rows at the bottom; long lines are hard-wrapped so the row count is exact
        let visible = inner.height as usize;
        let width = inner.width.max(1) as usize;
        let end = state.log.len().saturating_sub(state.log_scroll);

        let mut rows: Vec<Line> = Vec::with_capacity(visible);
        for l in state.log.iter().take(end).rev() {
            if rows.len() >= visible {
                break;
            }
            let style = if l.contains(" - ERROR - ") {
                Style::default().fg(Color::Red)
            } else if l.contains(" - WARN - ") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            for chunk in hard_wrap(l, width).into_iter().rev() {
                rows.push(Line::from(Span::styled(chunk, style)));
            }
        }
        rows.truncate(visible);
        rows.reverse();

        frame.render_widget(Paragraph::new(rows).block(block), area);
    }
}

/// Split into rows of at most `width` chars
fn hard_wrap(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}
