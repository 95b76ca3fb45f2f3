// Progress bar with per-state rendering

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Width of the sliding block when the total is unknown
const BOUNCE_WIDTH: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressState {
    /// Nothing dispatched yet
    Idle,
    /// Running without a known duration; `tick` drives the animation
    Indeterminate { tick: u64 },
    Running,
    Done,
    Failed,
}

pub struct EnhancedProgress {
    percent: f64,
    state: ProgressState,
}

impl EnhancedProgress {
    pub fn new(percent: f64, state: ProgressState) -> Self {
        Self {
            percent: percent.clamp(0.0, 100.0),
            state,
        }
    }
}

/// Start column of the bouncing block for a bar `width` cells wide
pub fn bounce_offset(tick: u64, width: u16) -> u16 {
    let travel = width.saturating_sub(BOUNCE_WIDTH) as u64;
    if travel == 0 {
        return 0;
    }
    let pos = tick % (travel * 2);
    if pos <= travel {
        pos as u16
    } else {
        (travel * 2 - pos) as u16
    }
}

impl Widget for EnhancedProgress {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (filled_range, filled_symbol, unfilled_symbol, filled_fg, unfilled_fg) =
            match self.state {
                ProgressState::Idle => ((0, 0), "░", "░", Color::DarkGray, Color::DarkGray),
                ProgressState::Indeterminate { tick } => {
                    let start = bounce_offset(tick, area.width);
                    let end = (start + BOUNCE_WIDTH).min(area.width);
                    ((start, end), "█", "░", Color::Cyan, Color::DarkGray)
                }
                ProgressState::Running => {
                    let filled = (area.width as f64 * self.percent / 100.0).round() as u16;
                    ((0, filled), "█", "░", Color::White, Color::DarkGray)
                }
                ProgressState::Done => ((0, area.width), "█", " ", Color::Green, Color::Black),
                ProgressState::Failed => {
                    let filled = (area.width as f64 * self.percent / 100.0).round() as u16;
                    ((0, filled), "█", "░", Color::Red, Color::DarkGray)
                }
            };

        for x in 0..area.width {
            let (symbol, fg) = if x >= filled_range.0 && x < filled_range.1 {
                (filled_symbol, filled_fg)
            } else {
                (unfilled_symbol, unfilled_fg)
            };
            buf.set_string(area.x + x, area.y, symbol, Style::default().fg(fg));
        }
    }
}
