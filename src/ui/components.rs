// Reusable UI components

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct Footer {
    content: Line<'static>,
}

impl Footer {
    fn from_controls(prefix: &'static str, controls: &[(&'static str, &'static str)]) -> Self {
        let mut spans = vec![Span::raw(prefix)];

        for (i, (hotkey, desc)) in controls.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*hotkey, Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" "));
            spans.push(Span::raw(*desc));
        }

        Self {
            content: Line::from(spans),
        }
    }

    pub fn form(running: bool) -> Self {
        if running {
            Self::from_controls(
                "ENCODING  ",
                &[("[PgUp/PgDn]", "Scroll Log"), ("[Esc]", "Quit")],
            )
        } else {
            Self::from_controls(
                "CONTROLS: ",
                &[
                    ("[Tab]", "Next Field"),
                    ("[Ctrl+O]", "Browse"),
                    ("[Ctrl+R]", "Process"),
                    ("[PgUp/PgDn]", "Scroll Log"),
                    ("[Esc]", "Quit"),
                ],
            )
        }
    }
}

impl Widget for Footer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.content)
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
    }
}

pub fn render_button(
    label: &str,
    hotkey: &str,
    focused: bool,
    enabled: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let style = if !enabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().bg(Color::Blue).fg(Color::White).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let hotkey_style = if enabled {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text = Line::from(vec![
        Span::raw("["),
        Span::styled(hotkey, hotkey_style),
        Span::raw("] "),
        Span::raw(label),
    ])
    .style(style);

    let mut centered_area = area;
    let text_width = (label.chars().count() + hotkey.chars().count() + 3) as u16; // "[hotkey] label"
    if area.width > text_width {
        let padding = (area.width - text_width) / 2;
        centered_area.x += padding;
        centered_area.width = text_width;
    }

    buf.set_line(centered_area.x, centered_area.y, &text, centered_area.width);
}

/// Labelled single-line text input; returns the screen column of the cursor
pub fn render_text_field(
    label: &str,
    value: &str,
    cursor_pos: Option<usize>,
    area: Rect,
    buf: &mut Buffer,
) -> Option<(u16, u16)> {
    let label_style = if cursor_pos.is_some() {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::Cyan)
    };
    let label_text = format!("{:<12}", label);
    let label_width = label_text.chars().count() as u16;

    let value_width = area.width.saturating_sub(label_width) as usize;
    // Keep the cursor visible in long paths
    let skip = match cursor_pos {
        Some(pos) if pos >= value_width && value_width > 0 => pos + 1 - value_width,
        _ => 0,
    };
    let visible: String = value.chars().skip(skip).take(value_width).collect();

    let value_style = if cursor_pos.is_some() {
        Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 60))
    } else {
        Style::default().fg(Color::White)
    };

    let line = Line::from(vec![
        Span::styled(label_text, label_style),
        Span::styled(format!("{:<width$}", visible, width = value_width), value_style),
    ]);
    buf.set_line(area.x, area.y, &line, area.width);

    cursor_pos.map(|pos| (area.x + label_width + (pos - skip) as u16, area.y))
}
