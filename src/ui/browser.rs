// File browser modal for picking input/output paths

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions offered when choosing an input (360 camera files and common containers)
pub const INPUT_EXTENSIONS: &[&str] = &["360", "mp4", "mov", "avi"];
/// Extensions shown when choosing where to save
pub const OUTPUT_EXTENSIONS: &[&str] = &["mp4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseMode {
    /// Open an existing video
    Input,
    /// Pick a directory (or existing file) to save into
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Output mode only: save into the current directory
    SaveHere,
    Parent,
    Dir,
    File,
}

#[derive(Debug, Clone)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// What activating an entry did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome {
    /// Moved into another directory
    Navigated,
    /// A path was chosen; close the modal
    Selected(PathBuf),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct BrowserState {
    pub mode: BrowseMode,
    pub dir: PathBuf,
    pub entries: Vec<BrowserEntry>,
    pub list_state: ListState,
    /// Proposed file name for `SaveHere`
    pub save_name: String,
    pub error: Option<String>,
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

impl BrowserState {
    pub fn open(mode: BrowseMode, dir: PathBuf, save_name: String) -> Self {
        let mut state = Self {
            mode,
            dir,
            entries: Vec::new(),
            list_state: ListState::default(),
            save_name,
            error: None,
        };
        state.reload();
        state
    }

    /// Re-read the current directory
    pub fn reload(&mut self) {
        self.entries.clear();
        self.error = None;

        if self.mode == BrowseMode::Output {
            self.entries.push(BrowserEntry {
                name: format!("[Save here as {}]", self.save_name),
                path: self.dir.join(&self.save_name),
                kind: EntryKind::SaveHere,
            });
        }
        if let Some(parent) = self.dir.parent() {
            self.entries.push(BrowserEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                kind: EntryKind::Parent,
            });
        }

        let extensions = match self.mode {
            BrowseMode::Input => INPUT_EXTENSIONS,
            BrowseMode::Output => OUTPUT_EXTENSIONS,
        };

        match fs::read_dir(&self.dir) {
            Ok(read_dir) => {
                let mut dirs = Vec::new();
                let mut files = Vec::new();
                for entry in read_dir.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().to_string();
                    if name.starts_with('.') {
                        continue;
                    }
                    if path.is_dir() {
                        dirs.push(BrowserEntry {
                            name: format!("{}/", name),
                            path,
                            kind: EntryKind::Dir,
                        });
                    } else if has_extension(&path, extensions) {
                        files.push(BrowserEntry {
                            name,
                            path,
                            kind: EntryKind::File,
                        });
                    }
                }
                dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                self.entries.extend(dirs);
                self.entries.extend(files);
            }
            Err(e) => {
                self.error = Some(format!("Cannot read {}: {}", self.dir.display(), e));
            }
        }

        self.list_state
            .select(if self.entries.is_empty() { None } else { Some(0) });
    }

    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state
            .select(Some((i + 1).min(self.entries.len() - 1)));
    }

    pub fn select_previous(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected(&self) -> Option<&BrowserEntry> {
        self.list_state.selected().and_then(|i| self.entries.get(i))
    }

    pub fn activate(&mut self) -> BrowseOutcome {
        let Some(entry) = self.selected().cloned() else {
            return BrowseOutcome::Nothing;
        };

        match entry.kind {
            EntryKind::Parent | EntryKind::Dir => {
                self.dir = entry.path;
                self.reload();
                BrowseOutcome::Navigated
            }
            EntryKind::File | EntryKind::SaveHere => BrowseOutcome::Selected(entry.path),
        }
    }
}

pub struct BrowserModal;

impl BrowserModal {
    pub fn render(frame: &mut Frame, state: &mut BrowserState) {
        let area = frame.area();

        let modal_width = 80.min(area.width.saturating_sub(4));
        let modal_height = 24.min(area.height.saturating_sub(2));
        let modal_area = Rect {
            x: (area.width.saturating_sub(modal_width)) / 2,
            y: (area.height.saturating_sub(modal_height)) / 2,
            width: modal_width,
            height: modal_height,
        };

        frame.render_widget(Clear, modal_area);

        let title = match state.mode {
            BrowseMode::Input => " Open 360 Video (.360 .mp4 .mov .avi) ",
            BrowseMode::Output => " Save As (.mp4) ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let header = match &state.error {
            Some(err) => Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))),
            None => Line::from(Span::styled(
                state.dir.display().to_string(),
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let items: Vec<ListItem> = state
            .entries
            .iter()
            .map(|e| {
                let style = match e.kind {
                    EntryKind::SaveHere => Style::default().fg(Color::Green),
                    EntryKind::Parent | EntryKind::Dir => Style::default().fg(Color::Cyan),
                    EntryKind::File => Style::default().fg(Color::White),
                };
                ListItem::new(Line::from(Span::styled(e.name.clone(), style)))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_stateful_widget(list, chunks[1], &mut state.list_state);

        let help = Line::from(vec![
            Span::styled("[↑/↓]", Style::default().fg(Color::Yellow)),
            Span::raw(" Move  "),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::raw(" Open/Select  "),
            Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]);
        frame.render_widget(Paragraph::new(help), chunks[2]);
    }
}
