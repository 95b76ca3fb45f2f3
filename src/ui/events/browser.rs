use super::*;
use crate::ui::browser::{BrowseMode, BrowseOutcome, BrowserState};
use crate::ui::focus::FormFocus;
use crate::ui::state::default_output_path;
use std::path::{Path, PathBuf};

/// Open the browser for the focused path field (input unless output is focused)
pub(super) fn open_browser(state: &mut AppState) {
    let mode = if state.form.focus == FormFocus::OutputPath {
        BrowseMode::Output
    } else {
        BrowseMode::Input
    };

    let current = match mode {
        BrowseMode::Input => state.form.input_path.trim(),
        BrowseMode::Output => state.form.output_path.trim(),
    };
    let dir = start_dir(current)
        .or_else(|| start_dir(state.form.input_path.trim()))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let save_name = match mode {
        BrowseMode::Output => suggested_output_name(state),
        BrowseMode::Input => String::new(),
    };

    state.browser = Some(BrowserState::open(mode, dir, save_name));
}

/// Directory a path field points into, if it exists
fn start_dir(field: &str) -> Option<PathBuf> {
    if field.is_empty() {
        return None;
    }
    let path = Path::new(field);
    if path.is_dir() {
        return Some(path.to_path_buf());
    }
    path.parent().filter(|p| p.is_dir()).map(Path::to_path_buf)
}

fn suggested_output_name(state: &AppState) -> String {
    let from_output = Path::new(state.form.output_path.trim())
        .file_name()
        .map(|n| n.to_string_lossy().to_string());
    let from_input = (!state.form.input_path.trim().is_empty()).then(|| {
        default_output_path(Path::new(state.form.input_path.trim()))
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    });

    from_output
        .or(from_input.flatten())
        .unwrap_or_else(|| "output_sbs.mp4".to_string())
}

pub(super) fn handle_browser_key(key: KeyEvent, state: &mut AppState) {
    let Some(browser) = state.browser.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Esc => state.browser = None,
        KeyCode::Up | KeyCode::Char('k') => browser.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => browser.select_next(),
        KeyCode::Backspace | KeyCode::Left => {
            if let Some(parent) = browser.dir.parent() {
                browser.dir = parent.to_path_buf();
                browser.reload();
            }
        }
        KeyCode::Enter | KeyCode::Right => {
            let mode = browser.mode;
            if let BrowseOutcome::Selected(path) = browser.activate() {
                state.browser = None;
                apply_selection(state, mode, &path);
            }
        }
        _ => {}
    }
}

fn apply_selection(state: &mut AppState, mode: BrowseMode, path: &Path) {
    let text = path.to_string_lossy().to_string();
    match mode {
        BrowseMode::Input => {
            state.form.input_path = text;
            if state.form.output_path.trim().is_empty() {
                state.form.output_path = default_output_path(path).to_string_lossy().to_string();
            }
            state.form.set_focus(FormFocus::InputPath);
        }
        BrowseMode::Output => {
            state.form.output_path = text;
            state.form.set_focus(FormFocus::OutputPath);
        }
    }
}
