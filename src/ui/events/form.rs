use super::*;
use crate::ui::focus::FormFocus;
use crate::ui::state::QuitConfirmationState;

const LOG_PAGE: usize = 10;

pub(super) fn handle_form_key(key: KeyEvent, state: &mut AppState, dispatcher: &Dispatcher) {
    let focus = state.form.focus;

    match key.code {
        KeyCode::Tab => state.form.set_focus(focus.next()),
        KeyCode::BackTab => state.form.set_focus(focus.previous()),
        KeyCode::PageUp => state.scroll_log_up(LOG_PAGE),
        KeyCode::PageDown => state.scroll_log_down(LOG_PAGE),
        KeyCode::Up if focus == FormFocus::LogPane => state.scroll_log_up(1),
        KeyCode::Down if focus == FormFocus::LogPane => state.scroll_log_down(1),
        KeyCode::Up => state.form.set_focus(focus.previous()),
        KeyCode::Down => state.form.set_focus(focus.next()),
        KeyCode::Enter => match focus {
            FormFocus::ProcessButton => workers::start_job(state, dispatcher),
            f if f.is_text_field() => state.form.set_focus(f.next()),
            _ => {}
        },
        _ if focus.is_text_field() => handle_text_key(key, state),
        _ => {}
    }
}

fn handle_text_key(key: KeyEvent, state: &mut AppState) {
    let form = &mut state.form;
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.insert_char(c),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Delete => form.delete(),
        KeyCode::Left => form.cursor_left(),
        KeyCode::Right => form.cursor_right(),
        KeyCode::Home => form.cursor_home(),
        KeyCode::End => form.cursor_end(),
        _ => {}
    }
}

/// Quit now when idle, otherwise ask first. Returns true to exit.
pub(super) fn request_quit(state: &mut AppState) -> bool {
    if state.is_running() {
        state.quit_modal = Some(QuitConfirmationState);
        false
    } else {
        true
    }
}

pub(super) fn handle_quit_modal_key(key: KeyEvent, state: &mut AppState) -> bool {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => true,
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            state.quit_modal = None;
            false
        }
        _ => false,
    }
}
