// Terminal UI using Ratatui

pub mod browser;
pub mod components;
pub mod events;
pub mod focus;
pub mod form;
pub mod quit_modal;
pub mod state;
pub mod widgets;

pub use browser::BrowserModal;
pub use events::run_ui;
pub use form::FormScreen;
pub use quit_modal::QuitModal;
pub use state::AppState;
