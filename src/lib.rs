pub mod app;
pub mod engine;
pub mod event_source;
pub mod history;
pub mod hud;
pub mod library;
pub mod settings;
pub mod theme;
pub mod viewer;

pub mod test_utils;

// Re-export main app components
pub use app::{App, FocusedPanel, run_app_with_event_source};
