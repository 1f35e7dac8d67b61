// State management module
// Holds the process-wide application state handed to request handlers

/// Application state owned by the composition root
pub mod app_state;

pub use app_state::AppState;
