//! Terminal presentation for the Folio showcase

pub mod app;
pub mod tui;

pub use app::App;
pub use tui::run_tui;
