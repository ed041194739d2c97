//! Native window for running commands and browsing routes.

pub mod app;
pub mod modal;
pub mod theme;

pub use app::{run_gui, PanelApp, Tab};
