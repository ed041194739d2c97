//! CLI command handlers.
//!
//! - [`gui`] - open the window (the default)
//! - [`projects`] - list, add and remove saved project paths
//! - [`run`] - run one command in a project and stream its output
//! - [`routes`] - list, filter and export a project's routes
//! - [`log`] - show or clear the command log

mod gui;
mod log;
mod projects;
mod routes;
mod run;

pub use gui::gui_command;
pub use log::{log_clear_command, log_show_command};
pub use projects::{projects_add_command, projects_list_command, projects_remove_command};
pub use routes::{routes_command, RoutesOptions};
pub use run::run_command;
