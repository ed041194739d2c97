//! Terminal output for the headless commands.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::process::RunState;
use crate::session::{Notice, NoticeKind};

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

pub use colors::*;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

pub fn print_error(msg: &str) {
    eprintln!("{RED}{BOLD}Error:{RESET} {}", msg);
}

pub fn print_warning(msg: &str) {
    println!("{YELLOW}Warning:{RESET} {}", msg);
}

pub fn print_info(msg: &str) {
    println!("{CYAN}Info:{RESET} {}", msg);
}

pub fn print_success(msg: &str) {
    println!("{GREEN}{}{RESET}", msg);
}

/// Print a queued session notice with the styling of its kind.
pub fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Info => print_info(&format!("{}: {}", notice.title, notice.message)),
        NoticeKind::Error => print_error(&format!("{}: {}", notice.title, notice.message)),
    }
}

/// One line per saved path, numbered from 1.
pub fn print_saved_paths(paths: &[String]) {
    if paths.is_empty() {
        println!("{GRAY}No saved project paths.{RESET}");
        return;
    }
    for (index, path) in paths.iter().enumerate() {
        println!("{DIM}{:>3}.{RESET} {}", index + 1, path);
    }
}

/// Closing line after a headless run.
pub fn print_run_result(state: RunState) {
    match state {
        RunState::Finished => print_success("Command finished."),
        RunState::Terminated => println!("{YELLOW}Command stopped.{RESET}"),
        RunState::Failed => print_error("Command failed."),
        RunState::Idle | RunState::Running => {}
    }
}

pub fn print_route_count(shown: usize, total: usize) {
    if shown == total {
        println!("{GRAY}{} routes{RESET}", total);
    } else {
        println!("{GRAY}{} of {} routes{RESET}", shown, total);
    }
}

/// A steady-ticking spinner on stderr. Finish it with
/// [`ProgressBar::finish_and_clear`].
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars(SPINNER_CHARS)
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
