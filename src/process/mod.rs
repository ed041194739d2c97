//! Subprocess execution for artisan and composer commands.
//!
//! One worker thread per invocation streams the child's output over a
//! channel; the UI owns the receiving end.

mod runner;
mod server;

pub use runner::{start_command, CommandHandle, RunEvent, RunState, STDERR_PREFIX};
pub use server::detect_server_address;
