//! Run command handler.
//!
//! Runs one catalog command without the window, streaming the same log
//! entries and output lines the window would show.

use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::output::{print_info, print_notice, print_run_result, print_warning};
use crate::process::{CommandHandle, RunState};
use crate::session::{NoticeKind, Session};
use crate::signal::SignalHandler;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `command` with `params` in `path` and wait for it to end.
///
/// Ctrl+C stops the child and a second Ctrl+C kills it. Returns the state the command ended in.
pub fn run_command(config: Config, path: &Path, command: &str, params: &[String]) -> Result<RunState> {
    let signals = SignalHandler::new()?;
    let mut session = Session::open(config)?;
    while let Some(notice) = session.dismiss_notice() {
        print_notice(&notice);
    }

    session.set_project_path(path.display().to_string());
    session.run_command(command, &params.join(" "))?;

    let state = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        stream_until_done(&mut session, &signals, &mut out)?
    };

    while let Some(notice) = session.dismiss_notice() {
        if notice.kind == NoticeKind::Error {
            print_notice(&notice);
        }
    }
    print_run_result(state);
    Ok(state)
}

/// Write log text appended since `printed` and return the new length.
fn flush_log<W: Write>(session: &Session, printed: usize, out: &mut W) -> Result<usize> {
    let text = session.log_text();
    if let Some(fresh) = text.get(printed..) {
        if !fresh.is_empty() {
            out.write_all(fresh.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(text.len())
}

/// Drain worker events into `out` until the command has exited.
///
/// The first interrupt asks the child to stop and keeps streaming whatever
/// it prints while shutting down. A second one kills it and returns without
/// waiting for the worker to report.
pub(crate) fn stream_until_done<W: Write>(
    session: &mut Session,
    signals: &SignalHandler,
    out: &mut W,
) -> Result<RunState> {
    let mut printed = session.log_text().len();
    let mut stop_sent = false;

    loop {
        session.drain_events();
        printed = flush_log(session, printed, out)?;
        let worker_done = session.current_handle().map_or(true, CommandHandle::is_done);
        if !session.is_running() && (!stop_sent || worker_done) {
            break;
        }

        let interrupts = signals.interrupt_count();
        if interrupts > 0 && !stop_sent {
            stop_sent = true;
            tracing::info!("interrupt received, stopping command");
            session.stop_command()?;
            printed = flush_log(session, printed, out)?;
            if session.current_handle().is_some_and(|h| !h.is_done()) {
                print_info("Waiting for the command to exit. Press Ctrl+C again to kill it.");
            }
            continue;
        }
        if interrupts > 1 {
            if let Some(handle) = session.current_handle() {
                handle.force_kill()?;
            }
            print_warning("Interrupted again, killed the command without waiting for it.");
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    session.drain_events();
    flush_log(session, printed, out)?;
    Ok(session.run_state())
}
