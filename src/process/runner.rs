//! Background execution of a single artisan or composer invocation.
//!
//! [`start_command`] spawns the child, then hands its output to a worker
//! thread that forwards every line, in order, over an [`mpsc`] channel. The
//! returned [`CommandHandle`] is shared with that worker so the UI can stop
//! the child and read its state without touching the pipes.

use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::catalog::is_serve;
use crate::error::{PanelError, Result};

use super::server::detect_server_address;

/// Prefix applied to lines read from the child's standard error.
pub const STDERR_PREFIX: &str = "[stderr] ";

/// How often the worker checks whether the child has exited once its pipes
/// are closed.
const REAP_INTERVAL: Duration = Duration::from_millis(20);

/// Lifecycle of a command invocation.
///
/// `Idle -> Running -> {Finished, Terminated, Failed}`. A handle is created
/// already `Running`; `Idle` describes a session with no handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Finished,
    Terminated,
    Failed,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    pub fn label(self) -> &'static str {
        match self {
            RunState::Idle => "Idle",
            RunState::Running => "Running",
            RunState::Finished => "Finished",
            RunState::Terminated => "Terminated",
            RunState::Failed => "Failed",
        }
    }
}

/// Messages sent from the worker to the single consumer on the UI side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started { argv: Vec<String> },
    Line(String),
    ServerAddress(String),
    /// The child exited on its own. `code` is `None` when it died from a signal.
    Finished { code: Option<i32> },
    /// The child was stopped through [`CommandHandle::stop`].
    Terminated,
    Failed(String),
}

impl RunEvent {
    /// True for the last event a worker sends.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunEvent::Finished { .. } | RunEvent::Terminated | RunEvent::Failed(_)
        )
    }
}

#[derive(Debug, Default)]
struct HandleState {
    run_state: RunState,
    address: Option<String>,
    output: String,
}

struct Shared {
    cwd: PathBuf,
    argv: Vec<String>,
    state: Mutex<HandleState>,
    child: Mutex<Option<Child>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| PanelError::Runtime(format!("Failed to acquire {} lock: {}", what, e)))
}

/// Shared view of one running (or finished) invocation.
///
/// Cloning is cheap; every clone observes the same child.
#[derive(Clone)]
pub struct CommandHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandle")
            .field("cwd", &self.shared.cwd)
            .field("argv", &self.shared.argv)
            .field("state", &self.state())
            .finish()
    }
}

impl CommandHandle {
    pub fn argv(&self) -> &[String] {
        &self.shared.argv
    }

    pub fn cwd(&self) -> &Path {
        &self.shared.cwd
    }

    /// Argument vector joined with spaces, as written to the command log.
    pub fn display_command(&self) -> String {
        self.shared.argv.join(" ")
    }

    pub fn state(&self) -> RunState {
        self.shared
            .state
            .lock()
            .map(|s| s.run_state)
            .unwrap_or(RunState::Failed)
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Address from the first `Server running on [...]` line, while Running.
    pub fn server_address(&self) -> Option<String> {
        self.shared
            .state
            .lock()
            .ok()
            .and_then(|s| s.address.clone())
    }

    /// Every line forwarded so far, newline-terminated.
    pub fn output(&self) -> String {
        self.shared
            .state
            .lock()
            .map(|s| s.output.clone())
            .unwrap_or_default()
    }

    /// Ask the child to exit. On Unix this sends `SIGTERM`, which the child
    /// may handle to shut down cleanly.
    ///
    /// Returns `Ok(true)` when a Running child was signalled and the handle
    /// moved to `Terminated`, `Ok(false)` when the handle had already left
    /// Running or the child has already exited (nothing changes). Does not
    /// wait for the child to exit.
    pub fn stop(&self) -> Result<bool> {
        let mut state = lock(&self.shared.state, "state")?;
        if !state.run_state.is_running() {
            return Ok(false);
        }

        {
            let mut child_guard = lock(&self.shared.child, "child")?;
            let Some(child) = child_guard.as_mut() else {
                return Ok(false);
            };
            if child.try_wait().ok().flatten().is_some() {
                return Ok(false);
            }
            request_termination(child).map_err(|e| {
                PanelError::Runtime(format!(
                    "Failed to terminate {}: {}",
                    self.display_command(),
                    e
                ))
            })?;
        }

        state.run_state = RunState::Terminated;
        state.address = None;
        tracing::info!(command = %self.display_command(), "termination requested");
        Ok(true)
    }

    /// Kill the child outright, for a child that ignores [`stop`](Self::stop).
    ///
    /// A child that was never stopped also ends up `Terminated`.
    pub fn force_kill(&self) -> Result<()> {
        let mut state = lock(&self.shared.state, "state")?;
        {
            let mut child_guard = lock(&self.shared.child, "child")?;
            if let Some(child) = child_guard.as_mut() {
                match child.kill() {
                    Ok(()) => {}
                    // Already exited
                    Err(e) if e.kind() == ErrorKind::InvalidInput => {}
                    Err(e) => {
                        return Err(PanelError::Runtime(format!(
                            "Failed to kill {}: {}",
                            self.display_command(),
                            e
                        )))
                    }
                }
            }
        }

        if state.run_state.is_running() {
            state.run_state = RunState::Terminated;
            state.address = None;
        }
        tracing::warn!(command = %self.display_command(), "command killed");
        Ok(())
    }

    /// True once the worker has sent its final event.
    pub fn is_done(&self) -> bool {
        self.shared
            .worker
            .lock()
            .map(|worker| worker.as_ref().map_or(true, JoinHandle::is_finished))
            .unwrap_or(true)
    }

    /// Block until the worker thread has delivered its final event.
    ///
    /// Safe to call more than once; later calls return immediately.
    pub fn wait(&self) -> Result<RunState> {
        let worker = lock(&self.shared.worker, "worker")?.take();
        if let Some(worker) = worker {
            worker
                .join()
                .map_err(|_| PanelError::Runtime("Output worker panicked".to_string()))?;
        }
        Ok(self.state())
    }

    fn record_line(&self, line: &str, scan_address: bool) -> Option<String> {
        let mut state = self.shared.state.lock().ok()?;
        state.output.push_str(line);
        state.output.push('\n');

        if scan_address && state.address.is_none() && state.run_state.is_running() {
            if let Some(address) = detect_server_address(line) {
                state.address = Some(address.clone());
                return Some(address);
            }
        }
        None
    }

    /// Move out of Running into `next`. A handle already stopped keeps its
    /// `Terminated` state. Returns the state the handle ends in.
    fn settle(&self, next: RunState) -> RunState {
        match self.shared.state.lock() {
            Ok(mut state) => {
                if state.run_state.is_running() {
                    state.run_state = next;
                }
                state.address = None;
                state.run_state
            }
            Err(_) => RunState::Failed,
        }
    }

    fn kill_quietly(&self) {
        if let Ok(mut guard) = self.shared.child.lock() {
            if let Some(mut child) = guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }

    /// Poll until the child exits. The child stays in the shared slot until
    /// it has been reaped, so `stop` can signal it the whole time. The lock
    /// is released between polls.
    fn reap(&self) -> io::Result<Option<ExitStatus>> {
        loop {
            {
                let Ok(mut guard) = self.shared.child.lock() else {
                    return Ok(None);
                };
                let Some(child) = guard.as_mut() else {
                    return Ok(None);
                };
                if let Some(status) = child.try_wait()? {
                    guard.take();
                    return Ok(Some(status));
                }
            }
            thread::sleep(REAP_INTERVAL);
        }
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) -> io::Result<()> {
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?;
    // SAFETY: `pid` is a child of this process that has not been reaped yet,
    // so it cannot have been reused.
    if unsafe { libc::kill(pid, libc::SIGTERM) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> io::Result<()> {
    match child.kill() {
        Err(e) if e.kind() == ErrorKind::InvalidInput => Ok(()),
        other => other,
    }
}

/// Call `on_line` for every line of `pipe`, decoding invalid UTF-8 lossily.
/// Stops early when `on_line` returns false.
fn for_each_line<R: Read>(pipe: R, mut on_line: impl FnMut(String) -> bool) -> io::Result<()> {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\n', '\r'])
            .to_string();
        if !on_line(line) {
            return Ok(());
        }
    }
}

/// Spawn `argv` in `cwd` and stream its output to `sink`.
///
/// The directory is checked before anything is spawned. Standard output and
/// standard error are both captured; standard error lines are forwarded with
/// [`STDERR_PREFIX`]. Output from a `serve` invocation is scanned for the
/// listening address.
///
/// Starting while another handle is Running is the caller's responsibility
/// to prevent; nothing here stops a second child from being spawned.
///
/// # Errors
///
/// - [`PanelError::InvalidPath`] if `cwd` is not an existing directory
/// - [`PanelError::Start`] if the argument vector is empty or the
///   executable cannot be spawned
pub fn start_command(cwd: &Path, argv: &[String], sink: Sender<RunEvent>) -> Result<CommandHandle> {
    if !cwd.is_dir() {
        return Err(PanelError::InvalidPath(cwd.to_path_buf()));
    }
    let (program, args) = argv.split_first().ok_or_else(|| PanelError::Start {
        program: String::new(),
        message: "empty argument vector".to_string(),
    })?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PanelError::Start {
            program: program.clone(),
            message: e.to_string(),
        })?;

    let stdout = child.stdout.take().ok_or_else(|| PanelError::Start {
        program: program.clone(),
        message: "failed to capture stdout".to_string(),
    })?;
    let stderr = child.stderr.take();

    let handle = CommandHandle {
        shared: Arc::new(Shared {
            cwd: cwd.to_path_buf(),
            argv: argv.to_vec(),
            state: Mutex::new(HandleState {
                run_state: RunState::Running,
                ..HandleState::default()
            }),
            child: Mutex::new(Some(child)),
            worker: Mutex::new(None),
        }),
    };

    tracing::info!(command = %handle.display_command(), cwd = %cwd.display(), "started command");
    let _ = sink.send(RunEvent::Started {
        argv: argv.to_vec(),
    });

    let scan_address = is_serve(argv);
    let stderr_worker =
        stderr.map(|pipe| spawn_stderr_reader(pipe, handle.clone(), sink.clone()));

    let worker_handle = handle.clone();
    let worker = thread::spawn(move || {
        stream_output(stdout, stderr_worker, worker_handle, sink, scan_address);
    });
    *lock(&handle.shared.worker, "worker")? = Some(worker);

    Ok(handle)
}

fn spawn_stderr_reader<R: Read + Send + 'static>(
    pipe: R,
    handle: CommandHandle,
    sink: Sender<RunEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let result = for_each_line(pipe, |line| {
            let line = format!("{}{}", STDERR_PREFIX, line);
            handle.record_line(&line, false);
            sink.send(RunEvent::Line(line)).is_ok()
        });
        if let Err(e) = result {
            tracing::debug!(error = %e, "stderr stream failed");
        }
    })
}

fn stream_output<R: Read>(
    stdout: R,
    stderr_worker: Option<JoinHandle<()>>,
    handle: CommandHandle,
    sink: Sender<RunEvent>,
    scan_address: bool,
) {
    let result = for_each_line(stdout, |line| {
        let address = handle.record_line(&line, scan_address);
        let _ = sink.send(RunEvent::Line(line));
        if let Some(address) = address {
            tracing::info!(%address, "development server is listening");
            let _ = sink.send(RunEvent::ServerAddress(address));
        }
        true
    });
    if let Err(e) = result {
        let message = format!("Read error: {}", e);
        tracing::warn!(command = %handle.display_command(), %message, "output stream failed");
        handle.kill_quietly();
        handle.settle(RunState::Failed);
        let _ = sink.send(RunEvent::Failed(message));
        return;
    }

    if let Some(stderr_worker) = stderr_worker {
        let _ = stderr_worker.join();
    }

    match handle.reap() {
        Err(e) => {
            let message = format!("Wait error: {}", e);
            let final_state = handle.settle(RunState::Failed);
            let event = if final_state == RunState::Terminated {
                RunEvent::Terminated
            } else {
                RunEvent::Failed(message)
            };
            let _ = sink.send(event);
        }
        Ok(Some(status)) => {
            let final_state = handle.settle(RunState::Finished);
            tracing::info!(command = %handle.display_command(), ?status, "command exited");
            let event = if final_state == RunState::Terminated {
                RunEvent::Terminated
            } else {
                RunEvent::Finished {
                    code: status.code(),
                }
            };
            let _ = sink.send(event);
        }
        Ok(None) => {
            let final_state = handle.settle(RunState::Finished);
            let event = if final_state == RunState::Terminated {
                RunEvent::Terminated
            } else {
                RunEvent::Finished { code: None }
            };
            let _ = sink.send(event);
        }
    }
}
