//! Application state shared by the GUI and the headless commands.
//!
//! A [`Session`] owns what the window shows: the selected project
//! directory, the saved project list, the current command and its event
//! channel, the log mirror, the detected server address and the route set.
//! Worker output only reaches it through [`Session::drain_events`], which
//! runs on the thread that owns the session.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::catalog::{build_argv, is_serve};
use crate::config::Config;
use crate::error::{PanelError, Result};
use crate::process::{start_command, CommandHandle, RunEvent, RunState};
use crate::routes::{export_routes_to_file, filter_routes, list_routes, RouteParse, RouteRecord};
use crate::store::{CommandLog, PathStore};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A dismissible message waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(err: &PanelError) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of trying to save the selected path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

struct ActiveRun {
    handle: CommandHandle,
    events: Receiver<RunEvent>,
    command: String,
}

pub struct Session {
    config: Config,
    path_store: PathStore,
    log: CommandLog,
    project_path: String,
    saved_paths: Vec<String>,
    run: Option<ActiveRun>,
    run_state: RunState,
    server_address: Option<String>,
    log_text: String,
    routes: Vec<RouteRecord>,
    notices: VecDeque<Notice>,
}

impl Session {
    /// Open a session on the files named by `config`.
    ///
    /// A saved list that cannot be read leaves the session with no saved
    /// paths and queues an error notice; the file is left as it is until
    /// the next save.
    pub fn open(config: Config) -> Result<Self> {
        let path_store = PathStore::new(config.paths_file()?);
        let log = CommandLog::new(config.log_file()?);

        let mut session = Self {
            config,
            path_store,
            log,
            project_path: String::new(),
            saved_paths: Vec::new(),
            run: None,
            run_state: RunState::Idle,
            server_address: None,
            log_text: String::new(),
            routes: Vec::new(),
            notices: VecDeque::new(),
        };

        match session.path_store.load() {
            Ok(paths) => session.saved_paths = paths,
            Err(e) => session.notify_error(&e),
        }
        match session.log.read() {
            Ok(content) => session.log_text = content,
            Err(e) => session.notify_error(&e),
        }

        Ok(session)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn notify_error(&mut self, err: &PanelError) {
        tracing::warn!(error = %err, "reporting error");
        self.notices.push_back(Notice::error(err));
    }

    /// Oldest notification not yet shown.
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// Unwrap `result`, turning an error into a queued notice.
    pub fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.notify_error(&e);
                None
            }
        }
    }

    // ========================================================================
    // Project Paths
    // ========================================================================

    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    pub fn project_path_mut(&mut self) -> &mut String {
        &mut self.project_path
    }

    pub fn set_project_path(&mut self, path: impl Into<String>) {
        self.project_path = path.into();
    }

    pub fn saved_paths(&self) -> &[String] {
        &self.saved_paths
    }

    fn checked_project_dir(&self) -> Result<PathBuf> {
        let dir = PathBuf::from(self.project_path.trim());
        if dir.as_os_str().is_empty() || !dir.is_dir() {
            return Err(PanelError::InvalidPath(dir));
        }
        Ok(dir)
    }

    /// Add the selected directory to the saved list, if not already there.
    pub fn save_project_path(&mut self) -> Result<SaveOutcome> {
        self.checked_project_dir()?;
        let path = self.project_path.trim().to_string();
        if self.saved_paths.contains(&path) {
            return Ok(SaveOutcome::AlreadySaved);
        }

        self.saved_paths.push(path);
        if let Err(e) = self.path_store.save(&self.saved_paths) {
            self.saved_paths.pop();
            return Err(e);
        }
        Ok(SaveOutcome::Saved)
    }

    /// Remove `path` from the saved list. Returns whether it was present.
    pub fn remove_saved_path(&mut self, path: &str) -> Result<bool> {
        let Some(index) = self.saved_paths.iter().position(|p| p == path) else {
            return Ok(false);
        };
        let removed = self.saved_paths.remove(index);
        if let Err(e) = self.path_store.save(&self.saved_paths) {
            self.saved_paths.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    // ========================================================================
    // Command Execution
    // ========================================================================

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    pub fn server_address(&self) -> Option<&str> {
        self.server_address.as_deref()
    }

    pub fn current_handle(&self) -> Option<&CommandHandle> {
        self.run.as_ref().map(|run| &run.handle)
    }

    /// Start `command` with `params` in the selected directory.
    ///
    /// Refused while a command is Running.
    pub fn run_command(&mut self, command: &str, params: &str) -> Result<()> {
        if self.is_running() {
            return Err(PanelError::Runtime(
                "A command is already running. Stop it first.".to_string(),
            ));
        }
        let dir = self.checked_project_dir()?;
        let argv = build_argv(command, params, &self.config)?;
        self.start(&dir, argv)
    }

    fn start(&mut self, dir: &Path, argv: Vec<String>) -> Result<()> {
        if !is_serve(&argv) {
            self.server_address = None;
        }
        let (tx, rx) = mpsc::channel();
        let handle = match start_command(dir, &argv, tx) {
            Ok(handle) => handle,
            Err(e) => {
                self.run_state = RunState::Failed;
                self.append_log(&format!("Error: {}", e));
                return Err(e);
            }
        };

        self.run = Some(ActiveRun {
            command: handle.display_command(),
            handle,
            events: rx,
        });
        self.run_state = RunState::Running;
        Ok(())
    }

    /// Terminate the running command. Returns whether anything was stopped.
    pub fn stop_command(&mut self) -> Result<bool> {
        let Some(run) = &self.run else {
            return Ok(false);
        };
        if !run.handle.stop()? {
            return Ok(false);
        }

        self.run_state = RunState::Terminated;
        self.server_address = None;
        self.append_log("Command stopped by user.");
        self.notify(Notice::info("Stopped", "The command has been stopped."));
        Ok(true)
    }

    /// Apply every event the worker has sent since the last call, in order.
    ///
    /// Returns the number of events consumed.
    pub fn drain_events(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(run) = &self.run {
            loop {
                match run.events.try_recv() {
                    Ok(event) => pending.push(event),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
        }

        let count = pending.len();
        for event in pending {
            self.apply_event(event);
        }
        count
    }

    fn apply_event(&mut self, event: RunEvent) {
        let command = self
            .run
            .as_ref()
            .map(|run| run.command.clone())
            .unwrap_or_default();

        match event {
            RunEvent::Started { argv } => {
                self.append_log(&format!("Started: {}", argv.join(" ")));
            }
            RunEvent::Line(line) => {
                self.log_text.push_str(&line);
                self.log_text.push('\n');
            }
            RunEvent::ServerAddress(address) => {
                if self.is_running() {
                    self.server_address = Some(address);
                }
            }
            RunEvent::Finished { code } => {
                if self.is_running() {
                    self.run_state = RunState::Finished;
                }
                self.server_address = None;
                match code {
                    Some(0) | None => self.append_log(&format!("Finished: {}", command)),
                    Some(code) => self.append_log(&format!(
                        "Finished: {} (exit code {})",
                        command, code
                    )),
                }
            }
            RunEvent::Terminated => {
                self.run_state = RunState::Terminated;
                self.server_address = None;
            }
            RunEvent::Failed(message) => {
                self.run_state = RunState::Failed;
                self.server_address = None;
                let err = PanelError::Runtime(message);
                self.append_log(&format!("Error: {}", err));
                self.notify_error(&err);
            }
        }
    }

    // ========================================================================
    // Command Log
    // ========================================================================

    /// Everything shown in the log view.
    pub fn log_text(&self) -> &str {
        &self.log_text
    }

    /// Write a timestamped entry to the log file and the view.
    pub fn append_log(&mut self, text: &str) {
        match self.log.append(text) {
            Ok(entry) => self.log_text.push_str(&entry),
            Err(e) => {
                self.log_text.push_str(text);
                self.log_text.push('\n');
                self.notify_error(&e);
            }
        }
    }

    /// Truncate the log file and view, leaving a single "Logs cleared." entry.
    pub fn clear_log(&mut self) -> Result<()> {
        let marker = self.log.clear(true)?;
        self.log_text = marker.unwrap_or_default();
        Ok(())
    }

    // ========================================================================
    // Routes
    // ========================================================================

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn filtered_routes(&self, query: &str) -> Vec<&RouteRecord> {
        filter_routes(&self.routes, query)
    }

    /// Replace the route set with a fresh listing of the selected project.
    ///
    /// Output that cannot be parsed empties the table without an error.
    /// Returns the number of routes loaded.
    pub fn refresh_routes(&mut self) -> Result<usize> {
        let dir = self.checked_project_dir()?;
        self.routes = match list_routes(&dir, &self.config) {
            Ok(RouteParse::Parsed(records)) => records,
            Ok(RouteParse::Unparseable(_)) => Vec::new(),
            Err(e) => {
                self.routes.clear();
                return Err(e);
            }
        };
        Ok(self.routes.len())
    }

    pub fn export_routes(&self, path: &Path) -> Result<()> {
        export_routes_to_file(&self.routes, path)
    }
}
