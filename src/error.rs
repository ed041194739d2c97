use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Not an existing directory: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to start {program}: {message}")]
    Start { program: String, message: String },

    #[error("Command failed while running: {0}")]
    Runtime(String),

    #[error("Failed to get routes: {0}")]
    RouteList(String),

    #[error("Route output could not be parsed: {0}")]
    ParseWarning(String),

    #[error("Could not access saved data: {0}")]
    Persistence(String),

    #[error("Saved project list at {path:?} is malformed: {message}")]
    MalformedPaths { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GUI error: {0}")]
    Gui(String),

    #[error("Failed to register signal handler: {0}")]
    SignalHandler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PanelError {
    /// Short heading for the notification that reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            PanelError::InvalidPath(_) => "Invalid project path",
            PanelError::Start { .. } => "Could not start command",
            PanelError::Runtime(_) => "Command failed",
            PanelError::RouteList(_) => "Could not list routes",
            PanelError::ParseWarning(_) => "Unreadable route output",
            PanelError::Persistence(_) | PanelError::MalformedPaths { .. } => {
                "Could not access saved data"
            }
            PanelError::Config(_) => "Configuration error",
            PanelError::Gui(_) => "Window error",
            PanelError::SignalHandler(_) => "Signal handler error",
            PanelError::Io(_) | PanelError::Json(_) => "Error",
        }
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_message_names_the_path() {
        let err = PanelError::InvalidPath(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Not an existing directory: /no/such/dir");
        assert_eq!(err.title(), "Invalid project path");
    }

    #[test]
    fn test_start_error_carries_os_message() {
        let err = PanelError::Start {
            program: "php".into(),
            message: "No such file or directory (os error 2)".into(),
        };
        assert!(err.to_string().contains("php"));
        assert!(err.to_string().contains("os error 2"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PanelError = io.into();
        assert!(matches!(err, PanelError::Io(_)));
    }
}
