//! Route listing: run `route:list`, parse its output, filter and export it.

mod export;
mod filter;
mod parse;

pub use export::{export_routes_to_file, format_routes_table, write_routes};
pub use filter::filter_routes;
pub use parse::{parse_route_output, parse_route_table, RouteParse, RouteRecord};

use std::path::Path;
use std::process::{Command, Stdio};

use crate::catalog::route_list_argv;
use crate::config::Config;
use crate::error::{PanelError, Result};

/// Run the framework's route listing in `cwd` and parse the result.
///
/// Blocks until the listing exits.
pub fn list_routes(cwd: &Path, config: &Config) -> Result<RouteParse> {
    list_routes_with(cwd, &route_list_argv(config))
}

/// [`list_routes`] with an explicit argument vector.
///
/// # Errors
///
/// - [`PanelError::InvalidPath`] if `cwd` is not an existing directory;
///   nothing is spawned
/// - [`PanelError::Start`] if the executable cannot be spawned
/// - [`PanelError::RouteList`] if standard output is empty and the tool
///   either wrote to standard error or exited unsuccessfully
pub fn list_routes_with(cwd: &Path, argv: &[String]) -> Result<RouteParse> {
    if !cwd.is_dir() {
        return Err(PanelError::InvalidPath(cwd.to_path_buf()));
    }
    let (program, args) = argv.split_first().ok_or_else(|| PanelError::Start {
        program: String::new(),
        message: "empty argument vector".to_string(),
    })?;

    tracing::debug!(command = %argv.join(" "), cwd = %cwd.display(), "listing routes");
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| PanelError::Start {
            program: program.clone(),
            message: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if stdout.trim().is_empty() {
        if !stderr.trim().is_empty() {
            return Err(PanelError::RouteList(stderr.trim().to_string()));
        }
        if !output.status.success() {
            return Err(PanelError::RouteList(format!(
                "route listing exited with {}",
                output.status
            )));
        }
    }

    let parsed = parse_route_output(&stdout);
    if let RouteParse::Unparseable(_) = &parsed {
        tracing::warn!(cwd = %cwd.display(), "route output was not understood");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_missing_directory_is_invalid_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = list_routes(&missing, &Config::default()).unwrap_err();
        assert!(matches!(err, PanelError::InvalidPath(_)));
    }

    #[test]
    fn test_missing_executable_is_start_error() {
        let temp_dir = TempDir::new().unwrap();
        let argv = vec!["no-such-php-binary-1234".to_string()];
        assert!(matches!(
            list_routes_with(temp_dir.path(), &argv),
            Err(PanelError::Start { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_json_listing_is_parsed() {
        let temp_dir = TempDir::new().unwrap();
        let script = r#"echo '[{"method":"GET|HEAD","uri":"api/users","name":"users.index","action":"UserController@index"}]'"#;

        let routes = list_routes_with(temp_dir.path(), &sh(script))
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(
            routes,
            vec![RouteRecord::new(
                "GET|HEAD",
                "api/users",
                "users.index",
                "UserController@index"
            )]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_table_listing_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let script = "printf 'Method URI Action\\nGET /users UserController@index\\n'";

        let parsed = list_routes_with(temp_dir.path(), &sh(script)).unwrap();

        assert_eq!(
            parsed,
            RouteParse::Parsed(vec![RouteRecord::new(
                "GET",
                "/users",
                "",
                "UserController@index"
            )])
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_stderr_without_stdout_is_route_list_error() {
        let temp_dir = TempDir::new().unwrap();
        let script = "echo 'Could not open input file: artisan' >&2; exit 1";

        match list_routes_with(temp_dir.path(), &sh(script)) {
            Err(PanelError::RouteList(msg)) => {
                assert_eq!(msg, "Could not open input file: artisan")
            }
            other => panic!("expected RouteList, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_failure_is_route_list_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            list_routes_with(temp_dir.path(), &sh("exit 2")),
            Err(PanelError::RouteList(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_output_degrades_to_unparseable() {
        let temp_dir = TempDir::new().unwrap();
        let parsed = list_routes_with(temp_dir.path(), &sh("echo 'nothing useful'")).unwrap();

        assert!(!parsed.is_parsed());
        assert!(parsed.into_records().is_empty());
    }
}
