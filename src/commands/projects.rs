//! Projects command handlers.
//!
//! Manage the saved project list from the terminal. The list is the same
//! file the window reads.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::output::{print_notice, print_saved_paths, print_success, print_warning, BOLD, RESET};
use crate::session::{SaveOutcome, Session};

fn open_session(config: Config) -> Result<Session> {
    let mut session = Session::open(config)?;
    while let Some(notice) = session.dismiss_notice() {
        print_notice(&notice);
    }
    Ok(session)
}

/// Absolute form of `path` when it exists, otherwise the path as typed.
fn normalize(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

pub fn projects_list_command(config: Config) -> Result<()> {
    let session = open_session(config)?;
    println!("{BOLD}Saved project paths:{RESET}");
    print_saved_paths(session.saved_paths());
    Ok(())
}

pub fn projects_add_command(config: Config, path: &Path) -> Result<SaveOutcome> {
    let mut session = open_session(config)?;
    let path = normalize(path);
    session.set_project_path(path.as_str());

    let outcome = session.save_project_path()?;
    match outcome {
        SaveOutcome::Saved => print_success(&format!("Saved {}", path)),
        SaveOutcome::AlreadySaved => print_warning(&format!("{} is already saved", path)),
    }
    Ok(outcome)
}

/// Remove `path`, matching either the text as given or its absolute form.
pub fn projects_remove_command(config: Config, path: &Path) -> Result<bool> {
    let mut session = open_session(config)?;
    let as_given = path.display().to_string();

    let removed = session.remove_saved_path(&as_given)? || {
        let normalized = normalize(path);
        normalized != as_given && session.remove_saved_path(&normalized)?
    };
    if removed {
        print_success(&format!("Removed {}", as_given));
    } else {
        print_warning(&format!("{} is not in the saved list", as_given));
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_then_remove() {
        let data = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let config = Config::with_data_dir(data.path());

        assert_eq!(
            projects_add_command(config.clone(), project.path()).unwrap(),
            SaveOutcome::Saved
        );
        assert_eq!(
            projects_add_command(config.clone(), project.path()).unwrap(),
            SaveOutcome::AlreadySaved
        );
        assert!(projects_remove_command(config.clone(), project.path()).unwrap());
        assert!(!projects_remove_command(config.clone(), project.path()).unwrap());

        let session = Session::open(config).unwrap();
        assert!(session.saved_paths().is_empty());
    }

    #[test]
    fn test_add_stores_absolute_path() {
        let data = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let config = Config::with_data_dir(data.path());

        projects_add_command(config.clone(), project.path()).unwrap();

        let session = Session::open(config).unwrap();
        assert_eq!(session.saved_paths(), &[normalize(project.path())]);
        assert!(Path::new(&session.saved_paths()[0]).is_absolute());
    }

    #[test]
    fn test_add_missing_directory_fails() {
        let data = TempDir::new().unwrap();
        let config = Config::with_data_dir(data.path());
        let missing = data.path().join("gone");

        assert!(projects_add_command(config, &missing).is_err());
    }
}
