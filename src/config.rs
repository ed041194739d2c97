use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data directories.
const APP_DIR_NAME: &str = "artisan-panel";

const CONFIG_FILENAME: &str = "config.toml";
const PATHS_FILENAME: &str = "projects.json";
const LOG_FILENAME: &str = "command_log.txt";

// ============================================================================
// Tool Configuration
// ============================================================================

/// Which executables to invoke and where the panel keeps its files.
///
/// Every field has a serde default, so a partial or empty `config.toml`
/// is valid.
///
/// # Example
///
/// ```toml
/// php = "/usr/local/bin/php"
/// composer = "composer"
/// disable_xdebug = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// PHP interpreter used to run the artisan script.
    #[serde(default = "default_php")]
    pub php: String,

    /// Artisan script, relative to the project directory.
    #[serde(default = "default_artisan")]
    pub artisan: String,

    /// Dependency manager executable.
    #[serde(default = "default_composer")]
    pub composer: String,

    /// Pass `-d xdebug.mode=off` to PHP when listing routes.
    #[serde(default = "default_true")]
    pub disable_xdebug: bool,

    /// Where `projects.json` and `command_log.txt` live.
    /// Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_php() -> String {
    "php".to_string()
}

fn default_artisan() -> String {
    "artisan".to_string()
}

fn default_composer() -> String {
    "composer".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            php: default_php(),
            artisan: default_artisan(),
            composer: default_composer(),
            disable_xdebug: true,
            data_dir: None,
        }
    }
}

impl Config {
    /// Directory holding the saved project list and command log.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    /// Path of the saved project list.
    pub fn paths_file(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(PATHS_FILENAME))
    }

    /// Path of the command log.
    pub fn log_file(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(LOG_FILENAME))
    }

    /// Config rooted at `dir` with default tools. Used by tests and
    /// callers that manage their own storage location.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// Written when no config file exists yet.
const DEFAULT_CONFIG_WITH_COMMENTS: &str = r#"# artisan-panel configuration

# PHP interpreter used to run artisan
php = "php"

# Artisan script, relative to the selected project directory
artisan = "artisan"

# Dependency manager executable
composer = "composer"

# Disable Xdebug while listing routes (php -d xdebug.mode=off)
disable_xdebug = true

# Where the saved project list and command log are stored.
# Defaults to the platform data directory.
# data_dir = "/home/me/.local/share/artisan-panel"
"#;

/// Get the config directory path (e.g. `~/.config/artisan-panel/`).
///
/// Does not create the directory.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| PanelError::Config("Could not determine config directory".to_string()))?;
    Ok(base.join(APP_DIR_NAME))
}

/// Get the default data directory path (e.g. `~/.local/share/artisan-panel/`).
pub fn default_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| PanelError::Config("Could not determine data directory".to_string()))?;
    Ok(base.join(APP_DIR_NAME))
}

/// Get the path to the config file.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILENAME))
}

/// Load the configuration from the user config directory.
///
/// If the file doesn't exist it is created with commented defaults.
pub fn load_config() -> Result<Config> {
    load_config_at(&config_path()?)
}

/// Load the configuration from an explicit file path.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The file cannot be read or written
/// - The file contains invalid TOML
pub fn load_config_at(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, DEFAULT_CONFIG_WITH_COMMENTS)?;
        tracing::debug!(path = %config_path.display(), "wrote default config");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&content).map_err(|e| {
        PanelError::Config(format!(
            "Failed to parse config file at {:?}: {}",
            config_path, e
        ))
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_dir_ends_with_app_name() {
        if let Ok(dir) = config_dir() {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }

    #[test]
    fn test_load_config_at_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILENAME);

        let config = load_config_at(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("disable_xdebug = true"));
    }

    #[test]
    fn test_default_config_text_parses_to_default() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_WITH_COMMENTS).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "php = \"/opt/php83/bin/php\"\n").unwrap();

        let config = load_config_at(&path).unwrap();

        assert_eq!(config.php, "/opt/php83/bin/php");
        assert_eq!(config.artisan, "artisan");
        assert_eq!(config.composer, "composer");
        assert!(config.disable_xdebug);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "php = [unterminated").unwrap();

        let err = load_config_at(&path).unwrap_err();
        assert!(matches!(err, PanelError::Config(_)));
    }

    #[test]
    fn test_data_dir_override_drives_file_paths() {
        let config = Config::with_data_dir("/tmp/panel-data");
        assert_eq!(
            config.paths_file().unwrap(),
            PathBuf::from("/tmp/panel-data/projects.json")
        );
        assert_eq!(
            config.log_file().unwrap(),
            PathBuf::from("/tmp/panel-data/command_log.txt")
        );
    }
}
