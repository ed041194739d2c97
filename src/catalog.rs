//! The fixed list of artisan and composer commands offered by the panel, and
//! conversion of a selected command plus free-form parameters into an
//! argument vector.

use crate::config::Config;
use crate::error::{PanelError, Result};

/// Commands shown in the command picker, in display order.
pub const COMMANDS: &[&str] = &[
    "serve",
    "migrate",
    "migrate:rollback",
    "make:controller",
    "make:model",
    "make:migration",
    "make:seeder",
    "make:request",
    "make:middleware",
    "make:event",
    "route:list",
    "cache:clear",
    "config:clear",
    "view:clear",
    "optimize",
    "composer install",
    "composer update",
    "composer require",
    "composer dump-autoload",
];

const COMPOSER_WORD: &str = "composer";
const SERVE_WORD: &str = "serve";

/// Which CLI a catalog command is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Artisan,
    Composer,
}

impl Tool {
    pub fn for_command(command: &str) -> Self {
        if command.contains(COMPOSER_WORD) {
            Tool::Composer
        } else {
            Tool::Artisan
        }
    }
}

/// Build the argument vector for `command` with whitespace-separated `params`.
///
/// Composer commands become `[composer, <words after "composer">..., params...]`;
/// everything else becomes `[php, artisan, command, params...]`.
pub fn build_argv(command: &str, params: &str, config: &Config) -> Result<Vec<String>> {
    let command = command.trim();
    if command.is_empty() {
        return Err(PanelError::Runtime("No command selected".to_string()));
    }

    let mut argv = match Tool::for_command(command) {
        Tool::Composer => {
            let mut argv = vec![config.composer.clone()];
            argv.extend(
                command
                    .split_whitespace()
                    .filter(|word| *word != COMPOSER_WORD)
                    .map(str::to_string),
            );
            argv
        }
        Tool::Artisan => vec![
            config.php.clone(),
            config.artisan.clone(),
            command.to_string(),
        ],
    };
    argv.extend(params.split_whitespace().map(str::to_string));
    Ok(argv)
}

/// True when the invocation launches the development server, which is the
/// only case where output is scanned for a listening address.
pub fn is_serve(argv: &[String]) -> bool {
    argv.iter().any(|arg| arg == SERVE_WORD)
}

/// Argument vector for the structured route listing.
pub fn route_list_argv(config: &Config) -> Vec<String> {
    let mut argv = vec![config.php.clone()];
    if config.disable_xdebug {
        argv.push("-d".to_string());
        argv.push("xdebug.mode=off".to_string());
    }
    argv.extend(
        [config.artisan.as_str(), "route:list", "--json", "--no-ansi"]
            .iter()
            .map(|s| s.to_string()),
    );
    argv
}
