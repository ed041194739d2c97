//! artisan-panel entry point.
//!
//! Parses command-line arguments, sets up logging and dispatches to the
//! command handlers. Without a subcommand the window opens.

use std::io;
use std::path::PathBuf;

use artisan_panel::commands::{
    gui_command, log_clear_command, log_show_command, projects_add_command,
    projects_list_command, projects_remove_command, routes_command, run_command, RoutesOptions,
};
use artisan_panel::config::load_config;
use artisan_panel::output::print_error;
use artisan_panel::{PanelError, RunState};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

const BIN_NAME: &str = "artisan-panel";

#[derive(Parser)]
#[command(name = "artisan-panel")]
#[command(
    version,
    about = "Run artisan and composer commands and browse routes of Laravel projects",
    after_help = "EXAMPLES:
    # Open the window
    artisan-panel

    # Run a migration without the window
    artisan-panel run --path ~/code/shop migrate --force

    # Print the routes containing \"api\" and save them
    artisan-panel routes --path ~/code/shop --filter api --export routes.txt"
)]
struct Cli {
    /// Log diagnostics to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the control panel window
    Gui,

    /// Manage saved project paths
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Run a command in a project and stream its output
    #[command(after_help = "EXAMPLES:
    artisan-panel run --path . migrate:fresh --seed
    artisan-panel run --path . \"composer install\"
    artisan-panel run --path . serve          # Ctrl+C stops the server")]
    Run {
        /// Laravel project directory
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Catalog command, e.g. migrate or \"composer update\"
        command: String,

        /// Extra parameters appended after the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        params: Vec<String>,
    },

    /// List the routes of a project
    Routes {
        /// Laravel project directory
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only show routes whose method, URI, name or action contain this text
        #[arg(long)]
        filter: Option<String>,

        /// Also write the shown routes to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show or clear the command log
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Output shell completion script to stdout
    #[command(hide = true)]
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ProjectsAction {
    /// List saved project paths
    List,
    /// Save a project path
    Add { path: PathBuf },
    /// Remove a saved project path
    Remove { path: PathBuf },
}

#[derive(Subcommand)]
enum LogAction {
    /// Print the command log
    Show,
    /// Truncate the command log
    Clear,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(command: Commands) -> Result<RunState, PanelError> {
    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
        return Ok(RunState::Idle);
    }

    let config = load_config()?;
    tracing::debug!(data_dir = ?config.data_dir().ok(), "configuration loaded");

    match command {
        Commands::Gui => gui_command(config).map(|_| RunState::Idle),
        Commands::Projects { action } => match action {
            ProjectsAction::List => projects_list_command(config),
            ProjectsAction::Add { path } => projects_add_command(config, &path).map(|_| ()),
            ProjectsAction::Remove { path } => projects_remove_command(config, &path).map(|_| ()),
        }
        .map(|_| RunState::Idle),
        Commands::Run {
            path,
            command,
            params,
        } => run_command(config, &path, &command, &params),
        Commands::Routes {
            path,
            filter,
            export,
        } => routes_command(
            config,
            &path,
            RoutesOptions {
                filter: filter.as_deref(),
                export: export.as_deref(),
            },
        )
        .map(|_| RunState::Idle),
        Commands::Log { action } => match action {
            LogAction::Show => log_show_command(config),
            LogAction::Clear => log_clear_command(config),
        }
        .map(|_| RunState::Idle),
        Commands::Completions { .. } => Ok(RunState::Idle),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli.command.unwrap_or(Commands::Gui)) {
        Ok(RunState::Failed) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_gui() {
        let cli = Cli::try_parse_from(["artisan-panel"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_run_collects_trailing_params() {
        let cli = Cli::try_parse_from([
            "artisan-panel",
            "run",
            "--path",
            "/srv/app",
            "migrate",
            "--force",
            "--seed",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Run {
                path,
                command,
                params,
            }) => {
                assert_eq!(path, PathBuf::from("/srv/app"));
                assert_eq!(command, "migrate");
                assert_eq!(params, vec!["--force", "--seed"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_routes_options() {
        let cli = Cli::try_parse_from([
            "artisan-panel",
            "routes",
            "--filter",
            "api",
            "--export",
            "out.txt",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Routes {
                path,
                filter,
                export,
            }) => {
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(filter.as_deref(), Some("api"));
                assert_eq!(export, Some(PathBuf::from("out.txt")));
            }
            _ => panic!("expected routes"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["artisan-panel", "log", "show", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Some(Commands::Log {
                action: LogAction::Show
            })
        ));
    }

    #[test]
    fn test_projects_add_requires_path() {
        assert!(Cli::try_parse_from(["artisan-panel", "projects", "add"]).is_err());
    }

    #[test]
    fn test_completions_hidden_and_parse_shell() {
        let cli = Cli::try_parse_from(["artisan-panel", "completions", "zsh"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Completions { shell: Shell::Zsh })
        ));

        let help = Cli::command().render_help().to_string();
        assert!(!help.contains("completions"));
    }

    #[test]
    fn test_completion_script_mentions_subcommands() {
        let mut buf = Vec::new();
        clap_complete::generate(Shell::Bash, &mut Cli::command(), BIN_NAME, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("routes"));
        assert!(script.contains("projects"));
    }
}
