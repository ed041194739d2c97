//! Routes command handler.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::output::{print_route_count, print_success, print_warning, spinner};
use crate::routes::{export_routes_to_file, format_routes_table, RouteRecord};
use crate::session::Session;

/// Options for the `routes` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RoutesOptions<'a> {
    pub filter: Option<&'a str>,
    pub export: Option<&'a Path>,
}

/// List the routes of the project at `path`, optionally filtered, and
/// print them as the export table. Returns the routes shown.
///
/// With `export`, the shown routes are also written to that file.
pub fn routes_command(
    config: Config,
    path: &Path,
    options: RoutesOptions<'_>,
) -> Result<Vec<RouteRecord>> {
    let mut session = Session::open(config)?;
    session.set_project_path(path.display().to_string());

    let progress = spinner("Listing routes...");
    let listed = session.refresh_routes();
    progress.finish_and_clear();
    let total = listed?;

    if total == 0 {
        print_warning("No routes found. The route listing returned nothing usable.");
        return Ok(Vec::new());
    }

    let shown: Vec<RouteRecord> = session
        .filtered_routes(options.filter.unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    print!("{}", format_routes_table(&shown));
    print_route_count(shown.len(), total);

    if let Some(target) = options.export {
        export_routes_to_file(&shown, target)?;
        print_success(&format!("Routes exported to {}", target.display()));
    }
    Ok(shown)
}
