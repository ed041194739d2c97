//! Fixed-width text export of the route table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::parse::RouteRecord;
use crate::error::{PanelError, Result};

const SEPARATOR_WIDTH: usize = 100;

fn format_row(method: &str, uri: &str, name: &str, action: &str) -> String {
    format!("{:<10} {:<50} {:<30} {}", method, uri, name, action)
}

/// Write the header, a separator line and one row per route.
pub fn write_routes<W: Write>(records: &[RouteRecord], writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", format_row("Method", "URI", "Name", "Action"))?;
    writeln!(writer, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    for route in records {
        writeln!(
            writer,
            "{}",
            format_row(&route.method, &route.uri, &route.name, &route.action)
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// The export as a string, for terminal display.
pub fn format_routes_table(records: &[RouteRecord]) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail
    let _ = write_routes(records, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Export `records` to `path`, replacing any existing file.
///
/// An empty route set is refused so an export never silently produces a
/// header-only file.
pub fn export_routes_to_file(records: &[RouteRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(PanelError::Runtime(
            "No routes data available. Please refresh routes first.".to_string(),
        ));
    }
    let file = File::create(path).map_err(|e| {
        PanelError::Persistence(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write_routes(records, &mut writer)?;
    tracing::info!(count = records.len(), path = %path.display(), "exported routes");
    Ok(())
}
