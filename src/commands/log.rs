//! Command log handlers.

use crate::config::Config;
use crate::error::Result;
use crate::output::{print_success, GRAY, RESET};
use crate::session::Session;

pub fn log_show_command(config: Config) -> Result<()> {
    let session = Session::open(config)?;
    if session.log_text().is_empty() {
        println!("{GRAY}The command log is empty.{RESET}");
    } else {
        print!("{}", session.log_text());
    }
    Ok(())
}

pub fn log_clear_command(config: Config) -> Result<()> {
    let mut session = Session::open(config)?;
    session.clear_log()?;
    print_success("Logs cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CommandLog;
    use tempfile::TempDir;

    #[test]
    fn test_clear_leaves_single_marker() {
        let data = TempDir::new().unwrap();
        let config = Config::with_data_dir(data.path());
        let log = CommandLog::new(config.log_file().unwrap());
        log.append("Started: php artisan migrate").unwrap();
        log.append("Finished: php artisan migrate").unwrap();

        log_clear_command(config).unwrap();

        let content = log.read().unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.trim_end().ends_with("Logs cleared."));
    }
}
