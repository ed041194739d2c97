//! GUI command handler.

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::ui::gui::run_gui;

/// Open the panel window and block until it is closed.
pub fn gui_command(config: Config) -> Result<()> {
    let session = Session::open(config)?;
    tracing::debug!(saved = session.saved_paths().len(), "opening window");
    run_gui(session)
}
