//! Ctrl+C handling for the headless `run` command.
//!
//! The handler only records that an interrupt arrived; the command loop
//! polls the flag and stops the child itself, so the log entry and the
//! terminal state are written the same way as a Stop from the window.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{PanelError, Result};

#[derive(Clone)]
pub struct SignalHandler {
    interrupts: Arc<AtomicUsize>,
}

impl SignalHandler {
    /// Register the process-wide SIGINT handler.
    ///
    /// # Errors
    ///
    /// [`PanelError::SignalHandler`] if a handler is already installed or
    /// the platform refuses it.
    pub fn new() -> Result<Self> {
        let handler = Self::unregistered();
        let interrupts = Arc::clone(&handler.interrupts);

        ctrlc::set_handler(move || {
            interrupts.fetch_add(1, Ordering::SeqCst);
        })
        .map_err(|e| PanelError::SignalHandler(e.to_string()))?;

        Ok(handler)
    }

    /// A handler that never sees real signals.
    pub(crate) fn unregistered() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.interrupt_count() > 0
    }

    /// Number of interrupts received so far. A second Ctrl+C means the
    /// user no longer wants to wait for the child to exit.
    pub fn interrupt_count(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn simulate_interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }
}
