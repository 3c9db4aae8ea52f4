//! Ctrl+C handling for graceful shutdown.
//!
//! An `AtomicBool` shared with the walker and the hashing workers is set
//! when the user interrupts. No new file is hashed after that point; the
//! groups built so far are reported with a partial marker and the process
//! exits with status 130.
//!
//! ```rust,no_run
//! use dupscan::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let flag = handler.get_flag();
//! // Pass `flag` to FinderConfig::with_shutdown_flag
//! # let _ = flag;
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown manually.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clone of the flag for the finder and its workers.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag so the handler can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: Mutex<Option<ShutdownHandler>> = Mutex::new(None);

/// Install the Ctrl+C handler, or reuse the one already installed.
///
/// The process-wide hook can only be registered once; later calls (e.g.
/// several `run_app` invocations in one test binary) get the same handler
/// back with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError`] if the OS refuses the hook.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let mut slot = GLOBAL_HANDLER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(handler) = slot.as_ref() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Finishing with a partial report..."
        );
        log::info!("Shutdown signal received");
    })?;

    *slot = Some(handler.clone());
    Ok(handler)
}
