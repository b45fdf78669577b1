//! Process shutdown state.
//!
//! `SHUTDOWN` is set once Ctrl+C is received. The coordinator is notified
//! through the channel returned by `setup_shutdown_handler`.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{self, Receiver};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// The first Ctrl+C requests a graceful stop; a second one exits immediately.
pub fn setup_shutdown_handler() -> anyhow::Result<Receiver<()>> {
    let (tx, rx) = channel::bounded(1);

    ctrlc::set_handler(move || {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        crate::log!("serve"; "shutting down...");
        let _ = tx.try_send(());
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    Ok(rx)
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
