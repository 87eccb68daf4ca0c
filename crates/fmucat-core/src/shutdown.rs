//! Ctrl-C handling: finish the current item, save, then stop

use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::{SIGINT, SIGTERM};

static STOP: AtomicBool = AtomicBool::new(false);

/// Raised by the first SIGINT/SIGTERM. Batch runners poll it between items.
pub fn shutdown_flag() -> &'static AtomicBool {
    &STOP
}

pub fn is_shutdown_requested() -> bool {
    STOP.load(Ordering::Relaxed)
}

/// Route SIGINT/SIGTERM to the stop flag. A second signal exits with 130.
pub fn install_signal_handlers() -> std::io::Result<()> {
    for signal in [SIGINT, SIGTERM] {
        // SAFETY: the handler only swaps an atomic and calls process::exit
        unsafe {
            signal_hook::low_level::register(signal, || {
                if STOP.swap(true, Ordering::Relaxed) {
                    std::process::exit(130);
                }
            })?;
        }
    }
    Ok(())
}
