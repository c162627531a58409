//! Graceful shutdown support via atomic flag

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Interrupt flag observed by the job executor's control loop.
///
/// Set from a signal handler (or a test) to request that a running batch stop.
pub type InterruptFlag = Arc<AtomicBool>;

/// Create a fresh, unset interrupt flag
pub fn interrupt_flag() -> InterruptFlag {
    Arc::new(AtomicBool::new(false))
}

/// Check if an interrupt was requested
pub fn is_interrupted(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Relaxed)
}

/// Route SIGINT/SIGTERM into a new interrupt flag.
///
/// First signal: set the flag so the running batch can stop cooperatively.
/// Second signal: force exit with 130.
pub fn install_interrupt_handler() -> std::io::Result<InterruptFlag> {
    let flag = interrupt_flag();
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        let handler_flag = flag.clone();
        // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
        unsafe {
            signal_hook::low_level::register(signal, move || {
                if handler_flag.swap(true, Ordering::Relaxed) {
                    std::process::exit(130);
                }
            })?;
        }
    }
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flag_is_clear() {
        let flag = interrupt_flag();
        assert!(!is_interrupted(&flag));
        flag.store(true, Ordering::Relaxed);
        assert!(is_interrupted(&flag));
    }
}
