//! Cooperative cancellation shared between the engine and in-flight jobs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "please stop" flag.
///
/// Cloning yields another handle to the same flag. Once poisoned it stays
/// poisoned for the lifetime of every handle; there is no reset.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    poisoned: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token as poisoned (idempotent)
    pub fn poison(&self) {
        self.poisoned.store(true, Ordering::Release);
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        assert!(!CancellationToken::new().is_poisoned());
    }

    #[test]
    fn poison_is_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        other.poison();
        assert!(token.is_poisoned());
        assert!(other.is_poisoned());
    }

    #[test]
    fn poison_is_idempotent() {
        let token = CancellationToken::new();
        token.poison();
        token.poison();
        assert!(token.is_poisoned());
    }

    #[test]
    fn visible_from_other_threads() {
        let token = CancellationToken::new();
        let worker = token.clone();
        std::thread::spawn(move || worker.poison())
            .join()
            .unwrap();
        assert!(token.is_poisoned());
    }
}
