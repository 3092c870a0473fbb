//! Port for cooperative cancellation of template resolution (spec §5).

/// Checked between `{{...}}` substitutions during `resolve`.
pub trait CancellationToken: Send + Sync {
    /// True if the caller has requested cancellation.
    fn is_cancelled(&self) -> bool;
}

/// A token that never cancels; the default when a caller doesn't supply one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn never_cancelled_is_always_false() {
        let token = NeverCancelled;
        assert!(!token.is_cancelled());
    }

    struct FlagToken(AtomicBool);

    impl CancellationToken for FlagToken {
        fn is_cancelled(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn flag_token_reflects_flag() {
        let token = FlagToken(AtomicBool::new(false));
        assert!(!token.is_cancelled());
        token.0.store(true, Ordering::SeqCst);
        assert!(token.is_cancelled());
    }
}
