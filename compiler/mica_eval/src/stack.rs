//! Stack safety for deep recursion.
//!
//! Uses the `stacker` crate to grow the host stack before each function
//! body is entered. This is the evaluator's single suspension point: the
//! logical recursion depth is bounded separately by the stack-trace cap.

/// Ensure sufficient host stack space is available before executing `f`.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (100KB red zone).
    const RED_ZONE: usize = 100 * 1024;

    /// Stack space to allocate when growing (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
