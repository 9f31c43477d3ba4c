//! In-flight tracking for widgets refreshed from a command.

use std::cell::Cell;

/// One outstanding refresh per widget.
///
/// Timer ticks that arrive while a capture is still queued or running are
/// skipped, so the worker queue never grows past one job per widget. The
/// generation only changes on `cancel`, dropping a result that was overtaken
/// by a synchronous update.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    inflight: Cell<bool>,
    generation: Cell<u64>,
}

impl RefreshGuard {
    /// Generation for a new refresh, or `None` while one is outstanding.
    pub fn begin(&self) -> Option<u64> {
        if self.inflight.get() {
            return None;
        }
        self.inflight.set(true);
        Some(self.generation.get())
    }

    /// Mark the refresh for `gen` finished; `false` means drop its result.
    pub fn finish(&self, gen: u64) -> bool {
        if self.generation.get() != gen {
            return false;
        }
        self.inflight.set(false);
        true
    }

    /// Abandon the outstanding refresh, if any.
    pub fn cancel(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.inflight.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_skipped_while_a_refresh_is_outstanding() {
        let guard = RefreshGuard::default();
        let gen = guard.begin().expect("first refresh");
        for _ in 0..10 {
            assert_eq!(guard.begin(), None);
        }
        assert!(guard.finish(gen));
        assert!(guard.begin().is_some());
    }

    #[test]
    fn cancelled_result_is_dropped_without_blocking_the_next_refresh() {
        let guard = RefreshGuard::default();
        let stale = guard.begin().expect("refresh");
        guard.cancel();
        let fresh = guard.begin().expect("refresh after cancel");
        assert!(!guard.finish(stale));
        assert_eq!(guard.begin(), None);
        assert!(guard.finish(fresh));
        assert_eq!(guard.begin(), Some(fresh));
    }

    #[test]
    fn slow_results_still_apply() {
        let guard = RefreshGuard::default();
        let gen = guard.begin().expect("refresh");
        // Several timer periods pass before the capture returns.
        for _ in 0..5 {
            assert!(guard.begin().is_none());
        }
        assert!(guard.finish(gen));
    }
}
