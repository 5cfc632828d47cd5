//! Search stop control: an external stop flag plus soft and hard deadlines.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides when a running search must wind down.
///
/// The hard deadline aborts mid-search and is consulted together with the
/// external stop flag through [`should_stop`](SearchControl::should_stop);
/// clock reads are amortized to one per 1024 nodes. The soft deadline only
/// gates the start of another iterative-deepening iteration.
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
}

impl SearchControl {
    /// Analysis mode: runs until the stop flag is raised.
    pub fn infinite(stopped: Arc<AtomicBool>) -> SearchControl {
        SearchControl {
            stopped,
            start: Instant::now(),
            soft_limit: None,
            hard_limit: None,
        }
    }

    /// Clock-bound search.
    pub fn timed(stopped: Arc<AtomicBool>, soft: Duration, hard: Duration) -> SearchControl {
        SearchControl {
            stopped,
            start: Instant::now(),
            soft_limit: Some(soft),
            hard_limit: Some(hard),
        }
    }

    /// Whether the search must abort now. Checked near the top of every
    /// search node; the system clock is read only when `nodes` is a
    /// multiple of 1024.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        if nodes % 1024 != 0 {
            return false;
        }
        if let Some(hard) = self.hard_limit
            && self.start.elapsed() >= hard
        {
            // Latch, so off-cycle node counts see the timeout too.
            self.stopped.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Whether starting another iteration is worthwhile. Checked between
    /// iterative-deepening iterations.
    pub fn soft_time_up(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        match self.soft_limit {
            Some(soft) => self.start.elapsed() >= soft,
            None => false,
        }
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::SearchControl;

    #[test]
    fn infinite_never_stops_on_its_own() {
        let control = SearchControl::infinite(Arc::new(AtomicBool::new(false)));
        assert!(!control.should_stop(0));
        assert!(!control.should_stop(1024));
        assert!(!control.soft_time_up());
    }

    #[test]
    fn stop_flag_wins_immediately() {
        let flag = Arc::new(AtomicBool::new(false));
        let control = SearchControl::infinite(Arc::clone(&flag));
        flag.store(true, Ordering::Release);
        assert!(control.should_stop(1)); // off-cycle node count too
        assert!(control.soft_time_up());
    }

    #[test]
    fn expired_hard_limit_latches() {
        let flag = Arc::new(AtomicBool::new(false));
        let control = SearchControl::timed(
            Arc::clone(&flag),
            Duration::ZERO,
            Duration::ZERO,
        );
        // The clock is only read on a 1024-multiple...
        assert!(control.should_stop(1024));
        // ...after which the latched flag answers for every node count.
        assert!(control.should_stop(1));
        assert!(flag.load(Ordering::Acquire));
    }

    #[test]
    fn generous_limits_do_not_fire() {
        let control = SearchControl::timed(
            Arc::new(AtomicBool::new(false)),
            Duration::from_secs(600),
            Duration::from_secs(600),
        );
        assert!(!control.should_stop(1024));
        assert!(!control.soft_time_up());
    }
}
