//! Sliding click window.
//!
//! An ordered sequence of qualifying-input timestamps (epoch milliseconds,
//! most recent last), pruned to the trailing window on every update. Owned
//! exclusively by the escalation engine.

use std::collections::VecDeque;

/// Sliding window of qualifying-input timestamps.
#[derive(Debug, Clone)]
pub struct ClickWindow {
    window_ms: u64,
    stamps: VecDeque<u64>,
}

impl ClickWindow {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            stamps: VecDeque::new(),
        }
    }

    /// Record an input at `now` and prune; returns the pruned length.
    ///
    /// Timestamps are kept non-decreasing: a stamp earlier than the latest
    /// recorded one is clamped forward to it.
    pub fn record(&mut self, now_ms: u64) -> usize {
        let now_ms = self.stamps.back().map_or(now_ms, |&last| now_ms.max(last));
        self.stamps.push_back(now_ms);
        self.prune(now_ms);
        self.stamps.len()
    }

    /// Drop every stamp older than the window relative to `now`.
    pub fn prune(&mut self, now_ms: u64) {
        while let Some(&oldest) = self.stamps.front() {
            if now_ms.saturating_sub(oldest) <= self.window_ms {
                break;
            }
            self.stamps.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    pub fn latest(&self) -> Option<u64> {
        self.stamps.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.stamps.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn record_counts_within_window() {
        let mut w = ClickWindow::new(8_000);
        for i in 0..5 {
            w.record(1_000 + i * 100);
        }
        assert_eq!(w.len(), 5);
    }

    #[test]
    fn prune_drops_stale_stamps() {
        let mut w = ClickWindow::new(8_000);
        w.record(0);
        w.record(1_000);
        assert_eq!(w.record(9_500), 2); // 1_000 and 9_500 survive
        assert_eq!(w.record(20_000), 1); // fresh burst
    }

    #[test]
    fn boundary_stamp_survives() {
        let mut w = ClickWindow::new(8_000);
        w.record(0);
        // Exactly window_ms old is still inside the window.
        assert_eq!(w.record(8_000), 2);
        assert_eq!(w.record(8_001), 2);
    }

    #[test]
    fn out_of_order_stamp_is_clamped() {
        let mut w = ClickWindow::new(8_000);
        w.record(5_000);
        w.record(4_000);
        assert_eq!(w.latest(), Some(5_000));
        let stamps: Vec<u64> = w.iter().collect();
        assert!(stamps.windows(2).all(|p| p[0] <= p[1]));
    }

    #[test]
    fn clear_empties() {
        let mut w = ClickWindow::new(8_000);
        w.record(1);
        w.record(2);
        w.clear();
        assert!(w.is_empty());
    }

    proptest! {
        #[test]
        fn never_holds_a_stamp_older_than_the_window(
            deltas in prop::collection::vec(0u64..20_000, 1..200)
        ) {
            let mut w = ClickWindow::new(8_000);
            let mut now = 0u64;
            for d in deltas {
                now += d;
                w.record(now);
                prop_assert!(w.iter().all(|t| now - t <= 8_000));
                prop_assert!(w.len() >= 1);
            }
        }

        #[test]
        fn stamps_stay_ordered(
            stamps in prop::collection::vec(0u64..100_000, 1..100)
        ) {
            let mut w = ClickWindow::new(8_000);
            for s in stamps {
                w.record(s);
                let v: Vec<u64> = w.iter().collect();
                prop_assert!(v.windows(2).all(|p| p[0] <= p[1]));
            }
        }
    }
}
