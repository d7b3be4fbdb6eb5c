/// Progress sink -- a single 0..=100 value shared between the active task
/// and the UI.
///
/// Within one run the value only moves forward: every write goes through
/// `fetch_max`, so a late or out-of-order update can pause the bar but never
/// pull it back. Only [`Progress::reset`] lowers it, and the task runner calls
/// that before a new body starts.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Terminal progress value.
pub const COMPLETE: u8 = 100;

#[derive(Debug, Clone, Default)]
pub struct Progress {
    value: Arc<AtomicU8>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value.
    pub fn get(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }

    /// Current value as a 0.0..=1.0 fraction for progress widgets.
    pub fn fraction(&self) -> f32 {
        f32::from(self.get()) / f32::from(COMPLETE)
    }

    /// Raise the value to `percent` (clamped to 100). Lower values are ignored.
    pub fn set(&self, percent: u8) {
        self.value.fetch_max(percent.min(COMPLETE), Ordering::AcqRel);
    }

    /// Raise the value by `step`, stopping at `ceiling`.
    ///
    /// Returns the value after the update.
    pub fn advance(&self, step: u8, ceiling: u8) -> u8 {
        let ceiling = ceiling.min(COMPLETE);
        let previous = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                if v >= ceiling {
                    None
                } else {
                    Some(v.saturating_add(step).min(ceiling))
                }
            })
            .unwrap_or_else(|v| v);
        if previous >= ceiling {
            previous
        } else {
            previous.saturating_add(step).min(ceiling)
        }
    }

    /// Force the terminal value.
    pub fn finish(&self) {
        self.value.store(COMPLETE, Ordering::Release);
    }

    /// Back to zero for a new run.
    pub(crate) fn reset(&self) {
        self.value.store(0, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.get() >= COMPLETE
    }
}

/// Integer percentage of `done` out of `total`, clamped to `cap`.
///
/// `total == 0` reports `cap`; there is nothing left to do.
pub fn percent_of(done: u64, total: u64, cap: u8) -> u8 {
    if total == 0 {
        return cap;
    }
    let pct = (u128::from(done) * 100 / u128::from(total)).min(u128::from(cap));
    pct as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_never_regresses() {
        let p = Progress::new();
        p.set(40);
        p.set(20);
        assert_eq!(p.get(), 40);
        p.set(250);
        assert_eq!(p.get(), 100);
    }

    #[test]
    fn test_advance_stops_at_ceiling() {
        let p = Progress::new();
        for _ in 0..30 {
            p.advance(5, 90);
        }
        assert_eq!(p.get(), 90);

        let q = Progress::new();
        q.set(88);
        assert_eq!(q.advance(5, 90), 90);
        assert_eq!(q.advance(5, 90), 90);
    }

    #[test]
    fn test_reset_and_finish() {
        let p = Progress::new();
        p.set(70);
        p.reset();
        assert_eq!(p.get(), 0);
        p.finish();
        assert!(p.is_complete());
        assert!((p.fraction() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(0, 10, 100), 0);
        assert_eq!(percent_of(3, 10, 100), 30);
        assert_eq!(percent_of(10, 10, 99), 99);
        assert_eq!(percent_of(0, 0, 99), 99);
        assert_eq!(percent_of(u64::MAX, u64::MAX, 100), 100);
    }
}
