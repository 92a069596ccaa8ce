//! Time source for snapshot timestamps.

/// Supplies the `created_at` value recorded on every write.
///
/// Any `Fn() -> i64 + Send + Sync` closure is a clock, which keeps
/// timestamps deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl<F> Clock for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn now(&self) -> i64 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_system_clock_is_epoch_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let now = SystemClock.now();
        let after = chrono::Utc::now().timestamp_millis();
        assert!(before <= now && now <= after);
    }

    #[test]
    fn test_closure_clock() {
        let tick = AtomicI64::new(0);
        let clock = move || tick.fetch_add(1, Ordering::SeqCst);
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.now(), 1);
    }
}
