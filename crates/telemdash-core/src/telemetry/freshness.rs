use std::time::Duration;

/// Default window for F1, which broadcasts at ~20 Hz.
pub const DEFAULT_F1_STALE_AFTER: Duration = Duration::from_millis(2000);
/// Default window for PCARS, whose forwarder relays at ~10 Hz.
pub const DEFAULT_PCARS_STALE_AFTER: Duration = Duration::from_millis(5000);

/// Tracks the last successful decode against a staleness window.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use telemdash_core::Freshness;
///
/// let mut freshness = Freshness::new(Duration::from_secs(2));
/// assert!(!freshness.is_fresh(Duration::ZERO));
/// freshness.stamp(Duration::from_secs(10));
/// assert!(freshness.is_fresh(Duration::from_millis(11_999)));
/// assert!(!freshness.is_fresh(Duration::from_secs(12)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    window: Duration,
    last_success: Option<Duration>,
}

impl Freshness {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_success: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_success(&self) -> Option<Duration> {
        self.last_success
    }

    pub fn stamp(&mut self, now: Duration) {
        self.last_success = Some(now);
    }

    /// Time since the last success; zero if the clock reads earlier than it.
    pub fn age(&self, now: Duration) -> Option<Duration> {
        self.last_success.map(|at| now.saturating_sub(at))
    }

    pub fn is_fresh(&self, now: Duration) -> bool {
        self.age(now).is_some_and(|age| age < self.window)
    }
}
