//! Analytics metrics for observability
//!
//! Provides counters for monitoring the router: how many events were
//! dispatched, how many handler deliveries succeeded, and how many were lost.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the event router
///
/// # Example
///
/// ```
/// use rust_analytics_system::AnalyticsMetrics;
///
/// let metrics = AnalyticsMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.events_dispatched(), 1);
/// assert_eq!(metrics.deliveries(), 1);
/// ```
#[derive(Debug)]
pub struct AnalyticsMetrics {
    /// Number of dispatch calls (one per resolved target of a send)
    events_dispatched: AtomicU64,

    /// Number of successful handler `record` calls
    deliveries: AtomicU64,

    /// Number of handler `record` calls that returned an error or panicked
    handler_failures: AtomicU64,

    /// Number of dispatches to a target with no registered handler
    missing_handler_skips: AtomicU64,

    /// Number of handlers that failed to initialize
    init_failures: AtomicU64,
}

impl AnalyticsMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            missing_handler_skips: AtomicU64::new(0),
            init_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn missing_handler_skips(&self) -> u64 {
        self.missing_handler_skips.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn init_failures(&self) -> u64 {
        self.init_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.deliveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_handler_failure(&self) -> u64 {
        self.handler_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_missing_handler(&self) -> u64 {
        self.missing_handler_skips.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_init_failure(&self) -> u64 {
        self.init_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed deliveries as a percentage of attempted deliveries (0.0 - 100.0)
    pub fn failure_rate(&self) -> f64 {
        let failed = self.handler_failures() as f64;
        let total = self.deliveries() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.events_dispatched.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
        self.missing_handler_skips.store(0, Ordering::Relaxed);
        self.init_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for AnalyticsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AnalyticsMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            events_dispatched: AtomicU64::new(self.events_dispatched()),
            deliveries: AtomicU64::new(self.deliveries()),
            handler_failures: AtomicU64::new(self.handler_failures()),
            missing_handler_skips: AtomicU64::new(self.missing_handler_skips()),
            init_failures: AtomicU64::new(self.init_failures()),
        }
    }
}
