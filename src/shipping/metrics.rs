//! Log shipper counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the shipper worker
///
/// `record_*` methods return the previous value.
#[derive(Debug)]
pub struct ShipperMetrics {
    lines_buffered: AtomicU64,
    lines_transmitted: AtomicU64,
    transmit_failures: AtomicU64,
    storage_failures: AtomicU64,
    partitions_flushed: AtomicU64,
    partitions_deleted: AtomicU64,
}

impl ShipperMetrics {
    pub const fn new() -> Self {
        Self {
            lines_buffered: AtomicU64::new(0),
            lines_transmitted: AtomicU64::new(0),
            transmit_failures: AtomicU64::new(0),
            storage_failures: AtomicU64::new(0),
            partitions_flushed: AtomicU64::new(0),
            partitions_deleted: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_buffered(&self) -> u64 {
        self.lines_buffered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lines_transmitted(&self) -> u64 {
        self.lines_transmitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transmit_failures(&self) -> u64 {
        self.transmit_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn storage_failures(&self) -> u64 {
        self.storage_failures.load(Ordering::Relaxed)
    }

    /// Partitions replayed by a switch to active mode
    #[inline]
    pub fn partitions_flushed(&self) -> u64 {
        self.partitions_flushed.load(Ordering::Relaxed)
    }

    /// Partitions removed by cleanup
    #[inline]
    pub fn partitions_deleted(&self) -> u64 {
        self.partitions_deleted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_buffered(&self) -> u64 {
        self.lines_buffered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transmitted(&self) -> u64 {
        self.lines_transmitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transmit_failure(&self) -> u64 {
        self.transmit_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_storage_failure(&self) -> u64 {
        self.storage_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_partition_flushed(&self) -> u64 {
        self.partitions_flushed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_partition_deleted(&self) -> u64 {
        self.partitions_deleted.fetch_add(1, Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.lines_buffered.store(0, Ordering::Relaxed);
        self.lines_transmitted.store(0, Ordering::Relaxed);
        self.transmit_failures.store(0, Ordering::Relaxed);
        self.storage_failures.store(0, Ordering::Relaxed);
        self.partitions_flushed.store(0, Ordering::Relaxed);
        self.partitions_deleted.store(0, Ordering::Relaxed);
    }
}

impl Default for ShipperMetrics {
    fn default() -> Self {
        Self::new()
    }
}
