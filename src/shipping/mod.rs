//! Offline log shipping
//!
//! A durable, day-partitioned local buffer with a silent/active switch and
//! retention cleanup, drained to a log server over UDP.

pub mod config;
pub mod metrics;
pub mod mode;
pub mod partition;
pub mod schedule;
pub mod shipper;
pub mod transport;

pub use config::{RetentionPolicy, ShipperConfig};
pub use metrics::ShipperMetrics;
pub use mode::LogMode;
pub use partition::{
    partition_date, partition_id, FsPartitionStore, MemoryPartitionStore, PartitionStore,
};
pub use schedule::{Clock, LocalClock, Scheduler, ThreadScheduler};
pub use shipper::{LogShipper, LogShipperBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use transport::{Transport, UdpTransport};
