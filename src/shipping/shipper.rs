//! Offline log shipper
//!
//! While silent, log lines are appended to the partition of the current
//! day. Switching to active replays the retained backlog, oldest day first,
//! and sends new lines straight to the log server.
//!
//! Every request becomes a command on one channel and a single worker
//! thread executes them in arrival order. The worker is the only code that
//! touches the partitions, so a flush can never race a write or a cleanup.

use super::config::{RetentionPolicy, ShipperConfig};
use super::metrics::ShipperMetrics;
use super::mode::LogMode;
use super::partition::{partition_date, partition_id, FsPartitionStore, PartitionStore};
use super::schedule::{Clock, LocalClock, Scheduler, ThreadScheduler};
use super::transport::{Transport, UdpTransport};
use crate::core::analytics::panic_message;
use crate::core::{AnalyticsError, Result};
use chrono::Days;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default time to wait for the worker to drain on drop
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Log(String),
    SetMode(LogMode),
    /// `None` for a manual request; scheduled runs carry the generation
    /// that scheduled them
    Cleanup { generation: Option<u64> },
    Sync(Sender<()>),
    Shutdown,
}

/// Builder for [`LogShipper`]
///
/// Storage, transport, scheduler and clock default to the file system,
/// UDP, a timer thread and the local time zone. Tests replace them.
pub struct LogShipperBuilder {
    config: ShipperConfig,
    store: Option<Box<dyn PartitionStore>>,
    transport: Option<Box<dyn Transport>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    clock: Arc<dyn Clock>,
}

impl LogShipperBuilder {
    pub fn new(config: ShipperConfig) -> Self {
        Self {
            config,
            store: None,
            transport: None,
            scheduler: None,
            clock: Arc::new(LocalClock),
        }
    }

    #[must_use]
    pub fn store(mut self, store: impl PartitionStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and start the worker
    ///
    /// The first cleanup is scheduled one cleanup interval from now.
    pub fn start(self) -> Result<LogShipper> {
        self.config.validate()?;

        let store: Box<dyn PartitionStore> = match self.store {
            Some(store) => store,
            None => Box::new(FsPartitionStore::new(&self.config.directory)?),
        };
        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(UdpTransport::new(self.config.send_timeout())),
        };

        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(ThreadScheduler::new()));

        let (sender, receiver) = unbounded();
        let metrics = Arc::new(ShipperMetrics::new());

        let mut worker = Worker {
            config: self.config.clone(),
            mode: LogMode::default(),
            store,
            transport,
            scheduler,
            clock: self.clock,
            sender: sender.clone(),
            metrics: Arc::clone(&metrics),
            cleanup_generation: 0,
        };
        worker.schedule_cleanup();

        let handle = thread::Builder::new()
            .name("analytics-log-shipper".to_string())
            .spawn(move || worker.run(receiver))?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            prefix = %self.config.file_prefix,
            retention_days = self.config.retention_days,
            "log shipper started"
        );

        Ok(LogShipper {
            sender,
            requested_mode: RwLock::new(LogMode::default()),
            worker: Mutex::new(Some(handle)),
            stopped: AtomicBool::new(false),
            metrics,
            config: self.config,
        })
    }
}

/// Handle to the shipper worker
///
/// Requests return as soon as the command is queued. Dropping the handle
/// drains the queue, waiting at most [`DEFAULT_SHUTDOWN_TIMEOUT`].
///
/// # Example
///
/// ```no_run
/// use rust_analytics_system::shipping::{LogMode, LogShipper, ShipperConfig};
///
/// let config = ShipperConfig::new()
///     .with_server("logs.internal", 5958)
///     .with_directory("/var/lib/app/analytics");
///
/// let shipper = LogShipper::start(config).unwrap();
/// shipper.log_event("app started").unwrap();
///
/// // Replays everything buffered so far, then sends live
/// shipper.change_mode(LogMode::Active).unwrap();
/// ```
pub struct LogShipper {
    sender: Sender<Command>,
    requested_mode: RwLock<LogMode>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
    metrics: Arc<ShipperMetrics>,
    config: ShipperConfig,
}

impl LogShipper {
    /// Start a shipper with the default collaborators
    pub fn start(config: ShipperConfig) -> Result<Self> {
        LogShipperBuilder::new(config).start()
    }

    pub fn builder(config: ShipperConfig) -> LogShipperBuilder {
        LogShipperBuilder::new(config)
    }

    /// Queue a log line
    ///
    /// Embedded line breaks are escaped so the entry stays on one line.
    /// Empty entries are ignored.
    pub fn log_event(&self, entry: impl Into<String>) -> Result<()> {
        let entry = entry.into();
        if entry.is_empty() {
            return Ok(());
        }
        self.send(Command::Log(escape_line_breaks(entry)))
    }

    /// Queue a mode change; switching from silent to active flushes the
    /// backlog
    pub fn change_mode(&self, mode: LogMode) -> Result<()> {
        // Held across the enqueue so the recorded mode matches queue order
        let mut requested = self.requested_mode.write();
        self.send(Command::SetMode(mode))?;
        *requested = mode;
        Ok(())
    }

    /// Queue a retention cleanup now
    ///
    /// The periodic schedule restarts from this run.
    pub fn cleanup(&self) -> Result<()> {
        self.send(Command::Cleanup { generation: None })
    }

    /// The most recently requested mode
    pub fn mode(&self) -> LogMode {
        *self.requested_mode.read()
    }

    /// Block until every command queued before this call has run
    pub fn sync(&self) -> Result<()> {
        let (reply, done) = bounded(1);
        self.send(Command::Sync(reply))?;
        done.recv().map_err(|_| AnalyticsError::ShipperStopped)
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> &ShipperMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &ShipperConfig {
        &self.config
    }

    /// Drain queued commands and stop the worker
    ///
    /// Returns `false` if the worker did not finish within `timeout` or
    /// panicked. Later requests fail with [`AnalyticsError::ShipperStopped`].
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return true;
        }
        if self.sender.send(Command::Shutdown).is_err() {
            warn!("log shipper worker already gone at shutdown");
        }

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    error!("log shipper worker panicked during shutdown");
                    return false;
                }
                debug!("log shipper stopped");
                return true;
            }

            if start.elapsed() >= timeout {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "log shipper worker did not finish in time; queued lines may be lost"
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(AnalyticsError::ShipperStopped);
        }
        self.sender
            .send(command)
            .map_err(|_| AnalyticsError::ChannelSendError)
    }
}

impl Drop for LogShipper {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

fn escape_line_breaks(entry: String) -> String {
    if entry.contains(['\n', '\r']) {
        entry.replace('\r', "\\r").replace('\n', "\\n")
    } else {
        entry
    }
}

struct Worker {
    config: ShipperConfig,
    mode: LogMode,
    store: Box<dyn PartitionStore>,
    transport: Box<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    sender: Sender<Command>,
    metrics: Arc<ShipperMetrics>,
    cleanup_generation: u64,
}

impl Worker {
    fn run(mut self, receiver: Receiver<Command>) {
        while let Ok(command) = receiver.recv() {
            match catch_unwind(AssertUnwindSafe(|| self.handle(command))) {
                Ok(true) => {}
                Ok(false) => break,
                Err(panic_info) => error!(
                    panic = %panic_message(&*panic_info),
                    "log shipper command panicked; worker continues"
                ),
            }
        }
    }

    /// Returns `false` once the worker should stop
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Log(line) => self.log(&line),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::Cleanup { generation } => match generation {
                Some(g) if g != self.cleanup_generation => {
                    debug!(generation = g, "skipping superseded cleanup");
                }
                _ => {
                    self.cleanup();
                    self.schedule_cleanup();
                }
            },
            Command::Sync(reply) => {
                let _ = reply.send(());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn log(&mut self, line: &str) {
        match self.mode {
            LogMode::Active => {
                self.transmit(line);
            }
            LogMode::Silent => {
                let id = partition_id(&self.config.file_prefix, self.clock.today());
                match self.store.append_line(&id, line) {
                    Ok(()) => {
                        self.metrics.record_buffered();
                    }
                    Err(e) => {
                        self.metrics.record_storage_failure();
                        warn!(partition = %id, error = %e, "failed to buffer log line; line dropped");
                    }
                }
            }
        }
    }

    fn set_mode(&mut self, mode: LogMode) {
        if mode == self.mode {
            return;
        }
        let previous = std::mem::replace(&mut self.mode, mode);
        debug!(from = %previous, to = %mode, "log shipper mode changed");

        if previous == LogMode::Silent && mode == LogMode::Active {
            self.flush_backlog();
        }
    }

    /// Replay every retained partition, oldest first, deleting each one
    /// whatever happened to its lines
    fn flush_backlog(&mut self) {
        let today = self.clock.today();
        let retention = u64::from(self.config.retention_days);

        for offset in (0..=retention).rev() {
            let Some(day) = today.checked_sub_days(Days::new(offset)) else {
                continue;
            };
            let id = partition_id(&self.config.file_prefix, day);
            if !self.store.partition_exists(&id) {
                continue;
            }

            match self.store.read_lines(&id) {
                Ok(lines) => {
                    let mut sent = 0usize;
                    for line in &lines {
                        if self.transmit(line) {
                            sent += 1;
                        }
                    }
                    debug!(partition = %id, lines = lines.len(), sent, "flushed partition");
                }
                Err(e) => {
                    self.metrics.record_storage_failure();
                    warn!(partition = %id, error = %e, "failed to read partition; its lines are lost");
                }
            }

            if let Err(e) = self.store.delete_partition(&id) {
                self.metrics.record_storage_failure();
                warn!(partition = %id, error = %e, "failed to delete flushed partition");
            }
            self.metrics.record_partition_flushed();
        }
    }

    fn transmit(&self, line: &str) -> bool {
        match self
            .transport
            .send_datagram(&self.config.host, self.config.port, line.as_bytes())
        {
            Ok(()) => {
                self.metrics.record_transmitted();
                true
            }
            Err(e) => {
                self.metrics.record_transmit_failure();
                warn!(error = %e, "log line transmission failed; line dropped");
                false
            }
        }
    }

    fn cleanup(&mut self) {
        let today = self.clock.today();
        let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(self.config.retention_days)))
        else {
            return;
        };
        let prefix = self.config.file_prefix.clone();

        let expired = match self.config.retention_policy {
            RetentionPolicy::ExactOffset => {
                let id = partition_id(&prefix, cutoff);
                if self.store.partition_exists(&id) {
                    vec![id]
                } else {
                    Vec::new()
                }
            }
            RetentionPolicy::Sweep => match self.store.list_partitions() {
                Ok(ids) => ids
                    .into_iter()
                    .filter(|id| partition_date(&prefix, id).is_some_and(|date| date <= cutoff))
                    .collect(),
                Err(e) => {
                    self.metrics.record_storage_failure();
                    warn!(error = %e, "failed to list partitions for cleanup");
                    Vec::new()
                }
            },
        };

        for id in expired {
            match self.store.delete_partition(&id) {
                Ok(()) => {
                    self.metrics.record_partition_deleted();
                    debug!(partition = %id, "deleted expired partition");
                }
                Err(e) => {
                    self.metrics.record_storage_failure();
                    warn!(partition = %id, error = %e, "failed to delete expired partition");
                }
            }
        }
    }

    /// Schedule the next cleanup; any earlier pending run becomes stale
    fn schedule_cleanup(&mut self) {
        self.cleanup_generation += 1;
        let generation = self.cleanup_generation;
        let sender = self.sender.clone();

        self.scheduler.schedule_once(
            self.config.cleanup_interval(),
            Box::new(move || {
                let _ = sender.send(Command::Cleanup {
                    generation: Some(generation),
                });
            }),
        );
    }
}
