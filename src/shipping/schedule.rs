//! Time sources for the shipper: the calendar day and deferred tasks

use crate::core::analytics::panic_message;
use chrono::{Local, NaiveDate};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Source of the local calendar day
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock reading the system's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Runs a task once after a delay
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, after: Duration, task: Box<dyn FnOnce() + Send>);
}

type Task = Box<dyn FnOnce() + Send>;

/// Scheduler running every task on one timer thread
///
/// Tasks wait in a deadline-ordered queue. The thread exits once the
/// scheduler is dropped; tasks still waiting at that point are discarded.
pub struct ThreadScheduler {
    sender: Sender<(Instant, Task)>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();

        let spawned = thread::Builder::new()
            .name("analytics-cleanup-timer".to_string())
            .spawn(move || run_timer(receiver));

        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn cleanup timer thread");
        }
        Self { sender }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_once(&self, after: Duration, task: Task) {
        let Some(deadline) = Instant::now().checked_add(after) else {
            warn!(after_secs = after.as_secs(), "delay out of range; task dropped");
            return;
        };
        if self.sender.send((deadline, task)).is_err() {
            error!("cleanup timer thread is gone; task dropped");
        }
    }
}

fn run_timer(receiver: Receiver<(Instant, Task)>) {
    // Keyed by deadline, then arrival, so equal deadlines run in order
    let mut queue: BTreeMap<(Instant, u64), Task> = BTreeMap::new();
    let mut arrivals = 0u64;

    loop {
        let received = match queue.keys().next() {
            Some(&(deadline, _)) => receiver.recv_deadline(deadline),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok((deadline, task)) => {
                arrivals += 1;
                queue.insert((deadline, arrivals), task);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        while let Some(entry) = queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let task = entry.remove();
            if let Err(panic_info) = catch_unwind(AssertUnwindSafe(task)) {
                error!(panic = %panic_message(&*panic_info), "scheduled task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_thread_scheduler_runs_task() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = bounded(1);
        scheduler.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                let _ = tx.send(42);
            }),
        );

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(42));
    }

    #[test]
    fn test_tasks_share_one_thread_in_deadline_order() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = unbounded();

        for (label, delay_ms) in [("late", 120u64), ("early", 10), ("middle", 60)] {
            let tx = tx.clone();
            scheduler.schedule_once(
                Duration::from_millis(delay_ms),
                Box::new(move || {
                    let _ = tx.send((label, thread::current().id()));
                }),
            );
        }

        let fired: Vec<_> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        let labels: Vec<_> = fired.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["early", "middle", "late"]);
        assert!(fired.iter().all(|(_, id)| *id == fired[0].1));
    }

    #[test]
    fn test_superseded_tasks_do_not_block_later_ones() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = bounded(1);

        for _ in 0..100 {
            scheduler.schedule_once(Duration::from_secs(86_400), Box::new(|| {}));
        }
        scheduler.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_dropping_scheduler_discards_pending_tasks() {
        let (tx, rx) = bounded::<()>(1);
        {
            let scheduler = ThreadScheduler::new();
            scheduler.schedule_once(
                Duration::from_secs(86_400),
                Box::new(move || {
                    let _ = tx.send(());
                }),
            );
        }

        // The task and its sender are dropped with the timer thread
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn test_local_clock_matches_chrono() {
        let before = Local::now().date_naive();
        let today = LocalClock.today();
        assert!(today >= before);
    }
}
