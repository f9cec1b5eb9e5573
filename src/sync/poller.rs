//! Timer-driven polling with exhaust-map overlap semantics.
//!
//! A poller repeatedly runs a task on a fixed period, starting
//! immediately. At most one cycle is ever in flight: timer ticks that
//! arrive while a cycle is still running are dropped, not queued, so a
//! slow multi-page fetch can never pile up concurrent remote calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::Result;

/// A unit of work the poller repeats.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    /// Whether the backing store has no data yet. When true at `start`,
    /// the poller raises its loading signal until the first cycle ends.
    fn is_initial(&self) -> bool;

    /// Run one cycle. Errors are logged and swallowed by the poller so the
    /// timer keeps ticking.
    async fn run(&self) -> Result<()>;
}

/// Fixed-period scheduler for fetch-and-reconcile cycles.
pub struct Poller {
    task: Arc<dyn PollTask>,
    period: Duration,
    /// Whether a poll loop is currently registered. Guards `start`
    /// idempotence; this is not an "in flight" flag.
    registered: Arc<AtomicBool>,
    loading: watch::Sender<bool>,
    /// Stop signal for the registered loop, if any.
    control: Mutex<Option<watch::Sender<bool>>>,
}

impl Poller {
    pub fn new(task: Arc<dyn PollTask>, period: Duration) -> Self {
        let (loading, _) = watch::channel(false);
        Poller {
            task,
            period,
            registered: Arc::new(AtomicBool::new(false)),
            loading,
            control: Mutex::new(None),
        }
    }

    /// Register the poll loop. The first tick fires immediately. Calling
    /// `start` while a loop is already registered has no effect.
    pub fn start(&self) {
        if self.registered.swap(true, Ordering::SeqCst) {
            return;
        }

        if self.task.is_initial() {
            self.loading.send_replace(true);
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        *self.control.lock() = Some(stop_tx);

        let task = Arc::clone(&self.task);
        let loading = self.loading.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            // Ticks that land while a cycle is running are dropped; the
            // next cycle starts on the next scheduled tick.
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut first_cycle = true;

            loop {
                tokio::select! {
                    _ = timer.tick() => {}
                    _ = stop_rx.changed() => break,
                }

                // The cycle is never raced against stop: an in-flight fetch
                // runs to completion and still applies its results.
                if let Err(e) = task.run().await {
                    tracing::warn!("poll cycle failed: {e}");
                }

                if first_cycle {
                    first_cycle = false;
                    loading.send_replace(false);
                }

                // Consult this loop's own stop signal, not the shared flag:
                // a stop/start pair during an in-flight cycle must not leave
                // two loops running.
                if *stop_rx.borrow() {
                    break;
                }
            }
        });
    }

    /// Deregister the poll loop. No further cycles are scheduled; a cycle
    /// already in flight completes normally. Safe to call when not running.
    pub fn stop(&self) {
        self.registered.store(false, Ordering::SeqCst);
        if let Some(stop) = self.control.lock().take() {
            let _ = stop.send(true);
        }
    }

    /// Whether a poll loop is currently registered.
    pub fn is_running(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Busy signal: true from `start` on an empty store until the first
    /// cycle completes, success or failure.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }
}
