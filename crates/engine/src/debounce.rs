// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trailing-edge debouncing.
//!
//! ## Invariants
//!
//! - Only the last value pushed within a quiet window is ever emitted
//! - A value pushed with `push_now` is emitted immediately and discards any
//!   pending deferred value
//! - Dropping the debouncer cancels the pending timer

use shift_slots_domain::ShiftConfig;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::debug;

enum DebounceInput<T> {
    Deferred(T),
    Immediate(T),
}

/// Coalesces bursts of values into the last one after a quiet period.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<DebounceInput<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns a debouncer on the current tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `quiet_period` - How long input must stay quiet before the last value is emitted
    ///
    /// # Returns
    ///
    /// The debouncer and the receiver its settled values are delivered to.
    #[must_use]
    pub fn spawn(quiet_period: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let task: JoinHandle<()> = tokio::spawn(run_debouncer(quiet_period, rx, out_tx));
        (Self { tx, task }, out_rx)
    }

    /// Pushes a value, restarting the quiet period.
    pub fn push(&self, value: T) {
        if self.tx.send(DebounceInput::Deferred(value)).is_err() {
            debug!("Debouncer stopped; dropping value");
        }
    }

    /// Emits a value right away, cancelling any pending value.
    pub fn push_now(&self, value: T) {
        if self.tx.send(DebounceInput::Immediate(value)).is_err() {
            debug!("Debouncer stopped; dropping value");
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_debouncer<T>(
    quiet_period: Duration,
    mut rx: mpsc::UnboundedReceiver<DebounceInput<T>>,
    out: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;
    let timer = sleep(quiet_period);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            input = rx.recv() => match input {
                Some(DebounceInput::Deferred(value)) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + quiet_period);
                }
                Some(DebounceInput::Immediate(value)) => {
                    pending = None;
                    if out.send(value).is_err() {
                        break;
                    }
                }
                None => break,
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take()
                    && out.send(value).is_err()
                {
                    break;
                }
            }
        }
    }
}

/// Publishes settled shift configs.
///
/// Complete fingerprints are debounced; an incomplete fingerprint (`None`) is
/// published immediately so dependent state can clear without delay. A
/// settled config equal to the one already published does not notify
/// subscribers.
pub struct ConfigPublisher {
    debouncer: Debouncer<Option<ShiftConfig>>,
    settled: watch::Receiver<Option<ShiftConfig>>,
    forward: JoinHandle<()>,
}

impl ConfigPublisher {
    /// Spawns a publisher on the current tokio runtime.
    #[must_use]
    pub fn spawn(quiet_period: Duration) -> Self {
        let (debouncer, mut rx) = Debouncer::spawn(quiet_period);
        let (settled_tx, settled) = watch::channel(None);

        let forward: JoinHandle<()> = tokio::spawn(async move {
            while let Some(config) = rx.recv().await {
                let changed: bool = settled_tx.send_if_modified(|current| {
                    if *current == config {
                        false
                    } else {
                        current.clone_from(&config);
                        true
                    }
                });
                if changed {
                    debug!(complete = config.is_some(), "Published settled shift config");
                }
            }
        });

        Self {
            debouncer,
            settled,
            forward,
        }
    }

    /// Submits the latest fingerprint.
    pub fn submit(&self, fingerprint: Option<ShiftConfig>) {
        match fingerprint {
            Some(config) => self.debouncer.push(Some(config)),
            None => self.debouncer.push_now(None),
        }
    }

    /// Returns the currently settled config.
    #[must_use]
    pub fn settled(&self) -> Option<ShiftConfig> {
        self.settled.borrow().clone()
    }

    /// Subscribes to settled config changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<ShiftConfig>> {
        self.settled.clone()
    }
}

impl Drop for ConfigPublisher {
    fn drop(&mut self) {
        self.forward.abort();
    }
}
