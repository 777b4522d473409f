// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The serialized write path for the slot store.
//!
//! A single actor task owns the store. Every writer sends a `SlotCommand` and
//! the actor applies it to the latest store, so no writer can act on a stale
//! copy. A command sent from inside a reaction to a store change is applied on
//! a later turn of the actor, never re-entrantly.

use crate::error::EngineError;
use shift_slots::{CoreError, SlotCommand, SlotStore, TransitionResult, apply};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct StoreRequest {
    command: SlotCommand,
    reply: oneshot::Sender<Result<TransitionResult, CoreError>>,
}

/// Cloneable handle to the slot store actor.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<StoreRequest>,
    snapshot: watch::Receiver<SlotStore>,
}

impl StoreHandle {
    /// Spawns the store actor with an initial store.
    ///
    /// # Returns
    ///
    /// The handle and the actor's join handle; aborting the latter tears the
    /// store down.
    #[must_use]
    pub fn spawn(initial: SlotStore) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(initial);
        let task: JoinHandle<()> = tokio::spawn(run_store(rx, snapshot_tx));
        (Self { tx, snapshot }, task)
    }

    /// Submits a command and waits for the actor to apply it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The command is rejected by the store
    /// - The actor has been torn down
    pub async fn submit(&self, command: SlotCommand) -> Result<TransitionResult, EngineError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(StoreRequest { command, reply })
            .map_err(|_| EngineError::Closed)?;
        let result: Result<TransitionResult, CoreError> =
            response.await.map_err(|_| EngineError::Closed)?;
        Ok(result?)
    }

    /// Returns the latest store.
    #[must_use]
    pub fn current(&self) -> SlotStore {
        self.snapshot.borrow().clone()
    }

    /// Subscribes to store changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SlotStore> {
        self.snapshot.clone()
    }
}

async fn run_store(
    mut rx: mpsc::UnboundedReceiver<StoreRequest>,
    snapshot: watch::Sender<SlotStore>,
) {
    while let Some(request) = rx.recv().await {
        let command_name: &'static str = request.command.name();
        let current: SlotStore = snapshot.borrow().clone();
        let result: Result<TransitionResult, CoreError> = apply(&current, request.command);

        match &result {
            Ok(transition) => {
                snapshot.send_if_modified(|store| {
                    if *store == transition.new_store {
                        false
                    } else {
                        store.clone_from(&transition.new_store);
                        true
                    }
                });
            }
            Err(err) => {
                debug!(command = command_name, %err, "Slot command rejected");
            }
        }

        if request.reply.send(result).is_err() {
            warn!(command = command_name, "Slot command caller went away");
        }
    }
}
