// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scenario files and the runner that plays them against the engine.

use serde::{Deserialize, Serialize};
use shift_slots_domain::{CandidateId, CandidateProfile, Capacity, Selection, ShiftFormValues, Slot};
use shift_slots_engine::{
    CandidateList, EngineError, EngineSettings, InMemoryDirectory, NoticeEvent, RosterEntry,
    ShiftSlotsEngine,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors that stop a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario or settings file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The scenario or settings file is not valid JSON for its shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The engine refused the request.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A step referred to a candidate missing from the roster.
    #[error("Unknown candidate {0}")]
    UnknownCandidate(i64),

    /// A step referred to a slot that does not exist.
    #[error("Unknown slot {0}")]
    UnknownSlot(usize),
}

/// A locked selection to seed the slots with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockedEntry {
    /// The roster id of the candidate.
    pub id: i64,
    /// Why the selection is locked.
    #[serde(default)]
    pub reason: Option<String>,
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Replace the form values.
    Form { values: ShiftFormValues },
    /// Put a roster candidate into a slot.
    Select { slot: usize, candidate: i64 },
    /// Empty a slot.
    Clear { slot: usize },
    /// Change the number of slots.
    Capacity { value: usize },
    /// Search a slot's candidate list, without the typing debounce.
    Search {
        slot: usize,
        #[serde(default)]
        term: String,
    },
    /// Load the next page of a slot's candidate list.
    LoadMore { slot: usize },
    /// Let timers run.
    WaitMs { ms: u64 },
}

/// A complete scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Initial number of slots.
    pub capacity: usize,
    /// The directory roster.
    pub candidates: Vec<RosterEntry>,
    /// Selections that are already confirmed.
    #[serde(default)]
    pub locked: Vec<LockedEntry>,
    /// Actions to play, in order.
    pub steps: Vec<Step>,
}

/// One line of simulator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Output {
    /// The slots changed.
    Slots { step: usize, slots: Vec<Slot> },
    /// A slot's candidate list after a search or page load.
    Candidates {
        step: usize,
        slot: usize,
        names: Vec<String>,
        has_next_page: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// A step was refused; the scenario continues.
    Rejected { step: usize, message: String },
    /// An eviction notice was raised or dismissed.
    Notice { notice: NoticeEvent },
}

impl Output {
    fn candidates(step: usize, slot: usize, list: &CandidateList) -> Self {
        Self::Candidates {
            step,
            slot,
            names: list.items.iter().map(|p| p.name.clone()).collect(),
            has_next_page: list.has_next_page,
            error: list.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Plays a scenario and streams its output to `out`.
///
/// # Errors
///
/// Returns an error if the initial capacity or the locked selections are
/// invalid. Failing steps are reported as `Output::Rejected` instead.
pub async fn run(
    scenario: Scenario,
    settings: EngineSettings,
    out: mpsc::UnboundedSender<Output>,
) -> Result<(), ScenarioError> {
    let directory: Arc<InMemoryDirectory> = Arc::new(InMemoryDirectory::new(scenario.candidates));
    let locked: Vec<Selection> = scenario
        .locked
        .iter()
        .map(|entry| {
            profile(&directory, entry.id)
                .map(|profile| Selection::locked(profile, entry.reason.clone()))
        })
        .collect::<Result<_, _>>()?;
    let capacity: Capacity = Capacity::new(scenario.capacity).map_err(EngineError::from)?;

    let engine: ShiftSlotsEngine<InMemoryDirectory> =
        ShiftSlotsEngine::spawn(Arc::clone(&directory), settings, capacity, locked)?;
    let (finished, finished_rx) = oneshot::channel::<()>();
    let printer: JoinHandle<()> =
        spawn_notice_printer(engine.subscribe_notices(), finished_rx, out.clone());

    let mut last_slots: Vec<Slot> = engine.slots();
    emit(
        &out,
        Output::Slots {
            step: 0,
            slots: last_slots.clone(),
        },
    );

    for (index, step) in scenario.steps.into_iter().enumerate() {
        let number: usize = index + 1;
        debug!(step = number, ?step, "Playing step");
        if let Err(err) = play(&engine, &directory, number, step, &out).await {
            warn!(step = number, %err, "Step rejected");
            emit(
                &out,
                Output::Rejected {
                    step: number,
                    message: err.to_string(),
                },
            );
        }

        let slots: Vec<Slot> = engine.slots();
        if slots != last_slots {
            emit(
                &out,
                Output::Slots {
                    step: number,
                    slots: slots.clone(),
                },
            );
            last_slots = slots;
        }
    }

    // The printer exits once the notice on screen, if any, has been dismissed.
    let _ = finished.send(());
    if let Err(err) = printer.await {
        warn!(%err, "Notice printer failed");
    }
    engine.shutdown();
    info!("Scenario finished");
    Ok(())
}

async fn play(
    engine: &ShiftSlotsEngine<InMemoryDirectory>,
    directory: &InMemoryDirectory,
    number: usize,
    step: Step,
    out: &mpsc::UnboundedSender<Output>,
) -> Result<(), ScenarioError> {
    match step {
        Step::Form { values } => engine.update_form(&values),
        Step::Select { slot, candidate } => {
            engine
                .select_candidate(slot, profile(directory, candidate)?)
                .await?;
        }
        Step::Clear { slot } => {
            engine.clear_slot(slot).await?;
        }
        Step::Capacity { value } => {
            let dropped: Vec<Selection> = engine.set_capacity(value).await?;
            if !dropped.is_empty() {
                info!(
                    capacity = value,
                    dropped = dropped.len(),
                    "Capacity change dropped selections"
                );
            }
        }
        Step::Search { slot, term } => {
            let source = engine
                .candidate_source(slot)
                .ok_or(ScenarioError::UnknownSlot(slot))?;
            let outcome = source.search_now(&term).await;
            debug!(slot, ?outcome, "Search finished");
            emit(out, Output::candidates(number, slot, &source.snapshot()));
        }
        Step::LoadMore { slot } => {
            let source = engine
                .candidate_source(slot)
                .ok_or(ScenarioError::UnknownSlot(slot))?;
            let outcome = source.load_more().await;
            debug!(slot, ?outcome, "Load more finished");
            emit(out, Output::candidates(number, slot, &source.snapshot()));
        }
        Step::WaitMs { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
    }
    Ok(())
}

fn profile(directory: &InMemoryDirectory, id: i64) -> Result<CandidateProfile, ScenarioError> {
    directory
        .profile(CandidateId::new(id))
        .cloned()
        .ok_or(ScenarioError::UnknownCandidate(id))
}

fn spawn_notice_printer(
    mut notices: broadcast::Receiver<NoticeEvent>,
    mut finished: oneshot::Receiver<()>,
    out: mpsc::UnboundedSender<Output>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut showing: Option<u64> = None;
        let mut done: bool = false;
        while !done || showing.is_some() {
            tokio::select! {
                event = notices.recv() => match event {
                    Ok(notice) => {
                        match &notice {
                            NoticeEvent::Raised(raised) => showing = Some(raised.id),
                            NoticeEvent::Dismissed { id } if showing == Some(*id) => {
                                showing = None;
                            }
                            NoticeEvent::Dismissed { .. } => {}
                        }
                        emit(&out, Output::Notice { notice });
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notice printer fell behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = &mut finished, if !done => done = true,
            }
        }
    })
}

fn emit(out: &mpsc::UnboundedSender<Output>, output: Output) {
    if out.send(output).is_err() {
        debug!("Output receiver closed");
    }
}
