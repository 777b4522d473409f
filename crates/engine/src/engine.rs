// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The engine facade wiring the components together.
//!
//! Data flows one way: form values become a fingerprint, the fingerprint is
//! debounced into a settled config, and every change of the settled config or
//! of the slot store drives a reconcile pass. A reconcile pass re-verifies the
//! selected candidates (evicting the ones that no longer qualify) and hands
//! each slot's candidate source its current search context.

use crate::candidates::CandidateSource;
use crate::debounce::ConfigPublisher;
use crate::directory::ShiftDirectory;
use crate::eligibility::{EligibilityChecker, EligibilityOutcome, EligibilityRequest};
use crate::error::EngineError;
use crate::eviction::EvictionHandler;
use crate::lock;
use crate::notice::{EvictionNotice, NoticeBroadcaster, NoticeEvent};
use crate::settings::EngineSettings;
use crate::store::StoreHandle;
use shift_slots::{SlotCommand, SlotStore, TransitionResult};
use shift_slots_domain::{
    CandidateId, CandidateProfile, Capacity, IneligibleCandidate, Selection, ShiftConfig,
    ShiftFormValues, Slot, build_fingerprint,
};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

type Sources<D> = Arc<Mutex<Vec<Arc<CandidateSource<D>>>>>;

/// One shift-editing session.
///
/// Dropping the engine tears it down: debounce timers, the store actor and
/// every background check are aborted and late responses are discarded.
pub struct ShiftSlotsEngine<D: ShiftDirectory> {
    settings: EngineSettings,
    publisher: ConfigPublisher,
    store: StoreHandle,
    notices: Arc<NoticeBroadcaster>,
    checker: Arc<EligibilityChecker<D>>,
    sources: Sources<D>,
    tasks: Vec<JoinHandle<()>>,
}

impl<D: ShiftDirectory> ShiftSlotsEngine<D> {
    /// Starts a session.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `directory` - The candidate directory
    /// * `settings` - Timing and paging settings
    /// * `capacity` - Initial number of slots
    /// * `locked` - Selections that are already confirmed and can never be removed
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The settings are invalid
    /// - The locked selections do not fit or contain a candidate twice
    pub fn spawn(
        directory: Arc<D>,
        settings: EngineSettings,
        capacity: Capacity,
        locked: Vec<Selection>,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        let initial: SlotStore = SlotStore::new(capacity, locked)?;

        let (store, actor) = StoreHandle::spawn(initial);
        let publisher: ConfigPublisher = ConfigPublisher::spawn(settings.config_quiet_period());
        let notices: Arc<NoticeBroadcaster> =
            Arc::new(NoticeBroadcaster::new(settings.notice_ttl()));
        let checker: Arc<EligibilityChecker<D>> =
            Arc::new(EligibilityChecker::new(Arc::clone(&directory)));
        let sources: Sources<D> = Arc::new(Mutex::new(Vec::new()));

        let reconciler: Reconciler<D> = Reconciler {
            directory,
            settings: settings.clone(),
            checker: Arc::clone(&checker),
            eviction: EvictionHandler::new(store.clone(), Arc::clone(&notices)),
            sources: Arc::clone(&sources),
            checks: JoinSet::new(),
            last_checked: None,
        };
        reconciler.sync_sources(&store.current(), None);
        let reconcile: JoinHandle<()> =
            tokio::spawn(reconciler.run(publisher.subscribe(), store.subscribe()));

        info!(capacity = capacity.get(), "Shift slot engine started");

        Ok(Self {
            settings,
            publisher,
            store,
            notices,
            checker,
            sources,
            tasks: vec![actor, reconcile],
        })
    }

    /// Returns the settings the engine runs with.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Feeds the current form values; cheap enough to call on every change.
    pub fn update_form(&self, values: &ShiftFormValues) {
        self.publisher.submit(build_fingerprint(values));
    }

    /// Returns the config that survived the quiet period, if any.
    #[must_use]
    pub fn settled_config(&self) -> Option<ShiftConfig> {
        self.publisher.settled()
    }

    /// Subscribes to settled config changes.
    #[must_use]
    pub fn subscribe_config(&self) -> watch::Receiver<Option<ShiftConfig>> {
        self.publisher.subscribe()
    }

    /// Returns a snapshot of the slots for rendering.
    #[must_use]
    pub fn slots(&self) -> Vec<Slot> {
        self.store.current().to_snapshot()
    }

    /// Returns the current slot store.
    #[must_use]
    pub fn store(&self) -> SlotStore {
        self.store.current()
    }

    /// Subscribes to slot store changes.
    #[must_use]
    pub fn subscribe_slots(&self) -> watch::Receiver<SlotStore> {
        self.store.subscribe()
    }

    /// Puts a candidate into a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The index is out of range
    /// - The candidate is already selected in another slot
    /// - The slot holds a locked selection
    /// - The engine has been shut down
    pub async fn select_candidate(
        &self,
        index: usize,
        profile: CandidateProfile,
    ) -> Result<TransitionResult, EngineError> {
        debug!(slot = index, candidate_id = %profile.id, "Selecting candidate");
        self.store
            .submit(SlotCommand::Select { index, profile })
            .await
    }

    /// Empties a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range, the slot is locked, or
    /// the engine has been shut down.
    pub async fn clear_slot(&self, index: usize) -> Result<TransitionResult, EngineError> {
        debug!(slot = index, "Clearing slot");
        self.store.submit(SlotCommand::Clear { index }).await
    }

    /// Rebuilds the store at a new capacity.
    ///
    /// # Returns
    ///
    /// The selections dropped because they no longer fit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `capacity` is outside `1..=5`
    /// - `capacity` is below the number of locked selections
    /// - The engine has been shut down
    pub async fn set_capacity(&self, capacity: usize) -> Result<Vec<Selection>, EngineError> {
        let capacity: Capacity = Capacity::new(capacity)?;
        let transition: TransitionResult =
            self.store.submit(SlotCommand::Resize { capacity }).await?;
        Ok(transition.removed)
    }

    /// Subscribes to eviction notices.
    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<NoticeEvent> {
        self.notices.subscribe()
    }

    /// Returns the eviction notice currently shown, if any.
    #[must_use]
    pub fn current_notice(&self) -> Option<EvictionNotice> {
        self.notices.current()
    }

    /// Returns the candidates found ineligible by the latest applied check.
    #[must_use]
    pub fn ineligible(&self) -> Vec<IneligibleCandidate> {
        self.checker.last_result()
    }

    /// Returns the candidate source for a slot.
    #[must_use]
    pub fn candidate_source(&self, index: usize) -> Option<Arc<CandidateSource<D>>> {
        lock(&self.sources).get(index).cloned()
    }

    /// Tears the session down.
    pub fn shutdown(self) {
        info!("Shift slot engine shut down");
    }
}

impl<D: ShiftDirectory> Drop for ShiftSlotsEngine<D> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        lock(&self.sources).clear();
    }
}

struct Reconciler<D: ShiftDirectory> {
    directory: Arc<D>,
    settings: EngineSettings,
    checker: Arc<EligibilityChecker<D>>,
    eviction: EvictionHandler,
    sources: Sources<D>,
    checks: JoinSet<()>,
    last_checked: Option<(Option<ShiftConfig>, Vec<CandidateId>)>,
}

impl<D: ShiftDirectory> Reconciler<D> {
    async fn run(
        mut self,
        mut config_rx: watch::Receiver<Option<ShiftConfig>>,
        mut store_rx: watch::Receiver<SlotStore>,
    ) {
        loop {
            let config: Option<ShiftConfig> = config_rx.borrow_and_update().clone();
            let store: SlotStore = store_rx.borrow_and_update().clone();

            self.verify_eligibility(config.as_ref(), &store);
            self.sync_sources(&store, config.as_ref());

            tokio::select! {
                changed = config_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = store_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Reconcile loop stopped");
    }

    fn verify_eligibility(&mut self, config: Option<&ShiftConfig>, store: &SlotStore) {
        let candidate_ids: Vec<CandidateId> = store.eligibility_candidate_ids();
        let key: (Option<ShiftConfig>, Vec<CandidateId>) = (config.cloned(), candidate_ids);
        if self.last_checked.as_ref() == Some(&key) {
            return;
        }

        let request: EligibilityRequest = self.checker.prepare(config, &key.1);
        self.last_checked = Some(key);

        let checker: Arc<EligibilityChecker<D>> = Arc::clone(&self.checker);
        let eviction: EvictionHandler = self.eviction.clone();
        while self.checks.try_join_next().is_some() {}
        self.checks.spawn(async move {
            let EligibilityOutcome::Verified(ineligible) = checker.resolve(request).await else {
                return;
            };
            if ineligible.is_empty() {
                return;
            }
            if let Err(err) = eviction.evict(&ineligible).await {
                warn!(%err, "Could not evict ineligible candidates");
            }
        });
    }

    fn sync_sources(&self, store: &SlotStore, config: Option<&ShiftConfig>) {
        let capacity: usize = store.capacity();
        let mut sources = lock(&self.sources);
        sources.truncate(capacity);
        while sources.len() < capacity {
            match CandidateSource::new(sources.len(), Arc::clone(&self.directory), &self.settings)
            {
                Ok(source) => sources.push(Arc::new(source)),
                Err(err) => {
                    warn!(%err, "Could not create candidate source");
                    break;
                }
            }
        }

        for source in sources.iter() {
            source.set_context(config.cloned(), store.excluded_ids_for_slot(source.index()));
        }
    }
}
