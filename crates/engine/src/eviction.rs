// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::EngineError;
use crate::notice::NoticeBroadcaster;
use crate::store::StoreHandle;
use shift_slots::{SlotCommand, TransitionResult};
use shift_slots_domain::{CandidateId, IneligibleCandidate, Selection};
use std::sync::Arc;
use tracing::info;

/// Clears slots whose candidates were found ineligible and tells the user.
#[derive(Clone)]
pub struct EvictionHandler {
    store: StoreHandle,
    notices: Arc<NoticeBroadcaster>,
}

impl EvictionHandler {
    /// Creates a handler writing through `store` and raising notices on `notices`.
    #[must_use]
    pub const fn new(store: StoreHandle, notices: Arc<NoticeBroadcaster>) -> Self {
        Self { store, notices }
    }

    /// Evicts the given candidates from their slots.
    ///
    /// The write is deferred to a later scheduler turn and goes through the
    /// store actor, so it is never applied from inside the reaction that
    /// observed the ineligibility. Locked selections are skipped by the store.
    ///
    /// # Arguments
    ///
    /// * `ineligible` - Candidates reported as no longer eligible
    ///
    /// # Returns
    ///
    /// The selections that were actually removed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Closed` if the store has been torn down.
    pub async fn evict(
        &self,
        ineligible: &[IneligibleCandidate],
    ) -> Result<Vec<Selection>, EngineError> {
        if ineligible.is_empty() {
            return Ok(Vec::new());
        }

        tokio::task::yield_now().await;

        let candidate_ids: Vec<CandidateId> = ineligible.iter().map(|c| c.id).collect();
        let transition: TransitionResult = self
            .store
            .submit(SlotCommand::Evict { candidate_ids })
            .await?;

        if transition.removed.is_empty() {
            return Ok(transition.removed);
        }

        let evicted_ids: Vec<CandidateId> =
            transition.removed.iter().map(|s| s.candidate_id).collect();
        info!(?evicted_ids, "Evicted ineligible candidates");

        let names: Vec<String> = transition
            .removed
            .iter()
            .map(|s| s.display_label.clone())
            .collect();
        self.notices.raise(names);

        Ok(transition.removed)
    }
}
