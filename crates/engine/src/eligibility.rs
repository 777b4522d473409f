// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Eligibility re-verification for already selected candidates.
//!
//! ## Invariants
//!
//! - No query is issued without a settled config and at least one id
//! - Identical `(config, ids)` pairs are answered from the cache
//! - A response is applied only if its key is still the latest requested key
//! - A transport failure never evicts anything (fail-open)

use crate::directory::ShiftDirectory;
use crate::error::TransportError;
use crate::lock;
use shift_slots_domain::{CandidateId, EligibilityResponse, IneligibleCandidate, ShiftConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Maximum number of cached eligibility answers.
const CACHE_CAPACITY: usize = 64;

/// Identifies one eligibility query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EligibilityKey {
    /// The settled config the query was made for.
    pub config: ShiftConfig,
    /// The queried candidate ids, sorted and de-duplicated.
    pub candidate_ids: Vec<CandidateId>,
}

impl EligibilityKey {
    /// Creates a key, normalizing the id order.
    #[must_use]
    pub fn new(config: ShiftConfig, candidate_ids: &[CandidateId]) -> Self {
        let mut ids: Vec<CandidateId> = candidate_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Self {
            config,
            candidate_ids: ids,
        }
    }
}

/// A prepared eligibility query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityRequest {
    /// Nothing to verify; prior results were cleared.
    Skipped,
    /// Answered from the cache.
    Cached {
        /// The query the answer belongs to.
        key: EligibilityKey,
        /// The cached ineligible candidates.
        ineligible: Vec<IneligibleCandidate>,
    },
    /// Must be fetched from the directory.
    Fetch(EligibilityKey),
}

/// What came of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityOutcome {
    /// No config or no ids; nothing was queried.
    Skipped,
    /// The directory answered; these candidates are no longer eligible.
    Verified(Vec<IneligibleCandidate>),
    /// A newer query superseded this one; the answer was dropped.
    Stale,
    /// The directory could not be reached; nothing is treated as ineligible.
    FailedOpen(TransportError),
}

#[derive(Default)]
struct EligibilityCache {
    entries: HashMap<EligibilityKey, Vec<IneligibleCandidate>>,
    order: VecDeque<EligibilityKey>,
}

impl EligibilityCache {
    fn get(&self, key: &EligibilityKey) -> Option<Vec<IneligibleCandidate>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: EligibilityKey, ineligible: Vec<IneligibleCandidate>) {
        if self.entries.insert(key.clone(), ineligible).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > CACHE_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

/// Checks whether selected candidates are still eligible for the settled config.
pub struct EligibilityChecker<D> {
    directory: Arc<D>,
    cache: Mutex<EligibilityCache>,
    latest: Mutex<Option<EligibilityKey>>,
    result: watch::Sender<Vec<IneligibleCandidate>>,
    fetches: AtomicUsize,
}

impl<D: ShiftDirectory> EligibilityChecker<D> {
    /// Creates a checker backed by `directory`.
    #[must_use]
    pub fn new(directory: Arc<D>) -> Self {
        let (result, _rx) = watch::channel(Vec::new());
        Self {
            directory,
            cache: Mutex::new(EligibilityCache::default()),
            latest: Mutex::new(None),
            result,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Records a query as the latest one and resolves it from the cache if possible.
    ///
    /// This is synchronous so that the order in which queries are prepared is
    /// the order used for fencing, regardless of when they are resolved.
    ///
    /// # Arguments
    ///
    /// * `config` - The settled config, `None` if the form is incomplete
    /// * `candidate_ids` - Selected, non-locked candidate ids
    pub fn prepare(
        &self,
        config: Option<&ShiftConfig>,
        candidate_ids: &[CandidateId],
    ) -> EligibilityRequest {
        let Some(config) = config.filter(|_| !candidate_ids.is_empty()) else {
            *lock(&self.latest) = None;
            self.result.send_replace(Vec::new());
            return EligibilityRequest::Skipped;
        };

        let key: EligibilityKey = EligibilityKey::new(config.clone(), candidate_ids);
        *lock(&self.latest) = Some(key.clone());

        let cached: Option<Vec<IneligibleCandidate>> = lock(&self.cache).get(&key);
        match cached {
            Some(ineligible) => {
                debug!(ids = ?key.candidate_ids, "Eligibility answered from cache");
                EligibilityRequest::Cached { key, ineligible }
            }
            None => EligibilityRequest::Fetch(key),
        }
    }

    /// Resolves a prepared query.
    pub async fn resolve(&self, request: EligibilityRequest) -> EligibilityOutcome {
        let key: EligibilityKey = match request {
            EligibilityRequest::Skipped => return EligibilityOutcome::Skipped,
            EligibilityRequest::Cached { key, ineligible } => {
                return self.apply_if_latest(&key, ineligible);
            }
            EligibilityRequest::Fetch(key) => key,
        };

        debug!(ids = ?key.candidate_ids, "Issuing eligibility query");
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let response: Result<EligibilityResponse, TransportError> = self
            .directory
            .fetch_eligibility(&key.config, &key.candidate_ids)
            .await;

        let response: EligibilityResponse = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    %err,
                    ids = ?key.candidate_ids,
                    "Eligibility check failed; keeping selections"
                );
                return EligibilityOutcome::FailedOpen(err);
            }
        };

        let ineligible: Vec<IneligibleCandidate> = response
            .ineligible
            .into_iter()
            .filter(|candidate| key.candidate_ids.contains(&candidate.id))
            .collect();
        lock(&self.cache).insert(key.clone(), ineligible.clone());

        self.apply_if_latest(&key, ineligible)
    }

    fn apply_if_latest(
        &self,
        key: &EligibilityKey,
        ineligible: Vec<IneligibleCandidate>,
    ) -> EligibilityOutcome {
        if lock(&self.latest).as_ref() != Some(key) {
            debug!(ids = ?key.candidate_ids, "Dropping stale eligibility response");
            return EligibilityOutcome::Stale;
        }

        self.result.send_replace(ineligible.clone());
        EligibilityOutcome::Verified(ineligible)
    }

    /// Prepares and resolves a query in one step.
    pub async fn check(
        &self,
        config: Option<&ShiftConfig>,
        candidate_ids: &[CandidateId],
    ) -> EligibilityOutcome {
        let request: EligibilityRequest = self.prepare(config, candidate_ids);
        self.resolve(request).await
    }

    /// Returns the ineligible candidates from the latest applied answer.
    #[must_use]
    pub fn last_result(&self) -> Vec<IneligibleCandidate> {
        self.result.borrow().clone()
    }

    /// Returns how many queries actually reached the directory.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}
