// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The candidate directory the engine talks to.
//!
//! The engine only needs two remote operations: an eligibility query for a set
//! of already selected candidates, and a paginated candidate search. Transport,
//! retries and timeouts belong to the implementation.

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use shift_slots_domain::{
    CandidateId, CandidatePage, CandidateProfile, EligibilityResponse, IneligibleCandidate,
    SearchQuery, ShiftConfig,
};
use std::cmp::Reverse;
use std::future::Future;

/// Remote operations consumed by the engine.
pub trait ShiftDirectory: Send + Sync + 'static {
    /// Returns the candidates among `candidate_ids` that cannot work a shift
    /// with the given config.
    fn fetch_eligibility(
        &self,
        config: &ShiftConfig,
        candidate_ids: &[CandidateId],
    ) -> impl Future<Output = Result<EligibilityResponse, TransportError>> + Send;

    /// Returns one page of selectable candidates.
    fn search_candidates(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<CandidatePage, TransportError>> + Send;
}

/// A candidate known to the in-memory directory, with the rules that make
/// them ineligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// The candidate.
    pub profile: CandidateProfile,
    /// Shift categories the candidate cannot work.
    #[serde(default)]
    pub blocked_categories: Vec<String>,
    /// Units the candidate cannot work in.
    #[serde(default)]
    pub blocked_units: Vec<String>,
}

impl RosterEntry {
    /// Creates an entry with no blocking rules.
    #[must_use]
    pub const fn new(profile: CandidateProfile) -> Self {
        Self {
            profile,
            blocked_categories: Vec::new(),
            blocked_units: Vec::new(),
        }
    }

    /// Returns why the candidate cannot work the shift, or `None` if they can.
    #[must_use]
    pub fn ineligibility_reason(&self, config: &ShiftConfig) -> Option<String> {
        if !config.is_visible_to(self.profile.role) {
            return Some(format!(
                "Shift is not visible to {} professionals",
                self.profile.role.as_str().to_lowercase()
            ));
        }
        if self.blocked_categories.contains(&config.category) {
            return Some(format!("Cannot work '{}' shifts", config.category));
        }
        if let Some(unit) = &config.unit
            && self.blocked_units.contains(unit)
        {
            return Some(format!("Cannot work in unit '{unit}'"));
        }
        None
    }
}

/// A `ShiftDirectory` backed by a fixed roster.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    roster: Vec<RosterEntry>,
}

impl InMemoryDirectory {
    /// Creates a directory over the given roster.
    #[must_use]
    pub const fn new(roster: Vec<RosterEntry>) -> Self {
        Self { roster }
    }

    /// Looks up a candidate's profile.
    #[must_use]
    pub fn profile(&self, id: CandidateId) -> Option<&CandidateProfile> {
        self.entry(id).map(|entry| &entry.profile)
    }

    fn entry(&self, id: CandidateId) -> Option<&RosterEntry> {
        self.roster.iter().find(|entry| entry.profile.id == id)
    }
}

impl ShiftDirectory for InMemoryDirectory {
    async fn fetch_eligibility(
        &self,
        config: &ShiftConfig,
        candidate_ids: &[CandidateId],
    ) -> Result<EligibilityResponse, TransportError> {
        let ineligible: Vec<IneligibleCandidate> = candidate_ids
            .iter()
            .filter_map(|id| match self.entry(*id) {
                Some(entry) => entry
                    .ineligibility_reason(config)
                    .map(|reason| IneligibleCandidate {
                        id: *id,
                        name: entry.profile.name.clone(),
                        reason,
                    }),
                None => Some(IneligibleCandidate {
                    id: *id,
                    name: id.to_string(),
                    reason: String::from("Candidate is no longer listed"),
                }),
            })
            .collect();

        Ok(EligibilityResponse { ineligible })
    }

    async fn search_candidates(
        &self,
        query: &SearchQuery,
    ) -> Result<CandidatePage, TransportError> {
        let needle: Option<String> = query.term.as_ref().map(|t| t.to_lowercase());

        let mut matches: Vec<&CandidateProfile> = self
            .roster
            .iter()
            .filter(|entry| !query.exclude_ids.contains(&entry.profile.id))
            .filter(|entry| entry.ineligibility_reason(&query.config).is_none())
            .filter(|entry| {
                needle
                    .as_ref()
                    .is_none_or(|n| entry.profile.name.to_lowercase().contains(n))
            })
            .map(|entry| &entry.profile)
            .collect();
        matches.sort_by_key(|p| {
            (
                Reverse(p.favorite),
                Reverse(p.completed_shifts_in_facility),
                p.name.clone(),
            )
        });

        let offset: usize = query.offset();
        let size: usize = usize::try_from(query.page_size).unwrap_or(usize::MAX);
        let items: Vec<CandidateProfile> = matches
            .iter()
            .skip(offset)
            .take(size)
            .map(|p| (*p).clone())
            .collect();
        let has_next_page: bool = matches.len() > offset.saturating_add(items.len());

        Ok(CandidatePage {
            items,
            has_next_page,
        })
    }
}
