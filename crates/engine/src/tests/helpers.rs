// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{InMemoryDirectory, RosterEntry, ShiftDirectory, TransportError};
use shift_slots_domain::{
    CandidateId, CandidatePage, CandidateProfile, CandidateRole, Category, EligibilityResponse,
    SearchQuery, ShiftConfig, ShiftFormValues, build_fingerprint,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub fn create_test_profile(id: i64, name: &str) -> CandidateProfile {
    CandidateProfile {
        id: CandidateId::new(id),
        name: name.to_string(),
        avatar_url: None,
        favorite: false,
        role: CandidateRole::External,
        completed_shifts_in_facility: 0,
    }
}

/// A roster where candidate 22 cannot work `icu` shifts.
pub fn create_test_roster() -> Vec<RosterEntry> {
    let mut entries: Vec<RosterEntry> = vec![
        RosterEntry::new(create_test_profile(7, "Grace Hopper")),
        RosterEntry::new(create_test_profile(11, "Ada Lovelace")),
        RosterEntry::new(create_test_profile(22, "Barbara Liskov")),
        RosterEntry::new(create_test_profile(33, "Ana Souza")),
        RosterEntry::new(create_test_profile(44, "Ana Maria Costa")),
        RosterEntry::new(create_test_profile(55, "Anabel Reis")),
    ];
    entries[2].blocked_categories = vec![String::from("icu")];
    entries
}

pub fn create_test_form(category: &str) -> ShiftFormValues {
    ShiftFormValues {
        category: Some(Category::new(category)),
        unit: None,
        professional_field: None,
        start_time: Some(String::from("2026-03-02T07:00:00Z")),
        end_time: Some(String::from("2026-03-02T15:00:00Z")),
        dates: vec![String::from("2026-03-02")],
        external_visible: Some(true),
        internal_visible: Some(true),
    }
}

pub fn create_test_config(category: &str) -> ShiftConfig {
    build_fingerprint(&create_test_form(category)).unwrap()
}

pub fn ids(values: &[i64]) -> Vec<CandidateId> {
    values.iter().copied().map(CandidateId::new).collect()
}

pub fn names(profiles: &[CandidateProfile]) -> Vec<String> {
    profiles.iter().map(|p| p.name.clone()).collect()
}

/// A scripted directory over the test roster with latency, failures and
/// call recording.
#[derive(Default)]
pub struct FakeDirectory {
    roster: InMemoryDirectory,
    eligibility_latency: Mutex<Duration>,
    search_latency: Mutex<HashMap<String, Duration>>,
    fail_eligibility: AtomicBool,
    fail_search: AtomicBool,
    eligibility_calls: Mutex<Vec<Vec<CandidateId>>>,
    search_calls: Mutex<Vec<SearchQuery>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            roster: InMemoryDirectory::new(create_test_roster()),
            ..Self::default()
        }
    }

    pub fn with_roster(roster: Vec<RosterEntry>) -> Self {
        Self {
            roster: InMemoryDirectory::new(roster),
            ..Self::default()
        }
    }

    pub fn set_eligibility_latency(&self, latency: Duration) {
        *self.eligibility_latency.lock().unwrap() = latency;
    }

    /// Sets the latency of searches for `term`; `""` is the blank term.
    pub fn set_search_latency(&self, term: &str, latency: Duration) {
        self.search_latency
            .lock()
            .unwrap()
            .insert(term.to_string(), latency);
    }

    pub fn fail_eligibility(&self, fail: bool) {
        self.fail_eligibility.store(fail, Ordering::SeqCst);
    }

    pub fn fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn eligibility_calls(&self) -> Vec<Vec<CandidateId>> {
        self.eligibility_calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<SearchQuery> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn profile(&self, id: i64) -> CandidateProfile {
        self.roster.profile(CandidateId::new(id)).unwrap().clone()
    }
}

impl ShiftDirectory for FakeDirectory {
    async fn fetch_eligibility(
        &self,
        config: &ShiftConfig,
        candidate_ids: &[CandidateId],
    ) -> Result<EligibilityResponse, TransportError> {
        self.eligibility_calls
            .lock()
            .unwrap()
            .push(candidate_ids.to_vec());
        let latency: Duration = *self.eligibility_latency.lock().unwrap();
        tokio::time::sleep(latency).await;

        if self.fail_eligibility.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable(String::from("connection refused")));
        }
        self.roster.fetch_eligibility(config, candidate_ids).await
    }

    async fn search_candidates(
        &self,
        query: &SearchQuery,
    ) -> Result<CandidatePage, TransportError> {
        self.search_calls.lock().unwrap().push(query.clone());
        let term: String = query.term.clone().unwrap_or_default();
        let latency: Duration = self
            .search_latency
            .lock()
            .unwrap()
            .get(&term)
            .copied()
            .unwrap_or_default();
        tokio::time::sleep(latency).await;

        if self.fail_search.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout);
        }
        self.roster.search_candidates(query).await
    }
}
