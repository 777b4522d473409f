// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::SlotStore;
use shift_slots_domain::{CandidateId, CandidateProfile, CandidateRole, Capacity, Selection, Slot};

pub fn create_test_profile(id: i64) -> CandidateProfile {
    CandidateProfile {
        id: CandidateId::new(id),
        name: format!("Candidate {id}"),
        avatar_url: None,
        favorite: false,
        role: CandidateRole::External,
        completed_shifts_in_facility: 0,
    }
}

pub fn create_locked_selection(id: i64) -> Selection {
    Selection::locked(create_test_profile(id), Some(String::from("Accepted")))
}

pub fn capacity(value: usize) -> Capacity {
    Capacity::new(value).unwrap()
}

/// Builds a raw slot array from a pattern, `Some(id)` for filled, `None` for empty.
pub fn slots_from_pattern(pattern: &[Option<i64>]) -> Vec<Slot> {
    pattern
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Some(id) => Slot::filled(index, Selection::from_profile(create_test_profile(*id))),
            None => Slot::empty(index),
        })
        .collect()
}

/// Returns the slot contents as a pattern, `Some(id)` for filled, `None` for empty.
pub fn pattern_of(slots: &[Slot]) -> Vec<Option<i64>> {
    slots
        .iter()
        .map(|slot| slot.candidate_id().map(|id| id.value()))
        .collect()
}

/// Every pattern of length `1..=5` over two candidates per position and empties.
pub fn all_patterns() -> Vec<Vec<Option<i64>>> {
    let mut patterns: Vec<Vec<Option<i64>>> = Vec::new();
    for len in 1..=5_u32 {
        for mask in 0..2_u32.pow(len) {
            let pattern: Vec<Option<i64>> = (0..len)
                .map(|bit| {
                    if mask & (1 << bit) == 0 {
                        None
                    } else {
                        Some(i64::from(bit) + 10)
                    }
                })
                .collect();
            patterns.push(pattern);
        }
    }
    patterns
}

pub fn store_with(capacity_value: usize, ids: &[i64]) -> SlotStore {
    let selections: Vec<Selection> = ids
        .iter()
        .map(|id| Selection::from_profile(create_test_profile(*id)))
        .collect();
    SlotStore::new(capacity(capacity_value), selections).unwrap()
}
