// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::compact::pack;
use crate::error::CoreError;
use serde::Serialize;
use shift_slots_domain::{
    CandidateId, Capacity, DomainError, Selection, Slot, validate_candidate_unique,
};

/// The ordered, fixed-length array of selection slots for one shift.
///
/// The store is the single source of truth for what is selected. It is only
/// changed through `apply`, which always returns a left-packed store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStore {
    /// The slots, `capacity` long.
    slots: Vec<Slot>,
}

impl SlotStore {
    /// Creates a store at the given capacity, seeded with initial selections.
    ///
    /// Initial selections are typically locked (e.g. candidates who already
    /// accepted the shift) and are laid out from slot 0 in the order given.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The number of slots
    /// * `initial` - Selections to seed the store with
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are more initial selections than slots
    /// - The same candidate appears twice in `initial`
    pub fn new(capacity: Capacity, initial: Vec<Selection>) -> Result<Self, CoreError> {
        if initial.len() > capacity.get() {
            return Err(CoreError::DomainViolation(DomainError::InvalidCapacity {
                requested: capacity.get(),
                reason: format!("{} initial selections do not fit", initial.len()),
            }));
        }

        let slots: Vec<Slot> = pack(initial, capacity.get());
        for slot in &slots {
            if let Some(candidate_id) = slot.candidate_id() {
                validate_candidate_unique(&slots, candidate_id, slot.index)?;
            }
        }

        Ok(Self { slots })
    }

    /// Creates an empty store at the given capacity.
    #[must_use]
    pub fn empty(capacity: Capacity) -> Self {
        Self {
            slots: pack(Vec::new(), capacity.get()),
        }
    }

    pub(crate) const fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns the slot at `index`, if it exists.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Returns all selections in slot order.
    pub fn selections(&self) -> impl Iterator<Item = &Selection> {
        self.slots.iter().filter_map(Slot::selection)
    }

    /// Returns the number of filled slots.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selections().count()
    }

    /// Returns the ids of every selected candidate, in slot order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<CandidateId> {
        self.selections().map(|s| s.candidate_id).collect()
    }

    /// Returns the ids whose eligibility must be re-verified.
    ///
    /// Locked selections count as eligible unconditionally and are left out.
    /// The ids are sorted so equal selections produce equal queries.
    #[must_use]
    pub fn eligibility_candidate_ids(&self) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = self
            .selections()
            .filter(|s| !s.locked)
            .map(|s| s.candidate_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the ids chosen in every slot except `index`, sorted.
    ///
    /// A slot's candidate search excludes these so a candidate can never be
    /// picked twice.
    #[must_use]
    pub fn excluded_ids_for_slot(&self, index: usize) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = self
            .slots
            .iter()
            .filter(|slot| slot.index != index)
            .filter_map(Slot::candidate_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns a read-only copy of the slots for rendering.
    #[must_use]
    pub fn to_snapshot(&self) -> Vec<Slot> {
        self.slots.clone()
    }
}

/// The result of a successful slot store transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The store after the transition.
    pub new_store: SlotStore,
    /// Selections taken out of the store by this transition.
    pub removed: Vec<Selection>,
}
