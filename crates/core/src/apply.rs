// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::capacity::reconcile_capacity;
use crate::command::SlotCommand;
use crate::compact::compact;
use crate::error::CoreError;
use crate::state::{SlotStore, TransitionResult};
use shift_slots_domain::{
    CandidateId, DomainError, Selection, Slot, SlotContent, validate_candidate_unique,
    validate_slot_index,
};
use tracing::{debug, info};

/// Applies a command to the current store, producing a new store.
///
/// This is the single mutation gateway for the slot store. Every transition
/// that removes a selection is followed by a compaction pass, so the returned
/// store is always left-packed.
///
/// # Arguments
///
/// * `store` - The current store (immutable)
/// * `command` - The command to apply
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new store and any removed selections
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The slot index is out of range
/// - The target slot holds a locked selection
/// - The candidate is already selected in another slot
/// - The capacity would drop locked selections
pub fn apply(store: &SlotStore, command: SlotCommand) -> Result<TransitionResult, CoreError> {
    debug!(command = command.name(), "Applying slot command");

    match command {
        SlotCommand::Select { index, profile } => {
            let current: &Slot = slot_for_write(store, index)?;
            validate_candidate_unique(store.slots(), profile.id, index)?;

            let selection: Selection = Selection::from_profile(profile);
            let mut slots: Vec<Slot> = store.to_snapshot();
            let mut removed: Vec<Selection> = Vec::new();
            if let Some(previous) = current.selection()
                && previous.candidate_id != selection.candidate_id
            {
                removed.push(previous.clone());
            }
            if let Some(slot) = slots.get_mut(index) {
                slot.content = SlotContent::Filled(selection);
            }

            Ok(TransitionResult {
                new_store: SlotStore::from_slots(compact(&slots)),
                removed,
            })
        }
        SlotCommand::Clear { index } => {
            let current: &Slot = slot_for_write(store, index)?;
            let Some(previous) = current.selection().cloned() else {
                return Ok(unchanged(store));
            };

            let mut slots: Vec<Slot> = store.to_snapshot();
            if let Some(slot) = slots.get_mut(index) {
                slot.content = SlotContent::Empty;
            }

            Ok(TransitionResult {
                new_store: SlotStore::from_slots(compact(&slots)),
                removed: vec![previous],
            })
        }
        SlotCommand::Resize { capacity } => {
            let (slots, dropped) = reconcile_capacity(store.slots(), capacity)?;
            if !dropped.is_empty() {
                let dropped_ids: Vec<CandidateId> =
                    dropped.iter().map(|s| s.candidate_id).collect();
                info!(
                    capacity = capacity.get(),
                    ?dropped_ids,
                    "Capacity shrink dropped trailing selections"
                );
            }

            Ok(TransitionResult {
                new_store: SlotStore::from_slots(slots),
                removed: dropped,
            })
        }
        SlotCommand::Evict { candidate_ids } => {
            let mut slots: Vec<Slot> = store.to_snapshot();
            let mut removed: Vec<Selection> = Vec::new();
            for slot in &mut slots {
                let evictable: bool = slot
                    .selection()
                    .is_some_and(|s| !s.locked && candidate_ids.contains(&s.candidate_id));
                if evictable
                    && let SlotContent::Filled(selection) =
                        std::mem::replace(&mut slot.content, SlotContent::Empty)
                {
                    removed.push(selection);
                }
            }

            if removed.is_empty() {
                return Ok(unchanged(store));
            }

            Ok(TransitionResult {
                new_store: SlotStore::from_slots(compact(&slots)),
                removed,
            })
        }
    }
}

/// Looks up a slot that is about to be written, rejecting locked slots.
fn slot_for_write(store: &SlotStore, index: usize) -> Result<&Slot, CoreError> {
    validate_slot_index(index, store.capacity())?;
    let slot: &Slot = store.slot(index).ok_or(DomainError::SlotOutOfRange {
        index,
        capacity: store.capacity(),
    })?;

    if let Some(selection) = slot.selection()
        && selection.locked
    {
        return Err(CoreError::DomainViolation(DomainError::SlotLocked {
            index,
            reason: selection.locked_reason.clone(),
        }));
    }

    Ok(slot)
}

fn unchanged(store: &SlotStore) -> TransitionResult {
    TransitionResult {
        new_store: store.clone(),
        removed: Vec::new(),
    }
}
