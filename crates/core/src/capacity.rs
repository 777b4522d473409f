// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity reconciliation.
//!
//! ## Invariants
//!
//! - The rebuilt array is exactly `capacity` long
//! - Locked selections are always kept
//! - When the capacity drops below the number of selections, the last-packed
//!   non-locked selections are dropped and reported back to the caller

use crate::compact::{compact, pack};
use shift_slots_domain::{Capacity, DomainError, Selection, Slot};

/// Rebuilds the slot array at the given capacity.
///
/// # Arguments
///
/// * `slots` - The current slots
/// * `capacity` - The desired capacity
///
/// # Returns
///
/// The rebuilt, left-packed slot array and the selections that no longer fit.
///
/// # Errors
///
/// Returns `DomainError::InvalidCapacity` if the capacity is smaller than the
/// number of locked selections.
pub fn reconcile_capacity(
    slots: &[Slot],
    capacity: Capacity,
) -> Result<(Vec<Slot>, Vec<Selection>), DomainError> {
    let target: usize = capacity.get();
    let packed: Vec<Slot> = compact(slots);

    let locked: usize = packed.iter().filter(|slot| slot.is_locked()).count();
    if locked > target {
        return Err(DomainError::InvalidCapacity {
            requested: target,
            reason: format!("{locked} locked selections cannot be removed"),
        });
    }

    let mut room: usize = target - locked;
    let mut kept: Vec<Selection> = Vec::with_capacity(target);
    let mut dropped: Vec<Selection> = Vec::new();
    for selection in packed.iter().filter_map(Slot::selection) {
        if selection.locked {
            kept.push(selection.clone());
        } else if room > 0 {
            room -= 1;
            kept.push(selection.clone());
        } else {
            dropped.push(selection.clone());
        }
    }

    Ok((pack(kept, target), dropped))
}
