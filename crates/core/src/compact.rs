// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_slots_domain::{Selection, Slot};

/// Packs all selections to the front of the slot array.
///
/// Selections keep their relative order and empty markers fill the tail.
/// The output has the same length as the input and indices are rewritten to
/// match positions. Compacting an already packed array returns an equal array.
///
/// # Arguments
///
/// * `slots` - The slots to pack
///
/// # Returns
///
/// A new, left-packed slot array.
#[must_use]
pub fn compact(slots: &[Slot]) -> Vec<Slot> {
    let selections: Vec<Selection> = slots.iter().filter_map(Slot::selection).cloned().collect();
    pack(selections, slots.len())
}

/// Returns whether no empty slot precedes a filled one.
#[must_use]
pub fn is_left_packed(slots: &[Slot]) -> bool {
    slots
        .iter()
        .skip_while(|slot| !slot.is_empty())
        .all(Slot::is_empty)
}

/// Lays selections out from index 0 and pads with empty slots up to `len`.
pub(crate) fn pack(selections: Vec<Selection>, len: usize) -> Vec<Slot> {
    let mut slots: Vec<Slot> = selections
        .into_iter()
        .enumerate()
        .map(|(index, selection)| Slot::filled(index, selection))
        .collect();
    let filled: usize = slots.len();
    slots.extend((filled..len).map(Slot::empty));
    slots
}
