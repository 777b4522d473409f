// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_slots_domain::{CandidateId, CandidateProfile, Capacity};

/// A mutation intent against the slot store, expressed as data only.
///
/// Commands are the only way to change the slot store; every writer
/// (user actions, eviction, capacity edits) funnels through `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotCommand {
    /// Place a candidate into a slot, replacing any non-locked selection there.
    Select {
        /// The target slot index.
        index: usize,
        /// The candidate being selected.
        profile: CandidateProfile,
    },
    /// Remove the selection held by a slot.
    Clear {
        /// The slot index to clear.
        index: usize,
    },
    /// Rebuild the store at a new capacity.
    Resize {
        /// The desired capacity.
        capacity: Capacity,
    },
    /// Clear every non-locked slot holding one of the given candidates.
    Evict {
        /// Candidates that are no longer eligible.
        candidate_ids: Vec<CandidateId>,
    },
}

impl SlotCommand {
    /// Returns a short name for the command, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "Select",
            Self::Clear { .. } => "Clear",
            Self::Resize { .. } => "Resize",
            Self::Evict { .. } => "Evict",
        }
    }
}
