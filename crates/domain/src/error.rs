// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::CandidateId;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Capacity is outside the supported range, or would drop locked selections.
    InvalidCapacity {
        /// The requested capacity.
        requested: usize,
        /// Why the capacity was rejected.
        reason: String,
    },
    /// Slot index does not address a slot in the store.
    SlotOutOfRange {
        /// The requested slot index.
        index: usize,
        /// The current capacity.
        capacity: usize,
    },
    /// The candidate is already selected in another slot.
    DuplicateCandidate {
        /// The candidate that is already selected.
        candidate_id: CandidateId,
        /// The slot that currently holds the candidate.
        held_by: usize,
    },
    /// The slot holds a locked selection and cannot be changed.
    SlotLocked {
        /// The locked slot index.
        index: usize,
        /// The reason the selection was locked, if one was given.
        reason: Option<String>,
    },
    /// Search page size must be positive.
    InvalidPageSize(u32),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCapacity { requested, reason } => {
                write!(f, "Invalid capacity {requested}: {reason}")
            }
            Self::SlotOutOfRange { index, capacity } => {
                write!(
                    f,
                    "Slot {index} is out of range. Must be between 0 and {}",
                    capacity.saturating_sub(1)
                )
            }
            Self::DuplicateCandidate {
                candidate_id,
                held_by,
            } => {
                write!(
                    f,
                    "Candidate {candidate_id} is already selected in slot {held_by}"
                )
            }
            Self::SlotLocked { index, reason } => match reason {
                Some(reason) => write!(f, "Slot {index} is locked: {reason}"),
                None => write!(f, "Slot {index} is locked"),
            },
            Self::InvalidPageSize(size) => {
                write!(f, "Invalid page size: {size}. Must be greater than 0")
            }
        }
    }
}

impl std::error::Error for DomainError {}
