// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{CandidateId, Slot};

/// Validates that a slot index addresses a slot.
///
/// # Arguments
///
/// * `index` - The slot index to validate
/// * `capacity` - The current number of slots
///
/// # Errors
///
/// Returns `DomainError::SlotOutOfRange` if `index >= capacity`.
pub const fn validate_slot_index(index: usize, capacity: usize) -> Result<(), DomainError> {
    if index >= capacity {
        return Err(DomainError::SlotOutOfRange { index, capacity });
    }
    Ok(())
}

/// Validates that a candidate is not already held by a slot other than `target`.
///
/// Re-selecting the candidate already held by `target` is allowed.
///
/// # Arguments
///
/// * `slots` - The current slots
/// * `candidate_id` - The candidate about to be selected
/// * `target` - The slot the candidate is being selected into
///
/// # Errors
///
/// Returns `DomainError::DuplicateCandidate` if another slot holds the candidate.
pub fn validate_candidate_unique(
    slots: &[Slot],
    candidate_id: CandidateId,
    target: usize,
) -> Result<(), DomainError> {
    if let Some(holder) = slots
        .iter()
        .find(|s| s.index != target && s.candidate_id() == Some(candidate_id))
    {
        return Err(DomainError::DuplicateCandidate {
            candidate_id,
            held_by: holder.index,
        });
    }
    Ok(())
}

/// Validates a search page size.
///
/// # Errors
///
/// Returns `DomainError::InvalidPageSize` if `page_size` is zero.
pub const fn validate_page_size(page_size: u32) -> Result<(), DomainError> {
    if page_size == 0 {
        return Err(DomainError::InvalidPageSize(page_size));
    }
    Ok(())
}
