// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod directory;
mod error;
mod fingerprint;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use directory::{CandidatePage, EligibilityResponse, IneligibleCandidate, SearchQuery};
pub use error::DomainError;
pub use fingerprint::{Category, ShiftFormValues, build_fingerprint};
pub use types::{
    CandidateId, CandidateProfile, CandidateRole, Capacity, Selection, ShiftConfig, Slot,
    SlotContent,
};
pub use validation::{validate_candidate_unique, validate_page_size, validate_slot_index};
