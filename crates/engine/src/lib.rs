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

//! Asynchronous slot synchronization for the shift editor.
//!
//! The engine keeps a fixed number of candidate slots consistent with a shift
//! configuration that is being edited: it debounces the configuration,
//! re-verifies selected candidates against it, evicts the ones that no longer
//! qualify and feeds each slot a paginated, de-duplicated candidate list.

mod candidates;
mod debounce;
mod directory;
mod eligibility;
mod engine;
mod error;
mod eviction;
mod notice;
mod scroll;
mod settings;
mod store;

#[cfg(test)]
mod tests;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Re-export public types
pub use candidates::{CandidateList, CandidateSource, LoadMoreOutcome, SearchOutcome};
pub use debounce::{ConfigPublisher, Debouncer};
pub use directory::{InMemoryDirectory, RosterEntry, ShiftDirectory};
pub use eligibility::{EligibilityChecker, EligibilityKey, EligibilityOutcome, EligibilityRequest};
pub use engine::ShiftSlotsEngine;
pub use error::{EngineError, TransportError};
pub use eviction::EvictionHandler;
pub use notice::{EvictionNotice, NoticeBroadcaster, NoticeEvent};
pub use scroll::{
    RestorePlan, ScrollCoordinator, ScrollDecision, ScrollMetrics, ScrollTarget, handle_scroll,
};
pub use settings::EngineSettings;
pub use store::StoreHandle;

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// None of the guarded state can be left half-updated by a panic, so the
/// poisoned value is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
