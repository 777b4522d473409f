// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Identifies a candidate across searches, selections and eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(i64);

impl CandidateId {
    /// Creates a new candidate identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a candidate relates to the facility publishing the shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateRole {
    /// A professional from outside the facility.
    External,
    /// A member of the facility's own staff.
    Internal,
}

impl CandidateRole {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::External => "EXTERNAL",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for CandidateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The candidate fields the slot engine relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    /// The candidate identifier.
    pub id: CandidateId,
    /// The candidate's display name.
    pub name: String,
    /// Optional avatar image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Whether the facility marked the candidate as a favorite.
    #[serde(default)]
    pub favorite: bool,
    /// The candidate's relationship to the facility.
    pub role: CandidateRole,
    /// Number of shifts the candidate already completed in this facility.
    #[serde(default)]
    pub completed_shifts_in_facility: u32,
}

/// A candidate placed into a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// The selected candidate.
    pub candidate_id: CandidateId,
    /// Label shown for the selection and used in eviction notices.
    pub display_label: String,
    /// The profile the selection was made from.
    pub original: CandidateProfile,
    /// Locked selections are never evicted or removed.
    pub locked: bool,
    /// Why the selection is locked, if it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_reason: Option<String>,
}

impl Selection {
    /// Creates a regular, removable selection from a candidate profile.
    #[must_use]
    pub fn from_profile(profile: CandidateProfile) -> Self {
        Self {
            candidate_id: profile.id,
            display_label: profile.name.clone(),
            original: profile,
            locked: false,
            locked_reason: None,
        }
    }

    /// Creates a locked selection, e.g. for a candidate who already accepted the shift.
    ///
    /// # Arguments
    ///
    /// * `profile` - The candidate profile
    /// * `reason` - Optional human-readable reason for the lock
    #[must_use]
    pub fn locked(profile: CandidateProfile, reason: Option<String>) -> Self {
        Self {
            locked: true,
            locked_reason: reason,
            ..Self::from_profile(profile)
        }
    }
}

/// What a slot currently holds.
///
/// `Empty` is an explicit marker: a slot always exists once the store is built,
/// so there is no "not loaded" state to confuse it with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "selection", rename_all = "snake_case")]
pub enum SlotContent {
    /// No candidate selected.
    #[default]
    Empty,
    /// A candidate is selected.
    Filled(Selection),
}

/// One addressable position in the slot store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Position in the store, `0..capacity`.
    pub index: usize,
    /// The slot's content.
    pub content: SlotContent,
}

impl Slot {
    /// Creates an empty slot at the given index.
    #[must_use]
    pub const fn empty(index: usize) -> Self {
        Self {
            index,
            content: SlotContent::Empty,
        }
    }

    /// Creates a slot holding a selection.
    #[must_use]
    pub const fn filled(index: usize, selection: Selection) -> Self {
        Self {
            index,
            content: SlotContent::Filled(selection),
        }
    }

    /// Returns whether the slot holds no selection.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.content, SlotContent::Empty)
    }

    /// Returns the selection held by the slot, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        match &self.content {
            SlotContent::Filled(selection) => Some(selection),
            SlotContent::Empty => None,
        }
    }

    /// Returns the selected candidate id, if any.
    #[must_use]
    pub fn candidate_id(&self) -> Option<CandidateId> {
        self.selection().map(|s| s.candidate_id)
    }

    /// Returns whether the slot holds a locked selection.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.selection().is_some_and(|s| s.locked)
    }
}

/// The number of slots on a shift, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Capacity(u8);

impl Capacity {
    /// Smallest supported capacity.
    pub const MIN: usize = 1;
    /// Largest supported capacity.
    pub const MAX: usize = 5;

    /// Creates a validated capacity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCapacity` if `value` is outside `1..=5`.
    pub fn new(value: usize) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::InvalidCapacity {
                requested: value,
                reason: format!("must be between {} and {}", Self::MIN, Self::MAX),
            });
        }
        u8::try_from(value)
            .map(Self)
            .map_err(|_| DomainError::InvalidCapacity {
                requested: value,
                reason: String::from("does not fit a slot count"),
            })
    }

    /// Returns the capacity as a slot count.
    #[must_use]
    pub fn get(&self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<usize> for Capacity {
    type Error = DomainError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Capacity> for usize {
    fn from(capacity: Capacity) -> Self {
        capacity.get()
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical snapshot of the shift attributes that eligibility and search depend on.
///
/// Two configs are equivalent iff every field matches. Equivalence is what the
/// publisher and the eligibility cache key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftConfig {
    /// The shift category value.
    pub category: String,
    /// The facility unit, if chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// The professional field, if chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_field: Option<String>,
    /// Shift start time (ISO 8601).
    pub start_time: String,
    /// Shift end time (ISO 8601).
    pub end_time: String,
    /// Whether the shift is visible to external professionals.
    pub external_visible: bool,
    /// Whether the shift is visible to internal staff.
    pub internal_visible: bool,
    /// Dates the shift recurs on, sorted and de-duplicated.
    pub recurrent_dates: Vec<String>,
}

impl ShiftConfig {
    /// Returns whether a candidate with the given role can see this shift at all.
    #[must_use]
    pub const fn is_visible_to(&self, role: CandidateRole) -> bool {
        match role {
            CandidateRole::External => self.external_visible,
            CandidateRole::Internal => self.internal_visible,
        }
    }
}
