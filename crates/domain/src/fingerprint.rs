// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift fingerprint derivation.
//!
//! The fingerprint is a pure function of the watched form fields. It runs on
//! every field change; coalescing bursts of changes is the publisher's job.
//!
//! ## Invariants
//!
//! - An incomplete form yields `None`, never a partial config
//! - Equal form contents yield equal configs regardless of date order or
//!   surrounding whitespace

use crate::types::ShiftConfig;
use serde::{Deserialize, Serialize};

/// A selected shift category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The category value sent to the directory.
    pub value: String,
    /// The category label shown in the form.
    #[serde(default)]
    pub label: String,
}

impl Category {
    /// Creates a category whose label equals its value.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// The raw values of the form fields the fingerprint watches.
///
/// Every field is optional because the form may be half filled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShiftFormValues {
    /// Selected category.
    pub category: Option<Category>,
    /// Selected unit.
    pub unit: Option<String>,
    /// Selected professional field.
    pub professional_field: Option<String>,
    /// Start time (ISO 8601).
    pub start_time: Option<String>,
    /// End time (ISO 8601).
    pub end_time: Option<String>,
    /// Dates picked for the shift.
    pub dates: Vec<String>,
    /// External visibility toggle; `None` until the toggle has a value.
    pub external_visible: Option<bool>,
    /// Internal visibility toggle; `None` until the toggle has a value.
    pub internal_visible: Option<bool>,
}

/// Derives the canonical shift config from the current form values.
///
/// # Arguments
///
/// * `values` - The current form values
///
/// # Returns
///
/// * `Some(ShiftConfig)` when the category, start time, end time, at least one
///   date and both visibility flags are present
/// * `None` when any of them is missing or blank
#[must_use]
pub fn build_fingerprint(values: &ShiftFormValues) -> Option<ShiftConfig> {
    let category: String = non_blank(values.category.as_ref().map(|c| c.value.as_str()))?;
    let start_time: String = non_blank(values.start_time.as_deref())?;
    let end_time: String = non_blank(values.end_time.as_deref())?;
    let external_visible: bool = values.external_visible?;
    let internal_visible: bool = values.internal_visible?;

    let mut recurrent_dates: Vec<String> = values
        .dates
        .iter()
        .filter_map(|d| non_blank(Some(d.as_str())))
        .collect();
    if recurrent_dates.is_empty() {
        return None;
    }
    recurrent_dates.sort();
    recurrent_dates.dedup();

    Some(ShiftConfig {
        category,
        unit: non_blank(values.unit.as_deref()),
        professional_field: non_blank(values.professional_field.as_deref()),
        start_time,
        end_time,
        external_visible,
        internal_visible,
        recurrent_dates,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
