// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response shapes exchanged with the candidate directory.

use crate::error::DomainError;
use crate::types::{CandidateId, CandidateProfile, ShiftConfig};
use crate::validation::validate_page_size;
use serde::{Deserialize, Serialize};

/// A candidate the directory no longer considers eligible for a shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IneligibleCandidate {
    /// The candidate identifier.
    pub id: CandidateId,
    /// The candidate's display name.
    pub name: String,
    /// Human-readable reason for the ineligibility.
    pub reason: String,
}

/// The directory's answer to an eligibility query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EligibilityResponse {
    /// Candidates that are not eligible for the queried config.
    pub ineligible: Vec<IneligibleCandidate>,
}

/// One page of a candidate search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePage {
    /// The candidates on this page.
    pub items: Vec<CandidateProfile>,
    /// Whether another page follows.
    pub has_next_page: bool,
}

/// A paginated candidate search for one shift config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// The settled shift config.
    pub config: ShiftConfig,
    /// Free-text filter; `None` lists everyone.
    pub term: Option<String>,
    /// Candidates that must not appear in the results.
    pub exclude_ids: Vec<CandidateId>,
    /// 1-based page number.
    pub page: u32,
    /// Maximum number of items per page.
    pub page_size: u32,
}

impl SearchQuery {
    /// Creates a search query.
    ///
    /// # Arguments
    ///
    /// * `config` - The settled shift config
    /// * `term` - Optional free-text filter
    /// * `exclude_ids` - Candidates to leave out
    /// * `page` - 1-based page number
    /// * `page_size` - Items per page
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPageSize` if `page_size` is zero.
    pub fn new(
        config: ShiftConfig,
        term: Option<String>,
        exclude_ids: Vec<CandidateId>,
        page: u32,
        page_size: u32,
    ) -> Result<Self, DomainError> {
        validate_page_size(page_size)?;
        Ok(Self {
            config,
            term,
            exclude_ids,
            page: page.max(1),
            page_size,
        })
    }

    /// Returns the zero-based offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let page: usize = usize::try_from(self.page.saturating_sub(1)).unwrap_or(usize::MAX);
        let size: usize = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        page.saturating_mul(size)
    }
}
