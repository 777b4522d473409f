// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use shift_slots_domain::{DomainError, validate_page_size};
use std::time::Duration;

/// Timing and paging knobs for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Quiet period before a shift fingerprint is published.
    pub config_quiet_period_ms: u64,
    /// Quiet period before a search term is sent.
    pub search_quiet_period_ms: u64,
    /// How long an eviction notice stays up.
    pub notice_ttl_ms: u64,
    /// Candidates per search page.
    pub page_size: u32,
    /// Distance from the end of a list that counts as "near bottom".
    pub scroll_threshold_px: f64,
    /// Minimum interval between handled scroll events.
    pub scroll_throttle_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            config_quiet_period_ms: 300,
            search_quiet_period_ms: 300,
            notice_ttl_ms: 5_000,
            page_size: 20,
            scroll_threshold_px: 50.0,
            scroll_throttle_ms: 100,
        }
    }
}

impl EngineSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPageSize` if the page size is zero.
    pub const fn validate(&self) -> Result<(), DomainError> {
        validate_page_size(self.page_size)
    }

    /// Quiet period for the config publisher.
    #[must_use]
    pub const fn config_quiet_period(&self) -> Duration {
        Duration::from_millis(self.config_quiet_period_ms)
    }

    /// Quiet period for candidate search terms.
    #[must_use]
    pub const fn search_quiet_period(&self) -> Duration {
        Duration::from_millis(self.search_quiet_period_ms)
    }

    /// Lifetime of an eviction notice.
    #[must_use]
    pub const fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    /// Minimum interval between handled scroll events.
    #[must_use]
    pub const fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }
}
