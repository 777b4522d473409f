// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Infinite scrolling for a candidate list.
//!
//! The coordinator decides when a scroll event should load the next page and
//! remembers where the list was so the position can be put back once the new
//! rows are rendered. Rendering the appended rows may reset the native scroll
//! position, so the offset is written twice: immediately and again on the
//! next scheduler turn.

use crate::candidates::{CandidateSource, LoadMoreOutcome};
use crate::directory::ShiftDirectory;
use crate::settings::EngineSettings;
use std::time::Duration;
use tokio::time::Instant;

/// Geometry of a scrollable list at the time of a scroll event, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Current scroll offset from the top.
    pub offset: f64,
    /// Height of the visible area.
    pub viewport_height: f64,
    /// Height of the whole list.
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Distance between the bottom of the viewport and the end of the list.
    #[must_use]
    pub fn distance_to_end(&self) -> f64 {
        (self.content_height - self.offset - self.viewport_height).max(0.0)
    }
}

/// What a scroll event should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDecision {
    /// Not near the end.
    Idle,
    /// Too soon after the last handled event.
    Throttled,
    /// A page is already loading.
    Pending,
    /// Load the next page; `saved_offset` is restored once it is appended.
    LoadMore {
        /// The scroll offset to restore.
        saved_offset: f64,
    },
}

/// Something whose scroll offset can be written.
pub trait ScrollTarget {
    /// Moves the list to `offset` pixels from the top.
    fn set_scroll_offset(&mut self, offset: f64);
}

/// A pending scroll position restore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestorePlan {
    /// The offset to write back.
    pub offset: f64,
}

impl RestorePlan {
    /// Writes the offset now and once more after yielding to the scheduler.
    pub async fn apply<T: ScrollTarget + ?Sized>(&self, target: &mut T) {
        target.set_scroll_offset(self.offset);
        tokio::task::yield_now().await;
        target.set_scroll_offset(self.offset);
    }
}

/// Throttled "near bottom" detection with scroll position bookkeeping.
#[derive(Debug, Clone)]
pub struct ScrollCoordinator {
    threshold: f64,
    throttle: Duration,
    last_handled: Option<Instant>,
    saved_offset: Option<f64>,
    pending: bool,
}

impl ScrollCoordinator {
    /// Creates a coordinator.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Distance from the end, in pixels, that counts as near bottom
    /// * `throttle` - Minimum interval between handled scroll events
    #[must_use]
    pub const fn new(threshold: f64, throttle: Duration) -> Self {
        Self {
            threshold,
            throttle,
            last_handled: None,
            saved_offset: None,
            pending: false,
        }
    }

    /// Creates a coordinator from the engine settings.
    #[must_use]
    pub const fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.scroll_threshold_px, settings.scroll_throttle())
    }

    /// Handles a scroll event observed at `now`.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> ScrollDecision {
        if let Some(last) = self.last_handled
            && now.saturating_duration_since(last) < self.throttle
        {
            return ScrollDecision::Throttled;
        }
        self.last_handled = Some(now);

        if self.pending {
            return ScrollDecision::Pending;
        }
        if metrics.distance_to_end() > self.threshold {
            return ScrollDecision::Idle;
        }

        self.pending = true;
        self.saved_offset = Some(metrics.offset);
        ScrollDecision::LoadMore {
            saved_offset: metrics.offset,
        }
    }

    /// Records that the requested page finished loading.
    ///
    /// # Returns
    ///
    /// The restore to perform if rows were appended.
    pub const fn on_load_finished(&mut self, appended: bool) -> Option<RestorePlan> {
        self.pending = false;
        match self.saved_offset.take() {
            Some(offset) if appended => Some(RestorePlan { offset }),
            _ => None,
        }
    }

    /// Forgets all offsets and timing; the next open starts clean.
    pub const fn on_close(&mut self) {
        self.last_handled = None;
        self.saved_offset = None;
        self.pending = false;
    }

    /// Whether a page requested by this coordinator is still loading.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Runs one scroll event end to end: decide, load the next page, restore the
/// scroll offset.
///
/// # Returns
///
/// The load outcome, or `LoadMoreOutcome::Skipped` if the event did not ask
/// for a page.
pub async fn handle_scroll<D, T>(
    coordinator: &mut ScrollCoordinator,
    source: &CandidateSource<D>,
    target: &mut T,
    metrics: ScrollMetrics,
    now: Instant,
) -> LoadMoreOutcome
where
    D: ShiftDirectory,
    T: ScrollTarget + ?Sized,
{
    let ScrollDecision::LoadMore { .. } = coordinator.on_scroll(metrics, now) else {
        return LoadMoreOutcome::Skipped;
    };

    let outcome: LoadMoreOutcome = source.load_more().await;
    let appended: bool = matches!(outcome, LoadMoreOutcome::Appended(count) if count > 0);
    if let Some(plan) = coordinator.on_load_finished(appended) {
        plan.apply(target).await;
    }
    outcome
}
