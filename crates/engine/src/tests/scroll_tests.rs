// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{FakeDirectory, create_test_config};
use crate::{
    CandidateSource, EngineSettings, LoadMoreOutcome, RestorePlan, ScrollCoordinator,
    ScrollDecision, ScrollMetrics, ScrollTarget, handle_scroll,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct RecordingTarget {
    writes: Vec<f64>,
}

impl ScrollTarget for RecordingTarget {
    fn set_scroll_offset(&mut self, offset: f64) {
        self.writes.push(offset);
    }
}

fn near_bottom() -> ScrollMetrics {
    ScrollMetrics {
        offset: 900.0,
        viewport_height: 100.0,
        content_height: 1_040.0,
    }
}

fn far_from_bottom() -> ScrollMetrics {
    ScrollMetrics {
        offset: 100.0,
        viewport_height: 100.0,
        content_height: 1_040.0,
    }
}

fn coordinator() -> ScrollCoordinator {
    ScrollCoordinator::from_settings(&EngineSettings::default())
}

#[test]
fn test_distance_to_end() {
    assert!((near_bottom().distance_to_end() - 40.0).abs() < f64::EPSILON);
    let overscrolled: ScrollMetrics = ScrollMetrics {
        offset: 1_000.0,
        ..near_bottom()
    };
    assert!(overscrolled.distance_to_end().abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_near_bottom_requests_more() {
    let mut coordinator: ScrollCoordinator = coordinator();

    let decision: ScrollDecision = coordinator.on_scroll(near_bottom(), Instant::now());

    assert_eq!(
        decision,
        ScrollDecision::LoadMore {
            saved_offset: 900.0
        }
    );
    assert!(coordinator.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_far_from_bottom_is_idle() {
    let mut coordinator: ScrollCoordinator = coordinator();

    assert_eq!(
        coordinator.on_scroll(far_from_bottom(), Instant::now()),
        ScrollDecision::Idle
    );
    assert!(!coordinator.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_events_are_throttled() {
    let mut coordinator: ScrollCoordinator = coordinator();
    let start: Instant = Instant::now();

    coordinator.on_scroll(far_from_bottom(), start);
    assert_eq!(
        coordinator.on_scroll(near_bottom(), start + Duration::from_millis(50)),
        ScrollDecision::Throttled
    );
    assert!(matches!(
        coordinator.on_scroll(near_bottom(), start + Duration::from_millis(100)),
        ScrollDecision::LoadMore { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_no_second_request_while_pending() {
    let mut coordinator: ScrollCoordinator = coordinator();
    let start: Instant = Instant::now();

    coordinator.on_scroll(near_bottom(), start);
    assert_eq!(
        coordinator.on_scroll(near_bottom(), start + Duration::from_millis(150)),
        ScrollDecision::Pending
    );
}

#[tokio::test(start_paused = true)]
async fn test_restore_only_after_append() {
    let mut coordinator: ScrollCoordinator = coordinator();
    let start: Instant = Instant::now();

    coordinator.on_scroll(near_bottom(), start);
    assert_eq!(
        coordinator.on_load_finished(true),
        Some(RestorePlan { offset: 900.0 })
    );

    coordinator.on_scroll(near_bottom(), start + Duration::from_millis(200));
    assert_eq!(coordinator.on_load_finished(false), None);
    assert!(!coordinator.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_close_resets_state() {
    let mut coordinator: ScrollCoordinator = coordinator();
    let start: Instant = Instant::now();

    coordinator.on_scroll(near_bottom(), start);
    coordinator.on_close();

    assert!(!coordinator.is_pending());
    assert_eq!(coordinator.on_load_finished(true), None);
    assert!(matches!(
        coordinator.on_scroll(near_bottom(), start),
        ScrollDecision::LoadMore { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_restore_writes_twice() {
    let mut target: RecordingTarget = RecordingTarget::default();

    RestorePlan { offset: 420.0 }.apply(&mut target).await;

    assert_eq!(target.writes, vec![420.0, 420.0]);
}

#[tokio::test(start_paused = true)]
async fn test_handle_scroll_loads_and_restores() {
    let settings: EngineSettings = EngineSettings {
        page_size: 2,
        ..EngineSettings::default()
    };
    let directory: Arc<FakeDirectory> = Arc::new(FakeDirectory::new());
    let source: CandidateSource<FakeDirectory> =
        CandidateSource::new(0, directory, &settings).unwrap();
    source
        .refresh_context(Some(create_test_config("general")), Vec::new())
        .await;
    source.search_now("").await;

    let mut coordinator: ScrollCoordinator = ScrollCoordinator::from_settings(&settings);
    let mut target: RecordingTarget = RecordingTarget::default();
    let start: Instant = Instant::now();

    let outcome: LoadMoreOutcome =
        handle_scroll(&mut coordinator, &source, &mut target, near_bottom(), start).await;
    assert_eq!(outcome, LoadMoreOutcome::Appended(2));
    assert_eq!(source.snapshot().items.len(), 4);
    assert_eq!(target.writes, vec![900.0, 900.0]);

    let outcome: LoadMoreOutcome = handle_scroll(
        &mut coordinator,
        &source,
        &mut target,
        far_from_bottom(),
        start + Duration::from_millis(200),
    )
    .await;
    assert_eq!(outcome, LoadMoreOutcome::Skipped);
    assert_eq!(source.snapshot().items.len(), 4);
}
