// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{FakeDirectory, create_test_config, ids};
use crate::{EligibilityChecker, EligibilityOutcome, EligibilityRequest, TransportError};
use shift_slots_domain::{CandidateId, ShiftConfig};
use std::sync::Arc;
use std::time::Duration;

fn checker() -> (Arc<FakeDirectory>, EligibilityChecker<FakeDirectory>) {
    let directory: Arc<FakeDirectory> = Arc::new(FakeDirectory::new());
    let checker: EligibilityChecker<FakeDirectory> =
        EligibilityChecker::new(Arc::clone(&directory));
    (directory, checker)
}

#[tokio::test(start_paused = true)]
async fn test_no_query_without_config() {
    let (directory, checker) = checker();

    let outcome: EligibilityOutcome = checker.check(None, &ids(&[11, 22])).await;

    assert_eq!(outcome, EligibilityOutcome::Skipped);
    assert!(directory.eligibility_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_query_without_candidates() {
    let (directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");

    let outcome: EligibilityOutcome = checker.check(Some(&config), &[]).await;

    assert_eq!(outcome, EligibilityOutcome::Skipped);
    assert!(directory.eligibility_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_skip_clears_previous_result() {
    let (_directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");

    checker.check(Some(&config), &ids(&[11, 22])).await;
    assert_eq!(checker.last_result().len(), 1);

    checker.check(None, &ids(&[11, 22])).await;
    assert!(checker.last_result().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reports_ineligible_candidates_with_reason() {
    let (_directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");

    let outcome: EligibilityOutcome = checker.check(Some(&config), &ids(&[11, 22])).await;

    let EligibilityOutcome::Verified(ineligible) = outcome else {
        panic!("expected a verified outcome, got {outcome:?}");
    };
    assert_eq!(ineligible.len(), 1);
    assert_eq!(ineligible[0].id, CandidateId::new(22));
    assert_eq!(ineligible[0].name, "Barbara Liskov");
    assert_eq!(ineligible[0].reason, "Cannot work 'icu' shifts");
}

#[tokio::test(start_paused = true)]
async fn test_identical_query_is_answered_from_cache() {
    let (directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");

    let first: EligibilityOutcome = checker.check(Some(&config), &ids(&[22, 11])).await;
    let second: EligibilityOutcome = checker.check(Some(&config), &ids(&[11, 22])).await;

    assert_eq!(first, second);
    assert_eq!(checker.fetch_count(), 1);
    assert_eq!(directory.eligibility_calls(), vec![ids(&[11, 22])]);
}

#[tokio::test(start_paused = true)]
async fn test_cached_request_is_prepared_synchronously() {
    let (_directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");

    checker.check(Some(&config), &ids(&[11, 22])).await;

    let request: EligibilityRequest = checker.prepare(Some(&config), &ids(&[11, 22]));
    assert!(matches!(
        request,
        EligibilityRequest::Cached { ref ineligible, .. } if ineligible.len() == 1
    ));
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_fails_open() {
    let (directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");
    directory.fail_eligibility(true);

    let outcome: EligibilityOutcome = checker.check(Some(&config), &ids(&[11, 22])).await;

    assert_eq!(
        outcome,
        EligibilityOutcome::FailedOpen(TransportError::Unavailable(String::from(
            "connection refused"
        )))
    );
    assert!(checker.last_result().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_not_cached() {
    let (directory, checker) = checker();
    let config: ShiftConfig = create_test_config("icu");

    directory.fail_eligibility(true);
    checker.check(Some(&config), &ids(&[11, 22])).await;
    directory.fail_eligibility(false);
    let outcome: EligibilityOutcome = checker.check(Some(&config), &ids(&[11, 22])).await;

    assert!(matches!(
        outcome,
        EligibilityOutcome::Verified(ref ineligible) if ineligible.len() == 1
    ));
    assert_eq!(checker.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_response_is_stale() {
    let (directory, checker) = checker();
    directory.set_eligibility_latency(Duration::from_millis(100));
    let icu: ShiftConfig = create_test_config("icu");
    let general: ShiftConfig = create_test_config("general");

    let older: EligibilityRequest = checker.prepare(Some(&icu), &ids(&[11, 22]));
    let newer: EligibilityRequest = checker.prepare(Some(&general), &ids(&[11, 22]));
    let (older, newer) = tokio::join!(checker.resolve(older), checker.resolve(newer));

    assert_eq!(older, EligibilityOutcome::Stale);
    assert_eq!(newer, EligibilityOutcome::Verified(Vec::new()));
    assert!(checker.last_result().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_cached_answer_is_stale() {
    let (directory, checker) = checker();
    let icu: ShiftConfig = create_test_config("icu");
    let general: ShiftConfig = create_test_config("general");
    checker.check(Some(&icu), &ids(&[11, 22])).await;

    let older: EligibilityRequest = checker.prepare(Some(&icu), &ids(&[11, 22]));
    let newer: EligibilityRequest = checker.prepare(Some(&general), &ids(&[11, 22]));
    let newer: EligibilityOutcome = checker.resolve(newer).await;
    let older: EligibilityOutcome = checker.resolve(older).await;

    assert_eq!(newer, EligibilityOutcome::Verified(Vec::new()));
    assert_eq!(older, EligibilityOutcome::Stale);
    assert!(checker.last_result().is_empty());
    assert_eq!(directory.eligibility_calls().len(), 2);
}
