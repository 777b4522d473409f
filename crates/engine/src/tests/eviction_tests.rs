// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_profile;
use crate::{EvictionHandler, EvictionNotice, NoticeBroadcaster, NoticeEvent, StoreHandle};
use shift_slots::SlotStore;
use shift_slots_domain::{CandidateId, Capacity, IneligibleCandidate, Selection, Slot};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const TTL: Duration = Duration::from_secs(5);

fn ineligible(id: i64, name: &str) -> IneligibleCandidate {
    IneligibleCandidate {
        id: CandidateId::new(id),
        name: name.to_string(),
        reason: String::from("Cannot work 'icu' shifts"),
    }
}

fn spawn_store(selections: Vec<Selection>) -> StoreHandle {
    let initial: SlotStore = SlotStore::new(Capacity::new(3).unwrap(), selections).unwrap();
    StoreHandle::spawn(initial).0
}

fn pattern(slots: &[Slot]) -> Vec<Option<i64>> {
    slots
        .iter()
        .map(|slot| slot.candidate_id().map(|id| id.value()))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_eviction_clears_compacts_and_notifies() {
    let store: StoreHandle = spawn_store(vec![
        Selection::from_profile(create_test_profile(11, "Ada Lovelace")),
        Selection::from_profile(create_test_profile(22, "Barbara Liskov")),
    ]);
    let notices: Arc<NoticeBroadcaster> = Arc::new(NoticeBroadcaster::new(TTL));
    let mut events = notices.subscribe();
    let handler: EvictionHandler = EvictionHandler::new(store.clone(), Arc::clone(&notices));

    let removed: Vec<Selection> = handler
        .evict(&[ineligible(22, "Barbara Liskov")])
        .await
        .unwrap();

    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].candidate_id, CandidateId::new(22));
    assert_eq!(pattern(store.current().slots()), vec![Some(11), None, None]);

    let NoticeEvent::Raised(notice) = events.recv().await.unwrap() else {
        panic!("expected a raised notice");
    };
    assert_eq!(notice.names, vec!["Barbara Liskov"]);
}

#[tokio::test(start_paused = true)]
async fn test_locked_selection_is_never_evicted() {
    let store: StoreHandle = spawn_store(vec![
        Selection::locked(create_test_profile(7, "Grace Hopper"), None),
        Selection::from_profile(create_test_profile(11, "Ada Lovelace")),
    ]);
    let notices: Arc<NoticeBroadcaster> = Arc::new(NoticeBroadcaster::new(TTL));
    let handler: EvictionHandler = EvictionHandler::new(store.clone(), Arc::clone(&notices));

    let removed: Vec<Selection> = handler
        .evict(&[ineligible(7, "Grace Hopper"), ineligible(11, "Ada Lovelace")])
        .await
        .unwrap();

    assert_eq!(removed.len(), 1);
    assert_eq!(pattern(store.current().slots()), vec![Some(7), None, None]);
    assert_eq!(notices.current().unwrap().names, vec!["Ada Lovelace"]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_to_evict_raises_no_notice() {
    let store: StoreHandle = spawn_store(vec![Selection::from_profile(create_test_profile(
        11,
        "Ada Lovelace",
    ))]);
    let notices: Arc<NoticeBroadcaster> = Arc::new(NoticeBroadcaster::new(TTL));
    let handler: EvictionHandler = EvictionHandler::new(store.clone(), Arc::clone(&notices));

    assert!(handler.evict(&[]).await.unwrap().is_empty());
    assert!(
        handler
            .evict(&[ineligible(99, "Nobody")])
            .await
            .unwrap()
            .is_empty()
    );
    assert!(notices.current().is_none());
    assert_eq!(pattern(store.current().slots()), vec![Some(11), None, None]);
}

#[tokio::test(start_paused = true)]
async fn test_notice_is_dismissed_after_ttl() {
    let notices: NoticeBroadcaster = NoticeBroadcaster::new(TTL);
    let mut events = notices.subscribe();

    let notice: EvictionNotice = notices.raise(vec![String::from("Ada Lovelace")]).unwrap();
    assert_eq!(notices.current(), Some(notice.clone()));

    sleep(Duration::from_millis(4_900)).await;
    assert_eq!(notices.current(), Some(notice.clone()));

    sleep(Duration::from_millis(200)).await;
    assert!(notices.current().is_none());
    assert_eq!(events.recv().await.unwrap(), NoticeEvent::Raised(notice.clone()));
    assert_eq!(
        events.recv().await.unwrap(),
        NoticeEvent::Dismissed { id: notice.id }
    );
}

#[tokio::test(start_paused = true)]
async fn test_earlier_dismissal_keeps_newer_notice() {
    let notices: NoticeBroadcaster = NoticeBroadcaster::new(TTL);

    let first: EvictionNotice = notices.raise(vec![String::from("Ada Lovelace")]).unwrap();
    sleep(Duration::from_secs(3)).await;
    let second: EvictionNotice = notices.raise(vec![String::from("Barbara Liskov")]).unwrap();
    assert!(second.id > first.id);

    sleep(Duration::from_millis(2_100)).await;
    assert_eq!(notices.current(), Some(second));

    sleep(Duration::from_secs(3)).await;
    assert!(notices.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_names_raise_nothing() {
    let notices: NoticeBroadcaster = NoticeBroadcaster::new(TTL);
    assert!(notices.raise(Vec::new()).is_none());
    assert!(notices.current().is_none());
}
