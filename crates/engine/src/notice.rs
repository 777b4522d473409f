// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transient eviction notices.
//!
//! Notices are informational only: they tell the user which candidates were
//! removed from the shift and disappear on their own after a fixed time.

use crate::lock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tracing::debug;

/// Maximum number of notice events to buffer in the broadcast channel.
/// If subscribers cannot keep up, older events will be dropped.
const NOTICE_BUFFER_SIZE: usize = 32;

/// A notice listing candidates that were removed from their slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionNotice {
    /// Monotonically increasing notice id.
    pub id: u64,
    /// Display names of the removed candidates.
    pub names: Vec<String>,
    /// When the notice was raised (UTC, ISO 8601).
    pub raised_at: String,
}

/// Notice stream events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoticeEvent {
    /// A notice should be shown.
    Raised(EvictionNotice),
    /// The notice with this id should be hidden.
    Dismissed {
        /// The dismissed notice id.
        id: u64,
    },
}

/// Broadcaster for eviction notices with automatic dismissal.
pub struct NoticeBroadcaster {
    tx: broadcast::Sender<NoticeEvent>,
    active: Arc<watch::Sender<Option<EvictionNotice>>>,
    next_id: AtomicU64,
    ttl: Duration,
    dismissals: Mutex<JoinSet<()>>,
}

impl NoticeBroadcaster {
    /// Creates a broadcaster whose notices are dismissed after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = broadcast::channel(NOTICE_BUFFER_SIZE);
        let (active, _active_rx) = watch::channel(None);
        Self {
            tx,
            active: Arc::new(active),
            next_id: AtomicU64::new(1),
            ttl,
            dismissals: Mutex::new(JoinSet::new()),
        }
    }

    /// Raises a notice listing `names` and schedules its dismissal.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// The raised notice, or `None` if `names` is empty.
    pub fn raise(&self, names: Vec<String>) -> Option<EvictionNotice> {
        if names.is_empty() {
            return None;
        }

        let raised_at: String = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown"));
        let notice: EvictionNotice = EvictionNotice {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            names,
            raised_at,
        };

        self.active.send_replace(Some(notice.clone()));
        self.broadcast(NoticeEvent::Raised(notice.clone()));

        let id: u64 = notice.id;
        let ttl: Duration = self.ttl;
        let tx: broadcast::Sender<NoticeEvent> = self.tx.clone();
        let active: Arc<watch::Sender<Option<EvictionNotice>>> = Arc::clone(&self.active);
        let mut dismissals = lock(&self.dismissals);
        while dismissals.try_join_next().is_some() {}
        dismissals.spawn(async move {
            tokio::time::sleep(ttl).await;
            active.send_if_modified(|current| {
                if current.as_ref().is_some_and(|n| n.id == id) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
            // No receivers is fine
            let _ = tx.send(NoticeEvent::Dismissed { id });
        });

        Some(notice)
    }

    /// Returns the notice currently on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<EvictionNotice> {
        self.active.borrow().clone()
    }

    /// Subscribes to future notice events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NoticeEvent> {
        self.tx.subscribe()
    }

    fn broadcast(&self, event: NoticeEvent) {
        match self.tx.send(event) {
            Ok(count) => debug!(receivers = count, "Broadcast notice event"),
            Err(_) => debug!("No receivers for notice event"),
        }
    }
}
