// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-slot candidate lists.
//!
//! Each slot owns a `CandidateSource`: a paginated search over the directory,
//! filtered by a debounced free-text term and excluding the candidates chosen
//! in the other slots.
//!
//! ## Invariants
//!
//! - A first-page response is applied only if the query that produced it is
//!   still the latest requested query (last request wins)
//! - An identical first-page query is not re-issued while it is current
//! - At most one next-page request is in flight, and none while a first page
//!   is loading
//! - Without a settled config the list is empty and nothing is fetched

use crate::debounce::Debouncer;
use crate::directory::ShiftDirectory;
use crate::error::{EngineError, TransportError};
use crate::lock;
use crate::settings::EngineSettings;
use shift_slots_domain::{
    CandidateId, CandidatePage, CandidateProfile, SearchQuery, ShiftConfig, validate_page_size,
};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

/// What a slot's candidate dropdown renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateList {
    /// Candidates loaded so far, in directory order.
    pub items: Vec<CandidateProfile>,
    /// Whether `load_more` can fetch another page.
    pub has_next_page: bool,
    /// Whether a request is in flight.
    pub loading: bool,
    /// The last search failure; cleared by the next successful first page.
    pub error: Option<TransportError>,
}

/// What came of a first-page search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The page was applied and holds this many candidates.
    Applied(usize),
    /// A newer query superseded this one; the response was dropped.
    Stale,
    /// The same query is already current; nothing was sent.
    Deduplicated,
    /// No settled config; the list was cleared and nothing was sent.
    Suppressed,
    /// The list has not been opened yet; the context was only recorded.
    Idle,
    /// The directory failed; the list is empty and carries the error.
    Failed(TransportError),
}

/// What came of a next-page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// No further page, or a request is already in flight.
    Skipped,
    /// This many new candidates were appended.
    Appended(usize),
    /// The list was reset while the page was loading; the page was dropped.
    Stale,
    /// The directory failed; loaded items are kept.
    Failed(TransportError),
}

enum Staged {
    Done(SearchOutcome),
    Fetch(SearchQuery),
}

struct SourceState {
    active: bool,
    config: Option<ShiftConfig>,
    exclude_ids: Vec<CandidateId>,
    term: Option<String>,
    requested: Option<SearchQuery>,
    generation: u64,
    first_page_pending: bool,
    more_pending: bool,
    next_page: u32,
    items: Vec<CandidateProfile>,
    has_next_page: bool,
    error: Option<TransportError>,
}

impl SourceState {
    const fn new() -> Self {
        Self {
            active: false,
            config: None,
            exclude_ids: Vec::new(),
            term: None,
            requested: None,
            generation: 0,
            first_page_pending: false,
            more_pending: false,
            next_page: 1,
            items: Vec::new(),
            has_next_page: false,
            error: None,
        }
    }

    fn to_list(&self) -> CandidateList {
        CandidateList {
            items: self.items.clone(),
            has_next_page: self.has_next_page,
            loading: self.first_page_pending || self.more_pending,
            error: self.error.clone(),
        }
    }
}

struct SourceInner<D> {
    index: usize,
    directory: Arc<D>,
    page_size: u32,
    state: Mutex<SourceState>,
    list: watch::Sender<CandidateList>,
}

impl<D: ShiftDirectory> SourceInner<D> {
    fn publish(&self, state: &SourceState) {
        let next: CandidateList = state.to_list();
        self.list.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn stage_first_page(&self, state: &mut SourceState, force: bool) -> Staged {
        if !state.active {
            return Staged::Done(SearchOutcome::Idle);
        }

        let Some(config) = state.config.clone() else {
            state.requested = None;
            state.generation = state.generation.wrapping_add(1);
            state.first_page_pending = false;
            state.more_pending = false;
            state.next_page = 1;
            state.items.clear();
            state.has_next_page = false;
            state.error = None;
            self.publish(state);
            return Staged::Done(SearchOutcome::Suppressed);
        };

        let query: SearchQuery = SearchQuery {
            config,
            term: state.term.clone(),
            exclude_ids: state.exclude_ids.clone(),
            page: 1,
            page_size: self.page_size,
        };
        if !force && state.error.is_none() && state.requested.as_ref() == Some(&query) {
            return Staged::Done(SearchOutcome::Deduplicated);
        }

        debug!(slot = self.index, term = ?query.term, "Requesting first candidate page");
        state.requested = Some(query.clone());
        state.generation = state.generation.wrapping_add(1);
        state.first_page_pending = true;
        state.more_pending = false;
        self.publish(state);
        Staged::Fetch(query)
    }

    fn stage_term(&self, term: Option<String>) -> Staged {
        let mut state = lock(&self.state);
        state.active = true;
        state.term = term;
        self.stage_first_page(&mut state, false)
    }

    fn stage_context(
        &self,
        config: Option<ShiftConfig>,
        mut exclude_ids: Vec<CandidateId>,
    ) -> Staged {
        exclude_ids.sort_unstable();
        exclude_ids.dedup();
        let mut state = lock(&self.state);
        state.config = config;
        state.exclude_ids = exclude_ids;
        self.stage_first_page(&mut state, false)
    }

    fn stage_open(&self, force: bool) -> Staged {
        let mut state = lock(&self.state);
        state.active = true;
        self.stage_first_page(&mut state, force)
    }

    async fn resolve(&self, staged: Staged) -> SearchOutcome {
        match staged {
            Staged::Done(outcome) => outcome,
            Staged::Fetch(query) => self.resolve_first_page(query).await,
        }
    }

    async fn resolve_first_page(&self, query: SearchQuery) -> SearchOutcome {
        let response: Result<CandidatePage, TransportError> =
            self.directory.search_candidates(&query).await;

        let mut state = lock(&self.state);
        if state.requested.as_ref() != Some(&query) {
            debug!(slot = self.index, term = ?query.term, "Dropping stale candidate page");
            return SearchOutcome::Stale;
        }

        state.first_page_pending = false;
        let outcome: SearchOutcome = match response {
            Ok(page) => {
                let count: usize = page.items.len();
                debug!(
                    slot = self.index,
                    term = ?query.term,
                    count,
                    "Applied first candidate page"
                );
                state.items = page.items;
                state.has_next_page = page.has_next_page;
                state.next_page = 2;
                state.error = None;
                SearchOutcome::Applied(count)
            }
            Err(err) => {
                warn!(slot = self.index, %err, "Candidate search failed");
                state.items.clear();
                state.has_next_page = false;
                state.next_page = 1;
                state.error = Some(err.clone());
                SearchOutcome::Failed(err)
            }
        };
        self.publish(&state);
        outcome
    }

    fn stage_load_more(&self) -> Option<(SearchQuery, u64)> {
        let mut state = lock(&self.state);
        if state.first_page_pending
            || state.more_pending
            || !state.has_next_page
            || state.error.is_some()
        {
            return None;
        }

        let mut query: SearchQuery = state.requested.clone()?;
        query.page = state.next_page;
        state.more_pending = true;
        self.publish(&state);
        Some((query, state.generation))
    }

    async fn resolve_load_more(&self, query: SearchQuery, generation: u64) -> LoadMoreOutcome {
        let response: Result<CandidatePage, TransportError> =
            self.directory.search_candidates(&query).await;

        let mut state = lock(&self.state);
        if state.generation != generation {
            debug!(slot = self.index, page = query.page, "Dropping stale candidate page");
            return LoadMoreOutcome::Stale;
        }

        state.more_pending = false;
        let outcome: LoadMoreOutcome = match response {
            Ok(page) => {
                let fresh: Vec<CandidateProfile> = page
                    .items
                    .into_iter()
                    .filter(|candidate| !state.items.iter().any(|known| known.id == candidate.id))
                    .collect();
                let count: usize = fresh.len();
                debug!(slot = self.index, page = query.page, count, "Appended candidate page");
                state.items.extend(fresh);
                state.has_next_page = page.has_next_page;
                state.next_page = query.page.saturating_add(1);
                LoadMoreOutcome::Appended(count)
            }
            Err(err) => {
                warn!(slot = self.index, page = query.page, %err, "Loading more candidates failed");
                state.error = Some(err.clone());
                LoadMoreOutcome::Failed(err)
            }
        };
        self.publish(&state);
        outcome
    }
}

/// A paginated candidate list for one slot.
///
/// Dropping the source cancels its pending search term and any request still
/// in flight.
pub struct CandidateSource<D> {
    inner: Arc<SourceInner<D>>,
    terms: Debouncer<Option<String>>,
    fetches: Arc<Mutex<JoinSet<()>>>,
    pump: JoinHandle<()>,
}

impl<D: ShiftDirectory> CandidateSource<D> {
    /// Creates the source for slot `index`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured page size is zero.
    pub fn new(
        index: usize,
        directory: Arc<D>,
        settings: &EngineSettings,
    ) -> Result<Self, EngineError> {
        validate_page_size(settings.page_size)?;

        let (list, _rx) = watch::channel(CandidateList::default());
        let inner: Arc<SourceInner<D>> = Arc::new(SourceInner {
            index,
            directory,
            page_size: settings.page_size,
            state: Mutex::new(SourceState::new()),
            list,
        });
        let (terms, mut settled) = Debouncer::spawn(settings.search_quiet_period());
        let fetches: Arc<Mutex<JoinSet<()>>> = Arc::new(Mutex::new(JoinSet::new()));

        let pump: JoinHandle<()> = tokio::spawn({
            let inner: Arc<SourceInner<D>> = Arc::clone(&inner);
            let fetches: Arc<Mutex<JoinSet<()>>> = Arc::clone(&fetches);
            async move {
                while let Some(term) = settled.recv().await {
                    let staged: Staged = inner.stage_term(term);
                    spawn_first_page(&inner, &fetches, staged);
                }
            }
        });

        Ok(Self {
            inner,
            terms,
            fetches,
            pump,
        })
    }

    /// The slot this source serves.
    #[must_use]
    pub fn index(&self) -> usize {
        self.inner.index
    }

    /// Sets the search term after the search quiet period.
    ///
    /// A blank term lists every selectable candidate.
    pub fn search(&self, term: &str) {
        self.terms.push(normalize_term(term));
    }

    /// Sets the search term right away and waits for the first page.
    pub async fn search_now(&self, term: &str) -> SearchOutcome {
        let staged: Staged = self.inner.stage_term(normalize_term(term));
        self.inner.resolve(staged).await
    }

    /// Marks the list as shown and loads its first page if needed.
    pub fn open(&self) {
        let staged: Staged = self.inner.stage_open(false);
        spawn_first_page(&self.inner, &self.fetches, staged);
    }

    /// Records a new search context and refreshes the list in the background.
    ///
    /// An unchanged context does not refetch.
    ///
    /// # Arguments
    ///
    /// * `config` - The settled shift config, `None` if the form is incomplete
    /// * `exclude_ids` - Candidates chosen in the other slots
    pub fn set_context(&self, config: Option<ShiftConfig>, exclude_ids: Vec<CandidateId>) {
        let staged: Staged = self.inner.stage_context(config, exclude_ids);
        spawn_first_page(&self.inner, &self.fetches, staged);
    }

    /// Records a new search context and waits for the refreshed first page.
    pub async fn refresh_context(
        &self,
        config: Option<ShiftConfig>,
        exclude_ids: Vec<CandidateId>,
    ) -> SearchOutcome {
        let staged: Staged = self.inner.stage_context(config, exclude_ids);
        self.inner.resolve(staged).await
    }

    /// Requests the next page and appends it.
    ///
    /// Does nothing if there is no further page or a request is in flight.
    pub async fn load_more(&self) -> LoadMoreOutcome {
        let Some((query, generation)) = self.inner.stage_load_more() else {
            return LoadMoreOutcome::Skipped;
        };
        self.inner.resolve_load_more(query, generation).await
    }

    /// Re-issues the first page for the current term and context.
    pub async fn retry(&self) -> SearchOutcome {
        let staged: Staged = self.inner.stage_open(true);
        self.inner.resolve(staged).await
    }

    /// Returns the current list.
    #[must_use]
    pub fn snapshot(&self) -> CandidateList {
        self.inner.list.borrow().clone()
    }

    /// Subscribes to list changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CandidateList> {
        self.inner.list.subscribe()
    }
}

impl<D> Drop for CandidateSource<D> {
    fn drop(&mut self) {
        self.pump.abort();
        lock(&self.fetches).abort_all();
    }
}

fn spawn_first_page<D: ShiftDirectory>(
    inner: &Arc<SourceInner<D>>,
    fetches: &Mutex<JoinSet<()>>,
    staged: Staged,
) {
    let Staged::Fetch(query) = staged else {
        return;
    };
    let inner: Arc<SourceInner<D>> = Arc::clone(inner);
    let mut fetches = lock(fetches);
    while fetches.try_join_next().is_some() {}
    fetches.spawn(async move {
        inner.resolve_first_page(query).await;
    });
}

fn normalize_term(term: &str) -> Option<String> {
    let trimmed: &str = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
