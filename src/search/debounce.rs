use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::SearchSettings;
use crate::models::PlayerSummary;
use crate::store::PlayerStore;

/// Which search box the debouncer serves. Each has its own length gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSurface {
    /// Full player search page.
    Players,
    /// Header quick search.
    Quick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    pub delay: Duration,
    pub min_query_len: usize,
    pub mobile_breakpoint_px: u32,
    pub mobile_min_query_len: usize,
    pub result_limit: usize,
}

impl SearchPolicy {
    pub fn for_surface(settings: &SearchSettings, surface: SearchSurface) -> Self {
        let min_query_len = match surface {
            SearchSurface::Players => settings.player_min_query_len,
            SearchSurface::Quick => settings.quick_min_query_len,
        };

        Self {
            delay: settings.debounce(),
            min_query_len,
            mobile_breakpoint_px: settings.mobile_breakpoint_px,
            mobile_min_query_len: settings.mobile_min_query_len,
            result_limit: settings.result_limit,
        }
    }

    /// Narrow viewports never get a looser gate than the surface default.
    pub fn min_len_for(&self, viewport_width: u32) -> usize {
        if viewport_width < self.mobile_breakpoint_px {
            self.min_query_len.max(self.mobile_min_query_len)
        } else {
            self.min_query_len
        }
    }

    pub fn should_dispatch(&self, query: &str, viewport_width: u32) -> bool {
        query.trim().chars().count() >= self.min_len_for(viewport_width)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing to show: no query yet, or the query is below the gate.
    Idle,
    /// Waiting out the debounce interval or the remote call.
    Pending { query: String },
    Results { query: String, players: Vec<PlayerSummary> },
    Failed { query: String, message: String },
}

/// Trailing-edge debounce in front of remote player search.
///
/// Every update aborts the previously scheduled task before scheduling a
/// new one, so at most one lookup per session is ever in flight and only
/// the latest query reaches the store. A task that is already running when
/// it gets aborted may still finish; its generation no longer matches, so
/// its result is dropped.
pub struct SearchDebouncer {
    store: Arc<dyn PlayerStore>,
    policy: SearchPolicy,
    pending: Option<JoinHandle<()>>,
    state: Arc<watch::Sender<SearchState>>,
    generation: Arc<AtomicU64>,
}

/// Publish `next` only if no newer update has happened since `issued`.
///
/// The check runs under the channel's lock, which `update` also takes when
/// it publishes, so a superseded result can never land after the newer
/// state.
fn publish_if_current(
    sender: &watch::Sender<SearchState>,
    generation: &AtomicU64,
    issued: u64,
    next: SearchState,
) -> bool {
    sender.send_if_modified(|state| {
        if generation.load(Ordering::SeqCst) != issued {
            return false;
        }
        *state = next;
        true
    })
}

impl SearchDebouncer {
    pub fn new(store: Arc<dyn PlayerStore>, policy: SearchPolicy) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            store,
            policy,
            pending: None,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Feed the current contents of the search box.
    pub fn update(&mut self, query: &str, viewport_width: u32) {
        self.cancel();

        let query = query.trim().to_string();
        if !self.policy.should_dispatch(&query, viewport_width) {
            debug!("Query {:?} below length gate, clearing results", query);
            self.state.send_replace(SearchState::Idle);
            return;
        }

        self.state.send_replace(SearchState::Pending { query: query.clone() });

        let issued = self.generation.load(Ordering::SeqCst);
        let store = Arc::clone(&self.store);
        let sender = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let delay = self.policy.delay;
        let limit = self.policy.result_limit;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            debug!("Dispatching search for {:?}", query);
            let next = match store.search_players(&query, limit).await {
                Ok(players) => SearchState::Results { query, players },
                Err(e) => {
                    warn!("Player search for {:?} failed: {}", query, e);
                    SearchState::Failed { query, message: e.to_string() }
                }
            };
            if !publish_if_current(&sender, &generation, issued, next) {
                debug!("Dropping superseded search result");
            }
        }));
    }

    /// Drop whatever is scheduled without touching the current state.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
