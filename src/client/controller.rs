use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::models::SearchResponse;
use crate::data_models::{Category, Tag};
use crate::errors::ClientError;
use crate::widget::WidgetConfig;

use super::api::{SearchApi, SearchRequest};
use super::history::History;
use super::state::{Action, ClientSearchState};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Displaying,
    Error(String),
}

/// A search that has been issued but not settled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub token: u64,
    pub request: SearchRequest,
    scroll_into_view: bool,
}

type TaxonomyOutcome = (
    Result<Vec<Category>, ClientError>,
    Result<Vec<Tag>, ClientError>,
);

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ClientError::Timeout(limit))?
}

/// Owns the widget's filter state and keeps it, the address bar and the
/// displayed results consistent.
///
/// Searches can be driven in one step with [`dispatch`](Self::dispatch), or
/// split into [`begin`](Self::begin) and [`finish`](Self::finish) when the
/// fetch runs elsewhere. Each search gets a fresh token and only the latest
/// one may settle the view.
pub struct SearchController<A, H> {
    api: Arc<A>,
    history: H,
    config: WidgetConfig,
    timeout: Duration,
    state: ClientSearchState,
    phase: Phase,
    results: SearchResponse,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    latest_token: u64,
    scroll_requested: bool,
    taxonomy: Option<JoinHandle<TaxonomyOutcome>>,
}

impl<A: SearchApi + 'static, H: History> SearchController<A, H> {
    pub fn new(api: A, history: H, config: WidgetConfig) -> Self {
        Self {
            api: Arc::new(api),
            history,
            config,
            timeout: DEFAULT_TIMEOUT,
            state: ClientSearchState::default(),
            phase: Phase::Idle,
            results: SearchResponse::empty(1),
            categories: Vec::new(),
            tags: Vec::new(),
            latest_token: 0,
            scroll_requested: false,
            taxonomy: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> &ClientSearchState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn results(&self) -> &SearchResponse {
        &self.results
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// True once after a pagination click has settled; the renderer should
    /// scroll the results container into view.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    /// Initial load: filters come from the address bar and the first search
    /// settles as soon as it answers. Categories and tags are fetched in the
    /// background; [`load_taxonomies`](Self::load_taxonomies) collects them.
    pub async fn mount(&mut self) {
        let from_url = ClientSearchState::from_query_string(&self.history.current_query());
        let pending = self.begin(from_url, false);

        let api = Arc::clone(&self.api);
        let limit = self.timeout;
        self.taxonomy = Some(tokio::spawn(async move {
            tokio::join!(bounded(limit, api.categories()), bounded(limit, api.tags()))
        }));

        let outcome = bounded(self.timeout, self.api.search(&pending.request)).await;
        self.finish(pending, outcome);
    }

    /// Waits for the taxonomy fetch started by [`mount`](Self::mount). A
    /// failed fetch leaves its list empty without affecting the results.
    pub async fn load_taxonomies(&mut self) {
        let Some(handle) = self.taxonomy.take() else {
            return;
        };
        let (categories, tags) = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Taxonomy fetch did not complete: {e}");
                return;
            }
        };

        self.categories = categories.unwrap_or_else(|e| {
            log::warn!("Error loading categories: {e}");
            Vec::new()
        });
        self.tags = tags.unwrap_or_else(|e| {
            log::warn!("Error loading tags: {e}");
            Vec::new()
        });
    }

    /// True while the taxonomy fetch started by `mount` is still outstanding.
    pub fn taxonomies_pending(&self) -> bool {
        self.taxonomy.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Applies a user action, records the new filters in the address bar and
    /// searches. Returns whether the result was applied.
    pub async fn dispatch(&mut self, action: Action) -> bool {
        let next = self.state.apply(&action);
        let paginating = matches!(action, Action::GoToPage(_)) && next.page != self.state.page;
        let mut pending = self.begin(next, true);
        pending.scroll_into_view = paginating;
        let outcome = bounded(self.timeout, self.api.search(&pending.request)).await;
        self.finish(pending, outcome)
    }

    /// Back/forward navigation: re-reads the address bar and searches again
    /// without adding a history entry.
    pub async fn history_navigated(&mut self) -> bool {
        let from_url = ClientSearchState::from_query_string(&self.history.current_query());
        let pending = self.begin(from_url, false);
        let outcome = bounded(self.timeout, self.api.search(&pending.request)).await;
        self.finish(pending, outcome)
    }

    /// Adopts the filters of `next`, optionally pushes them to the address
    /// bar, and enters `Loading`.
    pub fn begin(&mut self, next: ClientSearchState, push_url: bool) -> PendingSearch {
        self.state = self.state.with_filters_of(&next);
        if push_url {
            self.history.push(&self.state.to_query_string());
        }

        self.state.loading = true;
        self.phase = Phase::Loading;
        self.latest_token += 1;

        PendingSearch {
            token: self.latest_token,
            request: SearchRequest::from_state(&self.state, self.config.posts_per_page),
            scroll_into_view: false,
        }
    }

    /// Settles `pending` with `outcome`. Outcomes of superseded searches are
    /// dropped and `false` is returned.
    pub fn finish(
        &mut self,
        pending: PendingSearch,
        outcome: Result<SearchResponse, ClientError>,
    ) -> bool {
        if pending.token != self.latest_token {
            log::debug!(
                "discarding stale search response #{} (latest #{})",
                pending.token,
                self.latest_token
            );
            return false;
        }

        self.state.loading = false;
        match outcome {
            Ok(response) => {
                if pending.scroll_into_view && self.state.initial_load_completed {
                    self.scroll_requested = true;
                }
                self.results = response;
                self.phase = Phase::Displaying;
            }
            Err(e) => {
                log::error!("Error performing search: {e}");
                self.results = SearchResponse::empty(self.state.page);
                self.phase = Phase::Error(e.to_string());
            }
        }
        self.state.initial_load_completed = true;
        true
    }
}
