use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::services::candidate_repository::{CandidateListStream, CandidateRepository};
use crate::state::selection::SelectedView;
use crate::state::status::LoadStatus;

/// Candidates shown for the given inputs.
///
/// The base list is the favorites snapshot on the favorites tab and the full
/// snapshot otherwise. A blank query keeps the base list as is; any other
/// query keeps the candidates whose first or last name contains it, ignoring
/// case, in base-list order.
pub fn compose(
    all: &[Candidate],
    favorites: &[Candidate],
    query: &str,
    view: SelectedView,
) -> Vec<Candidate> {
    let base = match view {
        SelectedView::All => all,
        SelectedView::Favorites => favorites,
    };
    if query.trim().is_empty() {
        return base.to_vec();
    }
    base.iter()
        .filter(|candidate| candidate.matches(query))
        .cloned()
        .collect()
}

/// Everything the list screen renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeView {
    pub candidates: Vec<Candidate>,
    pub status: LoadStatus,
    pub selected_view: SelectedView,
    pub search_query: String,
    /// Pending one-shot message, cleared by [`CandidateListComposer::acknowledge_error`].
    pub error: Option<String>,
}

impl HomeView {
    /// The "no results" condition. Independent of `status`.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inputs {
    all: Vec<Candidate>,
    favorites: Vec<Candidate>,
    query: String,
    view: SelectedView,
    status: LoadStatus,
    error: Option<String>,
}

impl Inputs {
    fn view(&self) -> HomeView {
        HomeView {
            candidates: compose(&self.all, &self.favorites, &self.query, self.view),
            status: self.status.clone(),
            selected_view: self.view,
            search_query: self.query.clone(),
            error: self.error.clone(),
        }
    }
}

/// Merges the two candidate snapshots, the search query and the selected tab
/// into one [`HomeView`].
///
/// Every input change recomposes synchronously and publishes the result to
/// all subscribers. The last write per input wins.
pub struct CandidateListComposer {
    inputs: Mutex<Inputs>,
    output: watch::Sender<HomeView>,
}

impl Default for CandidateListComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateListComposer {
    pub fn new() -> Self {
        let (output, _) = watch::channel(HomeView::default());
        Self {
            inputs: Mutex::new(Inputs::default()),
            output,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeView> {
        self.output.subscribe()
    }

    pub fn current(&self) -> HomeView {
        self.output.borrow().clone()
    }

    pub fn on_search_change(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|inputs| inputs.query = query);
    }

    pub fn select_view(&self, view: SelectedView) {
        self.update(|inputs| inputs.view = view);
    }

    pub fn begin_loading(&self) {
        self.update(|inputs| {
            inputs.status.begin_loading();
        });
    }

    pub fn refresh(&self) -> bool {
        let mut refreshed = false;
        self.update(|inputs| refreshed = inputs.status.refresh());
        refreshed
    }

    /// Applies one item of the all-candidates stream. Every item settles the
    /// status; a failure keeps the last snapshot on screen.
    pub fn apply_all(&self, result: Result<Vec<Candidate>>) {
        self.update(|inputs| match result {
            Ok(candidates) => {
                inputs.all = candidates;
                inputs.status.on_loaded();
            }
            Err(e) => {
                let message = e.user_message();
                tracing::warn!(error = %e, "Loading candidates failed");
                inputs.status.on_failed(message.clone());
                inputs.error = Some(message);
            }
        });
    }

    /// Applies one item of the favorites stream. Never touches the status.
    pub fn apply_favorites(&self, result: Result<Vec<Candidate>>) {
        self.update(|inputs| match result {
            Ok(candidates) => inputs.favorites = candidates,
            Err(e) => {
                tracing::warn!(error = %e, "Loading favorite candidates failed");
                inputs.error = Some(e.user_message());
            }
        });
    }

    pub fn acknowledge_error(&self) {
        self.update(|inputs| inputs.error = None);
    }

    fn lock(&self) -> MutexGuard<'_, Inputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, change: impl FnOnce(&mut Inputs)) {
        let mut inputs = self.lock();
        change(&mut inputs);
        let view = inputs.view();
        tracing::debug!(
            displayed = view.candidates.len(),
            status = ?view.status,
            "Candidate list recomposed"
        );
        // Published under the lock so subscribers observe writes in order.
        self.output.send_replace(view);
    }
}

#[derive(Debug, Clone, Copy)]
enum Feed {
    All,
    Favorites,
}

/// Per-screen owner of a [`CandidateListComposer`] fed by the repository.
///
/// Subscriptions live until [`HomeController::dispose`] or drop.
pub struct HomeController {
    repository: CandidateRepository,
    composer: Arc<CandidateListComposer>,
    cancel: CancellationToken,
    all_feed: Mutex<CancellationToken>,
}

impl HomeController {
    /// Marks the screen as loading and subscribes to both candidate queries.
    /// Must be called inside a tokio runtime.
    pub fn start(repository: CandidateRepository) -> Self {
        let composer = Arc::new(CandidateListComposer::new());
        let cancel = CancellationToken::new();

        composer.begin_loading();
        let all_feed = cancel.child_token();
        spawn_feed(
            repository.get_all_candidates(),
            Feed::All,
            composer.clone(),
            all_feed.clone(),
        );
        spawn_feed(
            repository.get_all_favorite_candidates(),
            Feed::Favorites,
            composer.clone(),
            cancel.child_token(),
        );
        tracing::info!("Candidate list screen started");

        Self {
            repository,
            composer,
            cancel,
            all_feed: Mutex::new(all_feed),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeView> {
        self.composer.subscribe()
    }

    pub fn current(&self) -> HomeView {
        self.composer.current()
    }

    pub fn composer(&self) -> &CandidateListComposer {
        &self.composer
    }

    pub fn on_search_change(&self, query: impl Into<String>) {
        self.composer.on_search_change(query);
    }

    pub fn select_view(&self, view: SelectedView) {
        self.composer.select_view(view);
    }

    pub fn toggle_favorites(&self, show: bool) {
        self.select_view(if show {
            SelectedView::Favorites
        } else {
            SelectedView::All
        });
    }

    /// Re-enters loading from a terminal status and restarts the
    /// all-candidates subscription. Ignored while a load is in flight.
    pub fn refresh(&self) {
        if self.cancel.is_cancelled() || !self.composer.current().status.is_terminal() {
            return;
        }
        let token = self.cancel.child_token();
        let previous = {
            let mut feed = self.all_feed.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *feed, token.clone())
        };
        // The old feed must be stopped before LOADING is published.
        previous.cancel();
        self.composer.refresh();
        spawn_feed(
            self.repository.get_all_candidates(),
            Feed::All,
            self.composer.clone(),
            token,
        );
    }

    pub fn dispose(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("Candidate list screen disposed");
        }
        self.cancel.cancel();
    }
}

impl Drop for HomeController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_feed(
    mut stream: CandidateListStream,
    feed: Feed,
    composer: Arc<CandidateListComposer>,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                item = stream.next() => match item {
                    Some(_) if token.is_cancelled() => break,
                    Some(result) => match feed {
                        Feed::All => composer.apply_all(result),
                        Feed::Favorites => composer.apply_favorites(result),
                    },
                    None => break,
                },
            }
        }
        tracing::debug!(?feed, "Candidate feed stopped");
    });
}
