use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::RevealConfig;
use crate::errors::FetchError;
use crate::external::data_source::{NewsSource, StockSource};
use crate::models::{NewsItem, NewsQuery, StockSnapshot, Symbol};
use crate::services::view_state::{Status, ViewState};

/// One screen's way of turning its parameters into a collection.
#[async_trait]
pub trait Fetcher<P, T>: Send + Sync {
    async fn fetch(&self, params: &P) -> Result<Vec<T>, FetchError>;
}

#[async_trait]
impl Fetcher<NewsQuery, NewsItem> for Arc<dyn NewsSource> {
    async fn fetch(&self, params: &NewsQuery) -> Result<Vec<NewsItem>, FetchError> {
        self.fetch_news(params).await
    }
}

/// The stock screen holds at most one snapshot; a successful fetch swaps it
/// out as a whole.
#[async_trait]
impl Fetcher<Symbol, StockSnapshot> for Arc<dyn StockSource> {
    async fn fetch(&self, params: &Symbol) -> Result<Vec<StockSnapshot>, FetchError> {
        self.fetch_snapshot(params).await.map(|s| vec![s])
    }
}

/// Handle for one issued request. Only the most recently issued ticket is
/// allowed to change the state.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

struct Inner<P, T> {
    state: ViewState<T>,
    issued: u64,
    params: Option<P>,
}

/// Owns a [`ViewState`] and reconciles fetch outcomes into it.
///
/// The lock is only taken for synchronous updates, never across an await.
pub struct ViewStateController<P, T> {
    fetcher: Arc<dyn Fetcher<P, T>>,
    inner: Mutex<Inner<P, T>>,
}

impl<P, T> ViewStateController<P, T>
where
    P: Clone + Send + Sync + std::fmt::Debug,
    T: Clone + Send,
{
    pub fn new(fetcher: Arc<dyn Fetcher<P, T>>, reveal: RevealConfig) -> Self {
        Self {
            fetcher,
            inner: Mutex::new(Inner {
                state: ViewState::new(reveal),
                issued: 0,
                params: None,
            }),
        }
    }

    /// Issue a new request: bump the sequence number and enter `loading`.
    pub fn begin(&self, params: P) -> Ticket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.params = Some(params);
        inner.state.begin_loading();
        Ticket { seq: inner.issued }
    }

    /// Like [`begin`](Self::begin) but refuses while a request is in flight.
    pub fn try_begin(&self, params: P) -> Option<Ticket> {
        let mut inner = self.inner.lock();
        if inner.state.status() == Status::Loading {
            return None;
        }
        inner.issued += 1;
        inner.params = Some(params);
        inner.state.begin_loading();
        Some(Ticket { seq: inner.issued })
    }

    /// Apply the outcome of `ticket`. Returns `false` when the ticket has been
    /// superseded and the outcome was dropped.
    pub fn complete(&self, ticket: Ticket, outcome: Result<Vec<T>, FetchError>) -> bool {
        let mut inner = self.inner.lock();
        if ticket.seq != inner.issued {
            debug!(
                "Discarding stale result #{} (latest issued #{})",
                ticket.seq, inner.issued
            );
            return false;
        }

        match outcome {
            Ok(items) => inner.state.apply_success(items),
            Err(e) => {
                warn!("Fetch #{} for {:?} failed: {}", ticket.seq, inner.params, e);
                inner.state.apply_failure(&e);
            }
        }
        true
    }

    /// Fetch for `params` and reconcile. Returns whether this call's outcome
    /// was applied (a newer call may have superseded it).
    pub async fn refresh(&self, params: P) -> bool {
        let ticket = self.begin(params.clone());
        self.run(ticket, &params).await
    }

    /// Refresh unless a request is already in flight; `None` when refused.
    pub async fn refresh_if_idle(&self, params: P) -> Option<bool> {
        let ticket = self.try_begin(params.clone())?;
        Some(self.run(ticket, &params).await)
    }

    /// Abandon `ticket` without an outcome. If it is still the latest
    /// request the state leaves `Loading`; otherwise this is a no-op.
    pub fn cancel(&self, ticket: Ticket) -> bool {
        let mut inner = self.inner.lock();
        if ticket.seq != inner.issued {
            return false;
        }
        debug!("Request #{} cancelled before completing", ticket.seq);
        inner.state.cancel_loading();
        true
    }

    async fn run(&self, ticket: Ticket, params: &P) -> bool {
        let mut pending = PendingFetch {
            controller: self,
            ticket: Some(ticket),
        };
        let outcome = self.fetcher.fetch(params).await;
        match pending.ticket.take() {
            Some(ticket) => self.complete(ticket, outcome),
            None => false,
        }
    }

    pub fn reveal_more(&self) -> bool {
        self.inner.lock().state.reveal_more()
    }

    pub fn status(&self) -> Status {
        self.inner.lock().state.status()
    }

    pub fn is_loading(&self) -> bool {
        self.status() == Status::Loading
    }

    pub fn current_params(&self) -> Option<P> {
        self.inner.lock().params.clone()
    }

    /// Read the state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ViewState<T>) -> R) -> R {
        f(&self.inner.lock().state)
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.inner.lock().state.clone()
    }
}

/// Ticket of a fetch that is awaiting its response. Dropping the future
/// before the response arrives cancels the ticket so the screen does not
/// stay loading.
struct PendingFetch<'a, P, T>
where
    P: Clone + Send + Sync + std::fmt::Debug,
    T: Clone + Send,
{
    controller: &'a ViewStateController<P, T>,
    ticket: Option<Ticket>,
}

impl<P, T> Drop for PendingFetch<'_, P, T>
where
    P: Clone + Send + Sync + std::fmt::Debug,
    T: Clone + Send,
{
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.controller.cancel(ticket);
        }
    }
}
