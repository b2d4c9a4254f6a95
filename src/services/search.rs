use std::marker::PhantomData;

use crate::models::{NewsQuery, Symbol};
use crate::services::controller::ViewStateController;

/// Parameters a search box can produce.
pub trait SearchParams: Clone + Send + Sync + std::fmt::Debug {
    /// Canonical form of the text as typed, applied on every keystroke.
    fn normalize_input(raw: &str) -> String;

    fn from_input(value: &str) -> Self;
}

impl SearchParams for Symbol {
    fn normalize_input(raw: &str) -> String {
        raw.to_uppercase()
    }

    fn from_input(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl SearchParams for NewsQuery {
    fn normalize_input(raw: &str) -> String {
        raw.to_string()
    }

    fn from_input(value: &str) -> Self {
        NewsQuery::category(value.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request went out and its result was applied.
    Applied,
    /// The request went out but a newer one superseded it.
    Superseded,
    /// A request for this screen was still loading.
    Busy,
    /// Nothing to search for.
    Empty,
}

/// Text box that submits into a [`ViewStateController`].
#[derive(Debug, Clone)]
pub struct SearchInput<P> {
    value: String,
    _params: PhantomData<fn() -> P>,
}

impl<P: SearchParams> SearchInput<P> {
    pub fn new(initial: &str) -> Self {
        Self {
            value: P::normalize_input(initial),
            _params: PhantomData,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, raw: &str) {
        self.value = P::normalize_input(raw);
    }

    pub fn params(&self) -> Option<P> {
        (!self.value.trim().is_empty()).then(|| P::from_input(&self.value))
    }

    /// Submit the current value. Refused while the controller is loading.
    pub async fn submit<T>(&self, controller: &ViewStateController<P, T>) -> SubmitOutcome
    where
        T: Clone + Send,
    {
        let Some(params) = self.params() else {
            return SubmitOutcome::Empty;
        };

        match controller.refresh_if_idle(params).await {
            None => SubmitOutcome::Busy,
            Some(true) => SubmitOutcome::Applied,
            Some(false) => SubmitOutcome::Superseded,
        }
    }

    /// Enter submits; every other key is ignored.
    pub async fn key_press<T>(
        &self,
        key: &str,
        controller: &ViewStateController<P, T>,
    ) -> Option<SubmitOutcome>
    where
        T: Clone + Send,
    {
        if key != "Enter" {
            return None;
        }
        Some(self.submit(controller).await)
    }
}
