use serde::Serialize;

use crate::config::RevealConfig;
use crate::errors::FetchError;
use crate::services::reveal::IncrementalReveal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Loading,
    Success,
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Loading => write!(f, "loading"),
            Status::Success => write!(f, "success"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// What a renderer should draw for the current state.
#[derive(Debug, PartialEq)]
pub enum ViewPhase<'a, T> {
    /// Nothing requested yet.
    Idle,
    /// First load in flight, nothing to show.
    Loading,
    /// Failed with nothing previously loaded.
    Failed { message: &'a str },
    /// Last fetch succeeded with an empty collection.
    Empty,
    /// Data to show. `notice` carries the inline error of a failed refresh,
    /// `refreshing` is set while a newer request is in flight.
    Populated {
        visible: &'a [T],
        notice: Option<&'a str>,
        refreshing: bool,
    },
}

/// Loading/error/data triple owned by one screen.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    items: Vec<T>,
    status: Status,
    // Status to fall back to when an in-flight request is abandoned.
    settled: Status,
    error_message: Option<String>,
    reveal: IncrementalReveal,
}

impl<T> ViewState<T> {
    pub fn new(reveal: RevealConfig) -> Self {
        Self {
            items: Vec::new(),
            status: Status::Idle,
            settled: Status::Idle,
            error_message: None,
            reveal: IncrementalReveal::new(reveal),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn visible_count(&self) -> usize {
        self.reveal.visible_count()
    }

    pub fn visible_items(&self) -> &[T] {
        &self.items[..self.reveal.visible_count()]
    }

    pub fn has_more(&self) -> bool {
        self.reveal.has_more(self.items.len())
    }

    pub fn reveal_more(&mut self) -> bool {
        self.reveal.reveal_more(self.items.len())
    }

    pub(crate) fn begin_loading(&mut self) {
        self.status = Status::Loading;
    }

    pub(crate) fn apply_success(&mut self, items: Vec<T>) {
        self.items = items;
        self.status = Status::Success;
        self.settled = Status::Success;
        self.error_message = None;
        self.reveal.reset(self.items.len());
    }

    /// Items from the last successful fetch stay untouched.
    pub(crate) fn apply_failure(&mut self, error: &FetchError) {
        self.status = Status::Error;
        self.settled = Status::Error;
        self.error_message = Some(error.user_message());
    }

    /// Leave `Loading` without an outcome, returning to whatever the screen
    /// showed before the request went out.
    pub(crate) fn cancel_loading(&mut self) {
        if self.status == Status::Loading {
            self.status = self.settled;
        }
    }

    pub fn phase(&self) -> ViewPhase<'_, T> {
        if self.items.is_empty() {
            return match self.status {
                Status::Idle => ViewPhase::Idle,
                Status::Loading => ViewPhase::Loading,
                Status::Error => ViewPhase::Failed {
                    message: self.error_message.as_deref().unwrap_or_default(),
                },
                Status::Success => ViewPhase::Empty,
            };
        }

        ViewPhase::Populated {
            visible: self.visible_items(),
            notice: match self.status {
                Status::Error => self.error_message.as_deref(),
                _ => None,
            },
            refreshing: self.status == Status::Loading,
        }
    }
}
