use std::sync::Arc;

use crate::config::RevealConfig;
use crate::external::data_source::StockSource;
use crate::models::{ChatMessage, StockSnapshot, Symbol};
use crate::services::chat_service::{ChatSession, SnapshotResponder};
use crate::services::controller::{Fetcher, ViewStateController};
use crate::services::search::{SearchInput, SubmitOutcome};
use crate::services::view_state::Status;

/// Prediction page: symbol search, snapshot view and the advisor chat.
pub struct PredictionScreen {
    controller: ViewStateController<Symbol, StockSnapshot>,
    search: SearchInput<Symbol>,
    chat: ChatSession,
}

impl PredictionScreen {
    pub fn new(source: Arc<dyn StockSource>, default_symbol: &Symbol) -> Self {
        let fetcher: Arc<dyn Fetcher<Symbol, StockSnapshot>> = Arc::new(source.clone());
        let single = RevealConfig {
            page_size: 1,
            increment: 1,
        };

        Self {
            controller: ViewStateController::new(fetcher, single),
            search: SearchInput::new(default_symbol.as_str()),
            chat: ChatSession::new(Arc::new(SnapshotResponder::new(source))),
        }
    }

    pub fn controller(&self) -> &ViewStateController<Symbol, StockSnapshot> {
        &self.controller
    }

    /// Keystroke in the search box.
    pub fn type_symbol(&mut self, raw: &str) {
        self.search.set_value(raw);
    }

    pub fn search_value(&self) -> &str {
        self.search.value()
    }

    pub async fn submit(&self) -> SubmitOutcome {
        self.search.submit(&self.controller).await
    }

    pub async fn key_press(&self, key: &str) -> Option<SubmitOutcome> {
        self.search.key_press(key, &self.controller).await
    }

    /// Snapshot currently on screen; stays after a failed search.
    pub fn snapshot(&self) -> Option<StockSnapshot> {
        self.controller.with_state(|s| s.items().first().cloned())
    }

    pub fn status(&self) -> Status {
        self.controller.status()
    }

    pub fn error_message(&self) -> Option<String> {
        self.controller
            .with_state(|s| s.error_message().map(str::to_string))
    }

    pub async fn send_chat(&mut self, text: &str) -> Option<ChatMessage> {
        self.chat.send(text).await.cloned()
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        self.chat.messages()
    }
}
