use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::external::data_source::StockSource;
use crate::models::{ChatMessage, ChatRole, StockSnapshot, Symbol};

pub const WELCOME_MESSAGE: &str = "Welcome to the prediction dashboard! How can I help you today?";

/// Produces the assistant's answer to one user message.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, prompt: &str) -> String;
}

/// Answers from stock snapshots: a message that mentions a known symbol gets
/// that stock's price, change and next prediction.
pub struct SnapshotResponder {
    stocks: Arc<dyn StockSource>,
}

impl SnapshotResponder {
    pub fn new(stocks: Arc<dyn StockSource>) -> Self {
        Self { stocks }
    }
}

#[async_trait]
impl Responder for SnapshotResponder {
    async fn reply(&self, prompt: &str) -> String {
        let known = match self.stocks.list_symbols().await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Symbol listing unavailable for chat: {}", e);
                return "Sorry, I can't reach the stock service right now.".to_string();
            }
        };

        let mentioned = prompt
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(Symbol::new)
            .find(|word| known.iter().any(|l| &l.symbol == word));

        let Some(symbol) = mentioned else {
            let symbols: Vec<&str> = known.iter().map(|l| l.symbol.as_str()).collect();
            return if symbols.is_empty() {
                "Ask me about an Indonesian stock symbol.".to_string()
            } else {
                format!("Ask me about a stock symbol such as {}.", symbols.join(", "))
            };
        };

        match self.stocks.fetch_snapshot(&symbol).await {
            Ok(snapshot) => describe(&snapshot),
            Err(e) => e.user_message(),
        }
    }
}

fn describe(snapshot: &StockSnapshot) -> String {
    let direction = if snapshot.change_percent >= 0.0 { "up" } else { "down" };
    let mut text = format!(
        "{} ({}) is trading at {:.2}, {} {:.2}%.",
        snapshot.symbol,
        snapshot.name,
        snapshot.current_price,
        direction,
        snapshot.change_percent.abs()
    );

    if let Some(next) = snapshot.next_prediction() {
        text.push_str(&format!(
            " The model predicts {:.2} for {}.",
            next.predicted_price, next.date
        ));
    }

    text
}

/// Append-only conversation for one page visit.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    responder: Arc<dyn Responder>,
}

impl ChatSession {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::Assistant, WELCOME_MESSAGE)],
            responder,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's message and the assistant's reply. Blank input is
    /// ignored and returns `None`.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::new(ChatRole::User, text));
        let reply = self.responder.reply(text).await;
        info!("Chat reply ({} chars)", reply.len());
        self.messages.push(ChatMessage::new(ChatRole::Assistant, reply));
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::static_source::StaticSource;

    fn session() -> ChatSession {
        let stocks: Arc<dyn StockSource> = Arc::new(StaticSource::sample());
        ChatSession::new(Arc::new(SnapshotResponder::new(stocks)))
    }

    #[tokio::test]
    async fn test_session_starts_with_welcome() {
        let chat = session();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, ChatRole::Assistant);
        assert_eq!(chat.messages()[0].content, WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn test_reply_mentions_known_symbol() {
        let mut chat = session();
        let reply = chat.send("how is bbca doing?").await.unwrap().content.clone();

        assert!(reply.contains("BBCA (Bank Central Asia Tbk)"));
        assert!(reply.contains("up 2.50%"));
        assert!(reply.contains("10200.00 for 2024-05"));

        let roles: Vec<ChatRole> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]);
    }

    #[tokio::test]
    async fn test_reply_without_symbol_suggests_some() {
        let mut chat = session();
        let reply = chat.send("what should I buy?").await.unwrap().content.clone();
        assert_eq!(reply, "Ask me about a stock symbol such as BBCA, BBRI, TLKM.");
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let mut chat = session();
        assert!(chat.send("   ").await.is_none());
        assert_eq!(chat.messages().len(), 1);
    }
}
