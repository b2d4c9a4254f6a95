use std::ops::Range;
use std::sync::Arc;
use tracing::info;

use crate::config::RevealConfig;
use crate::external::data_source::NewsSource;
use crate::models::{NewsItem, NewsQuery};
use crate::services::controller::{Fetcher, ViewStateController};
use crate::services::reveal::{SentinelTrigger, ViewportObserver};
use crate::services::search::{SearchInput, SubmitOutcome};
use crate::services::view_state::{Status, ViewPhase, ViewState};

pub const EMPTY_NEWS_MESSAGE: &str = "No news available.";

/// Number of articles on the dashboard preview.
pub const PREVIEW_SIZE: usize = 6;

/// Element key of the card rendered for `items[index]`. Position is part of
/// the key so that repeated links in one feed stay distinct.
pub fn card_key(index: usize, item: &NewsItem) -> String {
    format!("{index}:{}", item.link)
}

// Listed cards follow the featured one: `items[1..=visible]`, clamped.
fn listed_range(state: &ViewState<NewsItem>) -> Range<usize> {
    let end = (state.visible_count() + 1).min(state.items().len());
    end.min(1)..end
}

fn news_controller(
    source: Arc<dyn NewsSource>,
    reveal: RevealConfig,
) -> ViewStateController<NewsQuery, NewsItem> {
    let fetcher: Arc<dyn Fetcher<NewsQuery, NewsItem>> = Arc::new(source);
    ViewStateController::new(fetcher, reveal)
}

/// Full news page: featured article, revealed list and infinite scroll.
pub struct NewsScreen {
    controller: ViewStateController<NewsQuery, NewsItem>,
    category: SearchInput<NewsQuery>,
    trigger: SentinelTrigger,
}

impl NewsScreen {
    pub fn new(
        source: Arc<dyn NewsSource>,
        observer: Arc<dyn ViewportObserver>,
        reveal: RevealConfig,
        category: &str,
    ) -> Self {
        Self {
            controller: news_controller(source, reveal),
            category: SearchInput::new(category),
            trigger: SentinelTrigger::new(observer),
        }
    }

    pub fn controller(&self) -> &ViewStateController<NewsQuery, NewsItem> {
        &self.controller
    }

    pub fn set_category(&mut self, raw: &str) {
        self.category.set_value(raw);
    }

    /// Initial load on mount.
    pub async fn load(&mut self) -> bool {
        let query = self.category.params().unwrap_or_default();
        let applied = self.controller.refresh(query).await;
        self.after_refresh(applied);
        applied
    }

    /// Category change from the filter box.
    pub async fn submit_category(&mut self) -> SubmitOutcome {
        let outcome = self.category.submit(&self.controller).await;
        self.after_refresh(outcome == SubmitOutcome::Applied);
        outcome
    }

    /// Load-more button.
    pub fn load_more(&mut self) -> bool {
        let revealed = self.controller.reveal_more();
        self.rebind();
        revealed
    }

    /// Viewport callback: `element` scrolled into view. Only the current
    /// sentinel reveals more.
    pub fn on_intersect(&mut self, element: &str) -> bool {
        if !self.trigger.is_sentinel(element) {
            return false;
        }
        let revealed = self.load_more();
        if revealed {
            info!(
                "Revealed news up to {}",
                self.controller.with_state(|s| s.visible_count())
            );
        }
        revealed
    }

    /// First article, shown large above the list.
    pub fn featured(&self) -> Option<NewsItem> {
        self.controller.with_state(|s| s.items().first().cloned())
    }

    /// Revealed articles after the featured one.
    pub fn listed(&self) -> Vec<NewsItem> {
        self.controller
            .with_state(|s| s.items()[listed_range(s)].to_vec())
    }

    pub fn sentinel(&self) -> Option<&str> {
        self.trigger.bound_element()
    }

    /// Message for the current state, if the page should show one instead of
    /// (or above) the articles.
    pub fn message(&self) -> Option<String> {
        self.controller.with_state(|s| match s.phase() {
            ViewPhase::Empty => Some(EMPTY_NEWS_MESSAGE.to_string()),
            ViewPhase::Failed { message } => Some(message.to_string()),
            ViewPhase::Populated { notice, .. } => notice.map(str::to_string),
            ViewPhase::Idle | ViewPhase::Loading => None,
        })
    }

    // A successful refresh renders fresh cards, so the old observation goes
    // even when the last card carries the same key.
    fn after_refresh(&mut self, applied: bool) {
        if applied && self.controller.status() == Status::Success {
            self.trigger.detach();
        }
        self.rebind();
    }

    // The sentinel is the last listed article while more remain hidden.
    fn rebind(&mut self) {
        let sentinel = self.controller.with_state(|s| {
            let listed = listed_range(s);
            if s.has_more() && !listed.is_empty() {
                let last = listed.end - 1;
                Some(card_key(last, &s.items()[last]))
            } else {
                None
            }
        });
        self.trigger.bind(sentinel.as_deref());
    }
}

/// Landing page preview: the first few articles, no reveal.
pub struct NewsPreview {
    controller: ViewStateController<NewsQuery, NewsItem>,
    query: NewsQuery,
}

impl NewsPreview {
    pub fn new(source: Arc<dyn NewsSource>, category: &str) -> Self {
        Self {
            controller: news_controller(
                source,
                RevealConfig {
                    page_size: PREVIEW_SIZE,
                    increment: PREVIEW_SIZE,
                },
            ),
            query: NewsQuery::category(category),
        }
    }

    pub async fn load(&self) -> bool {
        self.controller.refresh(self.query.clone()).await
    }

    pub fn items(&self) -> Vec<NewsItem> {
        self.controller.with_state(|s| s.visible_items().to_vec())
    }

    pub fn controller(&self) -> &ViewStateController<NewsQuery, NewsItem> {
        &self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use crate::external::static_source::StaticSource;
    use crate::services::reveal::testing::RecordingObserver;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Returns queued outcomes in order.
    struct ScriptedNews {
        outcomes: Mutex<VecDeque<Result<Vec<NewsItem>, FetchError>>>,
    }

    impl ScriptedNews {
        fn new(outcomes: Vec<Result<Vec<NewsItem>, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
            })
        }
    }

    #[async_trait]
    impl NewsSource for ScriptedNews {
        async fn fetch_news(&self, _query: &NewsQuery) -> Result<Vec<NewsItem>, FetchError> {
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn articles(n: usize) -> Vec<NewsItem> {
        (0..n)
            .map(|i| NewsItem {
                title: format!("Article {i}"),
                link: format!("https://news.example.com/{i}"),
                published_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                thumbnail_url: None,
                summary: None,
            })
            .collect()
    }

    fn key(index: usize) -> String {
        format!("{index}:https://news.example.com/{index}")
    }

    fn screen(source: Arc<dyn NewsSource>) -> (Arc<RecordingObserver>, NewsScreen) {
        let observer = Arc::new(RecordingObserver::default());
        let screen = NewsScreen::new(source, observer.clone(), RevealConfig::default(), "saham");
        (observer, screen)
    }

    #[tokio::test]
    async fn test_scrolling_reveals_and_moves_sentinel() {
        let (observer, mut screen) = screen(ScriptedNews::new(vec![Ok(articles(20))]));
        assert!(screen.load().await);

        assert_eq!(screen.featured().unwrap().title, "Article 0");
        let listed = screen.listed();
        assert_eq!(listed.len(), 7);
        assert_eq!(listed[0].title, "Article 1");
        assert_eq!(screen.sentinel(), Some(key(7).as_str()));

        // A stale element that is no longer the sentinel does nothing.
        assert!(!screen.on_intersect(&key(2)));

        assert!(screen.on_intersect(&key(7)));
        assert_eq!(screen.listed().len(), 13);
        assert_eq!(screen.sentinel(), Some(key(13).as_str()));
        assert_eq!(observer.active(), vec![key(13)]);

        assert!(screen.on_intersect(&key(13)));
        assert!(screen.on_intersect(&key(19)));

        // Everything visible: the trigger detaches and further reveals are no-ops.
        assert_eq!(screen.sentinel(), None);
        assert!(observer.active().is_empty());
        assert!(!screen.load_more());
        assert_eq!(screen.listed().len(), 19);
    }

    #[tokio::test]
    async fn test_empty_feed_reports_no_news() {
        let (_, mut screen) = screen(ScriptedNews::new(vec![Ok(Vec::new())]));
        screen.load().await;

        assert_eq!(screen.controller().status(), Status::Success);
        assert_eq!(screen.message().as_deref(), Some(EMPTY_NEWS_MESSAGE));
        assert!(screen.featured().is_none());
        assert_eq!(screen.sentinel(), None);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_articles_and_sentinel() {
        let (_, mut screen) = screen(ScriptedNews::new(vec![
            Ok(articles(10)),
            Err(FetchError::TransportUnreachable("refused".into())),
        ]));
        screen.load().await;
        screen.load().await;

        assert_eq!(screen.controller().status(), Status::Error);
        assert_eq!(screen.listed().len(), 7);
        assert_eq!(screen.message().as_deref(), Some("Could not reach service."));
        assert_eq!(screen.sentinel(), Some(key(7).as_str()));
    }

    #[tokio::test]
    async fn test_successful_reload_rebinds_same_sentinel() {
        let (observer, mut screen) = screen(ScriptedNews::new(vec![
            Ok(articles(10)),
            Ok(articles(10)),
        ]));
        screen.load().await;
        screen.load().await;

        let bound = format!("observe:{}", key(7));
        let released = format!("unobserve:{}", key(7));
        assert_eq!(observer.events(), vec![bound.clone(), released, bound]);
        assert_eq!(observer.active(), vec![key(7)]);
    }

    #[tokio::test]
    async fn test_duplicate_links_only_last_card_reveals() {
        let repeated: Vec<NewsItem> = articles(10)
            .into_iter()
            .map(|mut item| {
                item.link = "https://news.example.com/same".to_string();
                item
            })
            .collect();
        let (_, mut screen) = screen(ScriptedNews::new(vec![Ok(repeated)]));
        screen.load().await;

        assert_eq!(screen.sentinel(), Some("7:https://news.example.com/same"));
        assert!(!screen.on_intersect("3:https://news.example.com/same"));
        assert!(screen.on_intersect("7:https://news.example.com/same"));
        assert_eq!(screen.listed().len(), 9);
    }

    #[tokio::test]
    async fn test_dropping_screen_releases_observer() {
        let (observer, mut screen) = screen(ScriptedNews::new(vec![Ok(articles(20))]));
        screen.load().await;
        assert_eq!(observer.active().len(), 1);

        drop(screen);
        assert!(observer.active().is_empty());
    }

    #[tokio::test]
    async fn test_category_change_refetches() {
        let source = Arc::new(StaticSource::sample());
        let (_, mut screen) = screen(source);
        screen.load().await;
        assert_eq!(screen.listed().len(), 7);

        screen.set_category("bola");
        assert_eq!(screen.submit_category().await, SubmitOutcome::Applied);
        assert_eq!(screen.message().as_deref(), Some(EMPTY_NEWS_MESSAGE));
        assert_eq!(
            screen.controller().current_params(),
            Some(NewsQuery::category("bola"))
        );
    }

    #[tokio::test]
    async fn test_preview_shows_first_six() {
        let preview = NewsPreview::new(Arc::new(StaticSource::sample()), "saham");
        assert!(preview.load().await);
        let items = preview.items();
        assert_eq!(items.len(), PREVIEW_SIZE);
        assert!(items[0].title.starts_with("IHSG"));
    }
}
