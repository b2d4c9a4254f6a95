use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::external::data_source::{NewsSource, StockSource};
use crate::services::news_service::{NewsPreview, NewsScreen};
use crate::services::reveal::ViewportObserver;
use crate::services::stock_service::PredictionScreen;

/// Shared, read-only wiring. Every screen built from it owns its own
/// controller, so nothing mutable is shared between screens.
#[derive(Clone)]
pub struct AppState {
    pub config: DashboardConfig,
    pub news_source: Arc<dyn NewsSource>,
    pub stock_source: Arc<dyn StockSource>,
}

impl AppState {
    pub fn news_screen(&self, observer: Arc<dyn ViewportObserver>) -> NewsScreen {
        NewsScreen::new(
            self.news_source.clone(),
            observer,
            self.config.reveal,
            &self.config.news_category,
        )
    }

    pub fn news_preview(&self) -> NewsPreview {
        NewsPreview::new(self.news_source.clone(), &self.config.news_category)
    }

    pub fn prediction_screen(&self) -> PredictionScreen {
        PredictionScreen::new(self.stock_source.clone(), &self.config.default_symbol)
    }
}
