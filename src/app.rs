use std::sync::Arc;
use tracing::info;

use crate::config::{DashboardConfig, DataSourceConfig, NewsEnvelope};
use crate::external::data_source::{NewsSource, StockSource};
use crate::external::remote::{RemoteClient, RemoteNewsSource, RemoteStockSource};
use crate::external::static_source::StaticSource;
use crate::state::AppState;

/// Select the data sources named by the configuration.
pub fn create_app(config: DashboardConfig) -> AppState {
    let (news_source, stock_source): (Arc<dyn NewsSource>, Arc<dyn StockSource>) =
        match &config.data_source {
            DataSourceConfig::Static => {
                info!("Using data source: built-in sample data");
                let source = Arc::new(StaticSource::sample());
                let news: Arc<dyn NewsSource> = source.clone();
                let stock: Arc<dyn StockSource> = source;
                (news, stock)
            }
            DataSourceConfig::Remote { news, stock } => {
                let envelope = match news.envelope {
                    NewsEnvelope::Summary => "summary",
                    NewsEnvelope::ProxiedFeed { .. } => "proxied feed",
                };
                info!(
                    "Using data source: remote (news {} via {}, stock {})",
                    news.base_url, envelope, stock.base_url
                );
                let client = RemoteClient::new();
                let news: Arc<dyn NewsSource> =
                    Arc::new(RemoteNewsSource::new(client.clone(), news.clone()));
                let stock: Arc<dyn StockSource> =
                    Arc::new(RemoteStockSource::new(client, stock.clone()));
                (news, stock)
            }
        };

    AppState {
        config,
        news_source,
        stock_source,
    }
}
