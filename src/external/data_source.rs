use async_trait::async_trait;

use crate::errors::FetchError;
use crate::models::{NewsItem, NewsQuery, StockSnapshot, Symbol, SymbolListing};

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, FetchError>;
}

#[async_trait]
pub trait StockSource: Send + Sync {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot, FetchError>;

    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, FetchError>;
}
