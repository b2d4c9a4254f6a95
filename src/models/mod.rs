mod chat;
mod news;
mod stock;

pub use chat::{ChatMessage, ChatRole};
pub use news::{NewsItem, NewsQuery};
pub use stock::{
    normalize_symbol, HistoricalPoint, PredictionPoint, StockSnapshot, Symbol, SymbolListing,
};
