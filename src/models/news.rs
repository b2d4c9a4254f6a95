use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single news article as shown in the feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub summary: Option<String>,
}

/// Request parameters for fetching news
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsQuery {
    /// Category slug on the news service (default: "saham")
    pub category: String,
    /// Page token forwarded to the service as-is (optional)
    pub page: Option<String>,
}

impl NewsQuery {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            page: None,
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self::category("saham")
    }
}
