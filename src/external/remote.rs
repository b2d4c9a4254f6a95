use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::config::{NewsEndpoint, NewsEnvelope, StockEndpoint};
use crate::errors::FetchError;
use crate::external::data_source::{NewsSource, StockSource};
use crate::external::envelope;
use crate::models::{NewsItem, NewsQuery, StockSnapshot, Symbol, SymbolListing};

/// Thin wrapper over one `reqwest::Client` that performs a single GET and
/// classifies its outcome. No retries and no caching: every call goes out.
#[derive(Clone, Default)]
pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// GET `url` and hand the body of a successful response to `decode`.
    ///
    /// `symbol` only decorates a non-success status so the screen can say
    /// which symbol had no data.
    pub async fn get<T, D>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
        symbol: Option<&Symbol>,
        decode: D,
    ) -> Result<T, FetchError>
    where
        D: FnOnce(&[u8]) -> Result<T, FetchError>,
    {
        let mut request = self.client.get(url.clone());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let resp = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", redact(&url), e);
            FetchError::TransportUnreachable(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("{} responded with status {}", redact(&url), status);
            return Err(FetchError::http_status(status, symbol.map(Symbol::as_str)));
        }

        let body = resp.bytes().await.map_err(|e| {
            warn!("Failed to read body from {}: {}", redact(&url), e);
            FetchError::MalformedBody(e.to_string())
        })?;

        decode(&body[..]).map_err(|e| {
            warn!("Unexpected response from {}: {}", redact(&url), e);
            e
        })
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::TransportUnreachable(format!("cannot build request url from {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// Query strings may carry API keys for some feeds; keep them out of logs.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

pub struct RemoteNewsSource {
    client: RemoteClient,
    endpoint: NewsEndpoint,
}

impl RemoteNewsSource {
    pub fn new(client: RemoteClient, endpoint: NewsEndpoint) -> Self {
        Self { client, endpoint }
    }

    fn request_url(&self, query: &NewsQuery) -> Result<Url, FetchError> {
        let mut target = match self.endpoint.envelope {
            NewsEnvelope::Summary => endpoint_url(&self.endpoint.base_url, &["summary"])?,
            NewsEnvelope::ProxiedFeed { .. } => self.endpoint.base_url.clone(),
        };

        {
            let mut pairs = target.query_pairs_mut();
            pairs.append_pair("category", &query.category);
            if let Some(page) = &query.page {
                pairs.append_pair("page", page);
            }
        }

        match &self.endpoint.envelope {
            NewsEnvelope::Summary => Ok(target),
            NewsEnvelope::ProxiedFeed { proxy_url } => {
                let mut proxied = proxy_url.clone();
                proxied.query_pairs_mut().append_pair("url", target.as_str());
                Ok(proxied)
            }
        }
    }
}

#[async_trait]
impl NewsSource for RemoteNewsSource {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, FetchError> {
        let url = self.request_url(query)?;
        let headers: Vec<(&str, &str)> = self
            .endpoint
            .api_key
            .iter()
            .map(|key| (key.header.as_str(), key.value.as_str()))
            .collect();

        let decode = match self.endpoint.envelope {
            NewsEnvelope::Summary => envelope::decode_summary,
            NewsEnvelope::ProxiedFeed { .. } => envelope::decode_proxied_feed,
        };

        let items = self.client.get(url, &headers, None, decode).await?;
        info!("Fetched {} news articles for category '{}'", items.len(), query.category);
        Ok(items)
    }
}

pub struct RemoteStockSource {
    client: RemoteClient,
    endpoint: StockEndpoint,
}

impl RemoteStockSource {
    pub fn new(client: RemoteClient, endpoint: StockEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl StockSource for RemoteStockSource {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot, FetchError> {
        let url = endpoint_url(&self.endpoint.base_url, &["stock", symbol.as_str()])?;

        let snapshot = self
            .client
            .get(url, &[], Some(symbol), |body| envelope::decode_stock(symbol, body))
            .await?;

        info!(
            "Fetched {} snapshot ({} historical, {} predicted points)",
            snapshot.symbol,
            snapshot.historical_points.len(),
            snapshot.prediction_points.len()
        );
        Ok(snapshot)
    }

    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, FetchError> {
        let url = endpoint_url(&self.endpoint.base_url, &["stock"])?;
        self.client
            .get(url, &[], None, envelope::decode_symbol_listing)
            .await
    }
}
