//! Wire formats of the news and stock services and their conversion into
//! domain types. A body either converts completely or fails with
//! [`FetchError::MalformedBody`]; nothing is returned half-parsed.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::errors::FetchError;
use crate::models::{
    HistoricalPoint, NewsItem, PredictionPoint, StockSnapshot, Symbol, SymbolListing,
};

/// Offset of naive timestamps produced by the news scraper (WIB).
const SOURCE_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Thumbnail value the scraper emits when the article only has a placeholder.
const MISSING_THUMBNAIL: &str = "No Image";

#[derive(Debug, Deserialize)]
struct SummaryEntry {
    data: Option<SummaryArticle>,
}

#[derive(Debug, Deserialize)]
struct SummaryArticle {
    title: String,
    link: String,
    time: String,
    image_thumbnail: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

// When proxied the real document arrives as a string:
// { "contents": "{\"data\": [...]}", "status": {...} }
#[derive(Debug, Deserialize)]
struct ProxyWrapper {
    contents: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    data: Option<Vec<FeedArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedArticle {
    title: String,
    link: String,
    iso_date: String,
    image: Option<FeedImage>,
    content_snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedImage {
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockEnvelope {
    status: Option<String>,
    data: Option<StockPayload>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockPayload {
    symbol: Option<String>,
    name: String,
    current_price: f64,
    change: f64,
    #[serde(default)]
    historical_data: Vec<WireHistoricalPoint>,
    #[serde(default)]
    prediction_data: Vec<WirePredictionPoint>,
    fundamentals: Option<BTreeMap<String, f64>>,
    model_accuracy: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct WireHistoricalPoint {
    date: String,
    price: f64,
    #[serde(default)]
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct WirePredictionPoint {
    date: String,
    prediction: f64,
}

/// Decode the summary endpoint: `[{article, data: {...}}]`.
pub fn decode_summary(body: &[u8]) -> Result<Vec<NewsItem>, FetchError> {
    let entries: Vec<SummaryEntry> = serde_json::from_slice(body)?;

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| -> Result<NewsItem, FetchError> {
            let article = entry
                .data
                .ok_or_else(|| FetchError::MalformedBody(format!("entry {idx} has no data")))?;

            Ok(NewsItem {
                published_at: parse_published_at(&article.time)?,
                title: article.title,
                link: article.link,
                thumbnail_url: clean_thumbnail(article.image_thumbnail),
                summary: article.summary.filter(|s| !s.trim().is_empty()),
            })
        })
        .collect()
}

/// Decode a feed that went through the CORS proxy.
pub fn decode_proxied_feed(body: &[u8]) -> Result<Vec<NewsItem>, FetchError> {
    let wrapper: ProxyWrapper = serde_json::from_slice(body)?;
    let contents = wrapper
        .contents
        .ok_or_else(|| FetchError::MalformedBody("missing contents".into()))?;

    let document: FeedDocument = serde_json::from_str(&contents)?;
    let articles = document
        .data
        .ok_or_else(|| FetchError::MalformedBody("missing data in proxied contents".into()))?;

    articles
        .into_iter()
        .map(|article| -> Result<NewsItem, FetchError> {
            Ok(NewsItem {
                published_at: parse_published_at(&article.iso_date)?,
                title: article.title,
                link: article.link,
                thumbnail_url: clean_thumbnail(article.image.and_then(|i| i.small)),
                summary: article.content_snippet.filter(|s| !s.trim().is_empty()),
            })
        })
        .collect()
}

/// Decode the `{status, data}` stock envelope for `symbol`.
pub fn decode_stock(symbol: &Symbol, body: &[u8]) -> Result<StockSnapshot, FetchError> {
    let envelope: StockEnvelope = serde_json::from_slice(body)?;

    let status = envelope
        .status
        .ok_or_else(|| FetchError::MalformedBody("missing status".into()))?;

    if status != "success" {
        let message = envelope
            .message
            .or(envelope.error)
            .unwrap_or_else(|| format!("service returned status '{status}'"));
        return Err(FetchError::symbol_not_found(symbol.as_str(), message));
    }

    let data = envelope
        .data
        .ok_or_else(|| FetchError::MalformedBody("missing data".into()))?;

    Ok(StockSnapshot {
        symbol: data
            .symbol
            .as_deref()
            .map(Symbol::new)
            .unwrap_or_else(|| symbol.clone()),
        name: data.name,
        current_price: data.current_price,
        change_percent: data.change,
        historical_points: data
            .historical_data
            .into_iter()
            .map(|p| HistoricalPoint {
                date: p.date,
                price: p.price,
                volume: p.volume,
            })
            .collect(),
        prediction_points: data
            .prediction_data
            .into_iter()
            .map(|p| PredictionPoint {
                date: p.date,
                predicted_price: p.prediction,
            })
            .collect(),
        fundamentals: data.fundamentals,
        model_accuracy: data.model_accuracy,
    })
}

/// Decode the `/stock` listing: `{"BBCA": "Bank Central Asia", ...}`.
pub fn decode_symbol_listing(body: &[u8]) -> Result<Vec<SymbolListing>, FetchError> {
    let listing: BTreeMap<String, String> = serde_json::from_slice(body)?;

    Ok(listing
        .into_iter()
        .map(|(symbol, name)| SymbolListing {
            symbol: Symbol::new(&symbol),
            name,
        })
        .collect())
}

/// Accepts RFC 3339 or the scraper's `YYYY-MM-DD HH:MM` (local WIB time).
fn parse_published_at(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M")
        .map_err(|e| FetchError::MalformedBody(format!("bad timestamp '{raw}': {e}")))?;

    FixedOffset::east_opt(SOURCE_UTC_OFFSET_SECS)
        .and_then(|offset| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| FetchError::MalformedBody(format!("bad timestamp '{raw}'")))
}

fn clean_thumbnail(raw: Option<String>) -> Option<String> {
    raw.filter(|url| {
        let url = url.trim();
        !url.is_empty() && url != MISSING_THUMBNAIL
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_summary_converts_wib_timestamps() {
        let body = bytes(json!([
            {"article": 1, "data": {
                "title": "IHSG menguat",
                "link": "https://www.liputan6.com/saham/read/1",
                "time": "2024-05-02 14:30",
                "image_thumbnail": "https://img.example.com/1.jpg",
                "slug": "/saham/read/1"
            }},
            {"article": 2, "data": {
                "title": "BBCA dividen",
                "link": "https://www.liputan6.com/saham/read/2",
                "time": "2024-05-02T03:00:00Z",
                "image_thumbnail": "No Image"
            }}
        ]));

        let items = decode_summary(&body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].published_at.hour(), 7);
        assert_eq!(items[0].thumbnail_url.as_deref(), Some("https://img.example.com/1.jpg"));
        assert_eq!(items[1].thumbnail_url, None);
        assert_eq!(items[1].summary, None);
    }

    #[test]
    fn test_summary_rejects_whole_body_on_bad_item() {
        let body = bytes(json!([
            {"article": 1, "data": {"title": "ok", "link": "l", "time": "2024-05-02 14:30", "image_thumbnail": null}},
            {"article": 2, "data": {"title": "bad", "link": "l", "time": "kemarin", "image_thumbnail": null}}
        ]));
        assert!(matches!(decode_summary(&body), Err(FetchError::MalformedBody(_))));
    }

    #[test]
    fn test_empty_summary_is_not_an_error() {
        assert_eq!(decode_summary(b"[]").unwrap(), Vec::new());
    }

    #[test]
    fn test_proxied_feed_needs_contents_and_data() {
        let inner = json!({"data": [{
            "title": "Market wrap",
            "link": "https://www.cnbcindonesia.com/market/1",
            "isoDate": "2024-05-02T09:15:00.000Z",
            "image": {"small": "https://img.example.com/s.jpg"},
            "contentSnippet": "Saham perbankan naik"
        }]});
        let body = bytes(json!({"contents": inner.to_string()}));

        let items = decode_proxied_feed(&body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].summary.as_deref(), Some("Saham perbankan naik"));

        let missing_contents = bytes(json!({"status": {"http_code": 200}}));
        assert!(matches!(
            decode_proxied_feed(&missing_contents),
            Err(FetchError::MalformedBody(_))
        ));

        let missing_data = bytes(json!({"contents": "{\"items\": []}"}));
        assert!(matches!(
            decode_proxied_feed(&missing_data),
            Err(FetchError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_stock_envelope_success() {
        let body = bytes(json!({
            "status": "success",
            "data": {
                "name": "Bank Central Asia Tbk",
                "currentPrice": 9450.0,
                "change": 2.5,
                "historicalData": [{"date": "2024-04", "price": 9450.0, "volume": 1200000.0}],
                "predictionData": [{"date": "2024-05", "prediction": 10200.0}],
                "modelAccuracy": {"mape": 1.8}
            }
        }));

        let snapshot = decode_stock(&Symbol::new("bbca"), &body).unwrap();
        assert_eq!(snapshot.symbol.as_str(), "BBCA");
        assert_eq!(snapshot.change_percent, 2.5);
        assert_eq!(snapshot.next_prediction().unwrap().predicted_price, 10200.0);
        assert_eq!(snapshot.model_accuracy.unwrap()["mape"], 1.8);
        assert!(snapshot.fundamentals.is_none());
    }

    #[test]
    fn test_stock_domain_error_is_symbol_specific() {
        let body = bytes(json!({"status": "error", "message": "Symbol not found"}));
        let err = decode_stock(&Symbol::new("ZZZZ"), &body).unwrap_err();
        assert_eq!(err.user_message(), "No data for ZZZZ.");
    }

    #[test]
    fn test_stock_success_without_data_is_malformed() {
        let body = bytes(json!({"status": "success"}));
        assert!(matches!(
            decode_stock(&Symbol::new("BBCA"), &body),
            Err(FetchError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_symbol_listing() {
        let body = bytes(json!({"TLKM": "Telkom Indonesia", "BBCA": "Bank Central Asia"}));
        let listing = decode_symbol_listing(&body).unwrap();
        assert_eq!(listing[0].symbol.as_str(), "BBCA");
        assert_eq!(listing[1].name, "Telkom Indonesia");
    }
}
