use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;

use crate::errors::FetchError;
use crate::external::data_source::{NewsSource, StockSource};
use crate::models::{
    HistoricalPoint, NewsItem, NewsQuery, PredictionPoint, StockSnapshot, Symbol, SymbolListing,
};

/// In-memory data source backed by fixed sample tables.
///
/// Used for demos and tests; answers the same way the remote services do,
/// including the "no data for symbol" failure.
#[derive(Debug, Clone)]
pub struct StaticSource {
    stocks: BTreeMap<Symbol, StockSnapshot>,
    news: BTreeMap<String, Vec<NewsItem>>,
}

impl StaticSource {
    pub fn new(stocks: Vec<StockSnapshot>, news: BTreeMap<String, Vec<NewsItem>>) -> Self {
        Self {
            stocks: stocks.into_iter().map(|s| (s.symbol.clone(), s)).collect(),
            news,
        }
    }

    pub fn sample() -> Self {
        let mut news = BTreeMap::new();
        news.insert("saham".to_string(), sample_news());
        Self::new(sample_stocks(), news)
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::sample()
    }
}

#[async_trait]
impl NewsSource for StaticSource {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, FetchError> {
        Ok(self
            .news
            .get(&query.category.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl StockSource for StaticSource {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot, FetchError> {
        self.stocks
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::symbol_not_found(symbol.as_str(), "symbol not in sample data"))
    }

    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, FetchError> {
        Ok(self
            .stocks
            .values()
            .map(|s| SymbolListing {
                symbol: s.symbol.clone(),
                name: s.name.clone(),
            })
            .collect())
    }
}

fn snapshot(
    symbol: &str,
    name: &str,
    current_price: f64,
    change_percent: f64,
    history: &[(&str, f64, f64)],
    predictions: &[(&str, f64)],
) -> StockSnapshot {
    StockSnapshot {
        symbol: Symbol::new(symbol),
        name: name.to_string(),
        current_price,
        change_percent,
        historical_points: history
            .iter()
            .map(|(date, price, volume)| HistoricalPoint {
                date: date.to_string(),
                price: *price,
                volume: *volume,
            })
            .collect(),
        prediction_points: predictions
            .iter()
            .map(|(date, predicted_price)| PredictionPoint {
                date: date.to_string(),
                predicted_price: *predicted_price,
            })
            .collect(),
        fundamentals: None,
        model_accuracy: None,
    }
}

fn sample_stocks() -> Vec<StockSnapshot> {
    let mut bbca = snapshot(
        "BBCA",
        "Bank Central Asia Tbk",
        9450.0,
        2.5,
        &[
            ("2024-01", 8700.0, 84_000_000.0),
            ("2024-02", 8900.0, 79_500_000.0),
            ("2024-03", 9200.0, 91_200_000.0),
            ("2024-04", 9450.0, 88_700_000.0),
        ],
        &[("2024-05", 10200.0), ("2024-06", 10500.0)],
    );
    bbca.fundamentals = Some(BTreeMap::from([
        ("pe_ratio".to_string(), 24.1),
        ("pb_ratio".to_string(), 4.8),
        ("dividend_yield".to_string(), 2.3),
    ]));
    bbca.model_accuracy = Some(BTreeMap::from([
        ("mape".to_string(), 1.8),
        ("r2".to_string(), 0.94),
    ]));

    let bbri = snapshot(
        "BBRI",
        "Bank Rakyat Indonesia Tbk",
        5675.0,
        0.9,
        &[
            ("2024-01", 5400.0, 150_300_000.0),
            ("2024-02", 5600.0, 142_800_000.0),
            ("2024-03", 5725.0, 160_100_000.0),
            ("2024-04", 5675.0, 138_400_000.0),
        ],
        &[("2024-05", 5800.0), ("2024-06", 5950.0)],
    );

    let tlkm = snapshot(
        "TLKM",
        "Telkom Indonesia Tbk",
        3840.0,
        -1.2,
        &[
            ("2024-01", 3600.0, 102_000_000.0),
            ("2024-02", 3750.0, 97_600_000.0),
            ("2024-03", 3800.0, 110_900_000.0),
            ("2024-04", 3840.0, 99_300_000.0),
        ],
        &[("2024-05", 4200.0), ("2024-06", 4400.0)],
    );

    vec![bbca, bbri, tlkm]
}

fn sample_news() -> Vec<NewsItem> {
    let headlines = [
        ("IHSG ditutup menguat ditopang saham perbankan", "ihsg-menguat-perbankan"),
        ("BBCA umumkan jadwal pembagian dividen final", "bbca-dividen-final"),
        ("Telkom perluas jaringan pusat data di Jawa Barat", "tlkm-pusat-data"),
        ("Asing catat net buy Rp1 triliun sepekan", "asing-net-buy"),
        ("BBRI salurkan kredit UMKM tumbuh dua digit", "bbri-kredit-umkm"),
        ("Rupiah stabil jelang rilis data inflasi", "rupiah-stabil-inflasi"),
        ("Saham teknologi rebound setelah koreksi tajam", "teknologi-rebound"),
        ("OJK terbitkan aturan baru short selling", "ojk-short-selling"),
        ("Emiten batu bara kompak melemah", "batu-bara-melemah"),
        ("Analis proyeksikan IHSG sideways pekan depan", "ihsg-sideways"),
    ];

    headlines
        .iter()
        .enumerate()
        .filter_map(|(idx, (title, slug))| {
            let published_at = Utc
                .with_ymd_and_hms(2024, 5, 2, 9, 0, 0)
                .single()?
                - chrono::Duration::hours(idx as i64 * 3);

            Some(NewsItem {
                title: title.to_string(),
                link: format!("https://www.liputan6.com/saham/read/{slug}"),
                published_at,
                thumbnail_url: (idx % 3 != 2)
                    .then(|| format!("https://cdn.liputan6.com/thumbnails/{slug}.jpg")),
                summary: None,
            })
        })
        .collect()
}
