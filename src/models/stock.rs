use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Upper-cased ticker code.
///
/// Construction is the only place normalization happens, so every value of
/// this type is already canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Symbol(normalize_symbol(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalPoint {
    pub date: String,
    pub price: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionPoint {
    pub date: String,
    pub predicted_price: f64,
}

/// Everything the prediction screen shows for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockSnapshot {
    pub symbol: Symbol,
    pub name: String,
    pub current_price: f64,
    pub change_percent: f64,
    pub historical_points: Vec<HistoricalPoint>,
    pub prediction_points: Vec<PredictionPoint>,
    pub fundamentals: Option<BTreeMap<String, f64>>,
    pub model_accuracy: Option<BTreeMap<String, f64>>,
}

impl StockSnapshot {
    /// First predicted point, if the service returned any.
    pub fn next_prediction(&self) -> Option<&PredictionPoint> {
        self.prediction_points.first()
    }
}

/// Entry of the symbol listing (`/stock`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolListing {
    pub symbol: Symbol,
    pub name: String,
}
