use url::Url;

use crate::errors::ConfigError;
use crate::models::Symbol;

/// Which implementation backs the news and stock data sources.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceConfig {
    /// Built-in sample tables, no network.
    Static,
    Remote {
        news: NewsEndpoint,
        stock: StockEndpoint,
    },
}

/// Shape of the news service response.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsEnvelope {
    /// `[{article, data: {title, link, time, image_thumbnail}}]`
    Summary,
    /// The service is reached through a CORS proxy that wraps the real
    /// document as a JSON string under `contents`.
    ProxiedFeed { proxy_url: Url },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub header: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsEndpoint {
    pub base_url: Url,
    pub envelope: NewsEnvelope,
    pub api_key: Option<ApiKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockEndpoint {
    pub base_url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    pub page_size: usize,
    pub increment: usize,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            page_size: 7,
            increment: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_source: DataSourceConfig,
    pub news_category: String,
    pub default_symbol: Symbol,
    pub reveal: RevealConfig,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source_name = get("DATA_SOURCE").unwrap_or_else(|| "remote".to_string());
        let data_source = match source_name.to_lowercase().as_str() {
            "static" => DataSourceConfig::Static,
            "remote" => {
                let news_url = get("NEWS_API_URL").ok_or(ConfigError::Missing("NEWS_API_URL"))?;
                let stock_url =
                    get("STOCK_API_URL").ok_or(ConfigError::Missing("STOCK_API_URL"))?;

                let envelope_name = get("NEWS_ENVELOPE").unwrap_or_else(|| "summary".to_string());
                let envelope = match envelope_name.to_lowercase().as_str() {
                    "summary" => NewsEnvelope::Summary,
                    "proxied" => {
                        let proxy =
                            get("NEWS_PROXY_URL").ok_or(ConfigError::Missing("NEWS_PROXY_URL"))?;
                        NewsEnvelope::ProxiedFeed {
                            proxy_url: parse_url("NEWS_PROXY_URL", &proxy)?,
                        }
                    }
                    other => {
                        return Err(ConfigError::Invalid {
                            key: "NEWS_ENVELOPE",
                            reason: format!("{other} (expected 'summary' or 'proxied')"),
                        })
                    }
                };

                let api_key = get("NEWS_API_KEY").map(|value| ApiKey {
                    header: get("NEWS_API_KEY_HEADER").unwrap_or_else(|| "x-api-key".to_string()),
                    value,
                });

                DataSourceConfig::Remote {
                    news: NewsEndpoint {
                        base_url: parse_url("NEWS_API_URL", &news_url)?,
                        envelope,
                        api_key,
                    },
                    stock: StockEndpoint {
                        base_url: parse_url("STOCK_API_URL", &stock_url)?,
                    },
                }
            }
            other => {
                return Err(ConfigError::Invalid {
                    key: "DATA_SOURCE",
                    reason: format!("{other} (expected 'static' or 'remote')"),
                })
            }
        };

        let defaults = RevealConfig::default();
        let reveal = RevealConfig {
            page_size: parse_count("NEWS_PAGE_SIZE", get("NEWS_PAGE_SIZE"), defaults.page_size)?,
            increment: parse_count(
                "NEWS_PAGE_INCREMENT",
                get("NEWS_PAGE_INCREMENT"),
                defaults.increment,
            )?,
        };

        Ok(Self {
            data_source,
            news_category: get("NEWS_CATEGORY").unwrap_or_else(|| "saham".to_string()),
            default_symbol: Symbol::new(&get("DEFAULT_SYMBOL").unwrap_or_else(|| "BBCA".to_string())),
            reveal,
        })
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

fn parse_count(key: &'static str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
