use reqwest::StatusCode;
use thiserror::Error;

/// Classified failure of a single remote fetch.
///
/// Every transport outcome maps onto exactly one variant, so screens can
/// pick the user-facing message without inspecting the raw error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The request never received a response (connect, DNS, transport timeout).
    #[error("transport unreachable: {0}")]
    TransportUnreachable(String),

    /// A response arrived but signalled failure, either through the HTTP
    /// status or through the `{status, data}` envelope.
    #[error("non-success status ({status:?}): {message}")]
    NonSuccessStatus {
        status: Option<u16>,
        symbol: Option<String>,
        message: String,
    },

    /// The body parsed but did not have the expected shape.
    #[error("malformed body: {0}")]
    MalformedBody(String),
}

impl FetchError {
    pub fn http_status(status: StatusCode, symbol: Option<&str>) -> Self {
        FetchError::NonSuccessStatus {
            status: Some(status.as_u16()),
            symbol: symbol.map(str::to_string),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        }
    }

    pub fn symbol_not_found(symbol: &str, message: impl Into<String>) -> Self {
        FetchError::NonSuccessStatus {
            status: None,
            symbol: Some(symbol.to_string()),
            message: message.into(),
        }
    }

    /// Message shown inline on the screen that issued the fetch.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::TransportUnreachable(_) => "Could not reach service.".to_string(),
            FetchError::NonSuccessStatus {
                symbol: Some(symbol),
                ..
            } => format!("No data for {symbol}."),
            FetchError::NonSuccessStatus { status: Some(code), .. } => {
                format!("Service responded with status {code}.")
            }
            FetchError::NonSuccessStatus { message, .. } => format!("Service error: {message}."),
            FetchError::MalformedBody(_) => "Service returned an unexpected response.".to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        FetchError::MalformedBody(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
