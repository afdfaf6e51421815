use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceAlertError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Why a price could not be resolved for a coin. These are normal request
/// outcomes and end up in the response body, not in the process exit code.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Coin '{coin}' not found. Supported coins: {supported}")]
    UnknownCoin { coin: String, supported: String },

    #[error("Coin '{0}' not found at the price API")]
    UnlistedCoin(String),

    #[error("Price API request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Malformed price API response: {0}")]
    MalformedResponse(String),
}
