use crate::error::{LookupError, PriceAlertError};
use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    url: String,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(url: &str, vs_currency: &str, timeout: Duration) -> Result<Self, PriceAlertError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crypto-price-alert/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
            vs_currency: vs_currency.to_lowercase(),
        })
    }

    /// One GET per call, no retries.
    pub async fn fetch_price(&self, coin_id: &str) -> Result<Option<f64>, LookupError> {
        debug!("Fetching {} price in {} from {}", coin_id, self.vs_currency, self.url);

        let response = self
            .http
            .get(&self.url)
            .query(&[("ids", coin_id), ("vs_currencies", self.vs_currency.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!("Price API request for {} failed: {}", coin_id, e);
                LookupError::from(e)
            })?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

        extract_price(&body, coin_id, &self.vs_currency)
    }
}

/// Reads `body[coin_id][currency]` from a simple-price response. A missing
/// coin entry means the API does not list the coin.
pub fn extract_price(
    body: &Value,
    coin_id: &str,
    currency: &str,
) -> Result<Option<f64>, LookupError> {
    let object = body
        .as_object()
        .ok_or_else(|| LookupError::MalformedResponse("expected a JSON object".to_string()))?;

    let Some(entry) = object.get(coin_id) else {
        return Ok(None);
    };

    entry
        .get(currency)
        .and_then(Value::as_f64)
        .map(Some)
        .ok_or_else(|| {
            LookupError::MalformedResponse(format!("no {} price for '{}'", currency, coin_id))
        })
}
