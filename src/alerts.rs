use crate::api::prices::PriceSource;
use crate::error::{LookupError, PriceAlertError};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuery {
    pub coin: String,
    pub target_price: f64,
}

impl PriceQuery {
    /// Only the target is validated; any coin string, empty or padded
    /// included, goes to the price source and may come back unknown.
    pub fn new(coin: &str, target_price: f64) -> Result<Self, PriceAlertError> {
        if !target_price.is_finite() || target_price < 0.0 {
            return Err(PriceAlertError::InvalidInput(format!(
                "target_price must be a non-negative number, got {}",
                target_price
            )));
        }

        Ok(Self {
            coin: coin.to_string(),
            target_price,
        })
    }

    pub fn coin_id(&self) -> String {
        self.coin.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAlert {
    pub coin: String,
    pub current_price: f64,
    pub target_price: f64,
    pub reached: bool,
}

impl PriceAlert {
    pub fn evaluate(coin: &str, current_price: f64, target_price: f64) -> Self {
        Self {
            coin: coin.to_uppercase(),
            current_price,
            target_price,
            reached: current_price >= target_price,
        }
    }
}

/// Either a populated alert or `{"error": "..."}`. An unknown coin is a
/// normal outcome, not a fault.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PriceResult {
    Alert(PriceAlert),
    Error { error: String },
}

impl From<LookupError> for PriceResult {
    fn from(err: LookupError) -> Self {
        PriceResult::Error {
            error: err.to_string(),
        }
    }
}

pub async fn check_price_alert(source: &PriceSource, query: &PriceQuery) -> PriceResult {
    match source.current_price(&query.coin_id()).await {
        Ok(Some(current_price)) => {
            let alert = PriceAlert::evaluate(&query.coin, current_price, query.target_price);
            info!(
                "{}: price = {} (target: {}, reached: {})",
                alert.coin, alert.current_price, alert.target_price, alert.reached
            );
            PriceResult::Alert(alert)
        }
        Ok(None) => source.unknown_coin(&query.coin).into(),
        Err(e) => {
            warn!("Price lookup for {} failed: {}", query.coin, e);
            e.into()
        }
    }
}
