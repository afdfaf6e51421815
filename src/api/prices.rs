use super::coingecko::CoinGeckoClient;
use crate::config::{PricingArgs, SourceKind};
use crate::error::{LookupError, PriceAlertError};
use log::info;

/// Demo prices in Turkish lira, roughly the USD price times 34.
pub const MOCK_PRICES: [(&str, f64); 5] = [
    ("bitcoin", 3_400_000.0),
    ("ethereum", 136_000.0),
    ("cardano", 34.0),
    ("solana", 6_800.0),
    ("dogecoin", 1.36),
];

pub fn mock_price(coin_id: &str) -> Option<f64> {
    MOCK_PRICES
        .iter()
        .find(|(id, _)| *id == coin_id)
        .map(|(_, price)| *price)
}

pub fn supported_coins() -> Vec<&'static str> {
    MOCK_PRICES.iter().map(|(id, _)| *id).collect()
}

/// Where current prices come from. A process picks exactly one at startup
/// and shares it read-only across requests.
#[derive(Debug)]
pub enum PriceSource {
    Mock,
    CoinGecko(CoinGeckoClient),
}

impl PriceSource {
    pub fn from_args(args: &PricingArgs) -> Result<Self, PriceAlertError> {
        let source = match args.price_source {
            SourceKind::Mock => PriceSource::Mock,
            SourceKind::Coingecko => PriceSource::CoinGecko(CoinGeckoClient::new(
                &args.price_api_url,
                &args.vs_currency,
                args.upstream_timeout(),
            )?),
        };
        info!("Using {} price source", source.name());
        Ok(source)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PriceSource::Mock => "mock",
            PriceSource::CoinGecko(_) => "coingecko",
        }
    }

    /// Resolves the current price of a lower-cased coin id. `Ok(None)` means
    /// the source does not know the coin.
    pub async fn current_price(&self, coin_id: &str) -> Result<Option<f64>, LookupError> {
        match self {
            PriceSource::Mock => Ok(mock_price(coin_id)),
            PriceSource::CoinGecko(client) => client.fetch_price(coin_id).await,
        }
    }

    pub fn unknown_coin(&self, coin: &str) -> LookupError {
        match self {
            PriceSource::Mock => LookupError::UnknownCoin {
                coin: coin.to_string(),
                supported: supported_coins().join(", "),
            },
            PriceSource::CoinGecko(_) => LookupError::UnlistedCoin(coin.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_holds_the_five_demo_coins() {
        assert_eq!(
            supported_coins(),
            vec!["bitcoin", "ethereum", "cardano", "solana", "dogecoin"]
        );
        assert_eq!(mock_price("dogecoin"), Some(1.36));
        assert_eq!(mock_price("Bitcoin"), None);
    }

    #[tokio::test]
    async fn mock_source_reports_missing_coins_as_none() {
        let source = PriceSource::Mock;
        assert_eq!(source.current_price("solana").await.unwrap(), Some(6_800.0));
        assert_eq!(source.current_price("ripple").await.unwrap(), None);
    }

    #[test]
    fn unknown_coin_message_lists_supported_coins() {
        let err = PriceSource::Mock.unknown_coin("Ripple");
        assert_eq!(
            err.to_string(),
            "Coin 'Ripple' not found. Supported coins: bitcoin, ethereum, cardano, solana, dogecoin"
        );
    }
}
