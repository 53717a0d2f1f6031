//! Binance spot REST client for 24h ticker statistics

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::TickerSource;
use crate::config::ExchangeConfig;
use crate::domain::RawTicker;
use crate::error::{AdvisorError, Result};

/// Read-only Binance market data client
pub struct BinanceTickerClient {
    base_url: String,
    http: Client,
}

impl BinanceTickerClient {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdvisorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn ticker_url(&self) -> String {
        format!("{}/api/v3/ticker/24hr", self.base_url)
    }
}

#[async_trait]
impl TickerSource for BinanceTickerClient {
    async fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker> {
        debug!("Fetching 24h ticker for {}", symbol);

        let response = self
            .http
            .get(self.ticker_url())
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Binance ticker error for {}: {} - {}", symbol, status, body);
            return Err(AdvisorError::MarketDataUnavailable(format!(
                "{}: {} - {}",
                symbol, status, body
            )));
        }

        let ticker: RawTicker = response.json().await.map_err(|e| {
            AdvisorError::MarketDataUnavailable(format!("{}: bad ticker payload: {}", symbol, e))
        })?;
        Ok(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_url_trims_slash() {
        let config = ExchangeConfig {
            base_url: "https://api.binance.com/".to_string(),
            timeout_secs: 5,
        };
        let client = BinanceTickerClient::new(&config).unwrap();
        assert_eq!(client.ticker_url(), "https://api.binance.com/api/v3/ticker/24hr");
    }
}
