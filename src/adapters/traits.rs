use async_trait::async_trait;

use crate::domain::RawTicker;
use crate::error::Result;

/// Source of 24h ticker statistics
#[async_trait]
pub trait TickerSource: Send + Sync {
    /// Fetch the ticker for a normalized symbol such as `BTCUSDT`.
    async fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker>;
}

/// Source of market headlines used as prompt context
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Raw headline titles, newest first.
    async fn fetch_titles(&self) -> Result<Vec<String>>;
}
