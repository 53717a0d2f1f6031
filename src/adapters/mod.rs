pub mod binance_rest;
pub mod cryptopanic;
pub mod traits;

pub use binance_rest::BinanceTickerClient;
pub use cryptopanic::{format_headlines, CryptoPanicFeed};
pub use traits::{HeadlineSource, TickerSource};
