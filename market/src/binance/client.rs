use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::binance::types::{ExchangeInfo, TickerPrice};
use crate::errors::MarketError;
use crate::prices::PriceSource;
use crate::types::{Instrument, PriceMap};
use crate::universe::SymbolSource;

/// REST client for Binance USDⓈ-M futures market data.
#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    url: String,
}

impl BinanceClient {
    pub fn new(url: String) -> Result<Self, MarketError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    /// USDT-quoted symbols currently in `TRADING` status.
    #[instrument(skip(self), level = "debug")]
    pub async fn trading_symbols(&self) -> Result<Vec<Instrument>, MarketError> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.url);

        let info: ExchangeInfo = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let symbols: Vec<Instrument> = info
            .symbols
            .into_iter()
            .filter(|s| s.is_tradable_usdt())
            .map(|s| Instrument::new(s.symbol))
            .collect();

        if symbols.is_empty() {
            return Err(MarketError::InvalidResponse(
                "exchangeInfo listed no tradable USDT symbols".into(),
            ));
        }

        debug!(count = symbols.len(), "binance symbols fetched");
        Ok(symbols)
    }

    /// Every ticker price in one request (no `symbol` parameter).
    #[instrument(skip(self), level = "debug")]
    pub async fn all_ticker_prices(&self) -> Result<Vec<TickerPrice>, MarketError> {
        let url = format!("{}/fapi/v1/ticker/price", self.url);

        let tickers: Vec<TickerPrice> = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(count = tickers.len(), "binance tickers fetched");
        Ok(tickers)
    }
}

#[async_trait]
impl SymbolSource for BinanceClient {
    async fn list_symbols(&self) -> Result<Vec<Instrument>, MarketError> {
        self.trading_symbols().await
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn current_prices(&self, instruments: &[Instrument]) -> Result<PriceMap, MarketError> {
        let wanted: HashSet<&str> = instruments.iter().map(Instrument::as_str).collect();
        let tickers = self.all_ticker_prices().await?;

        Ok(select_prices(&wanted, tickers))
    }
}

/// Keeps the requested symbols with a usable price; unparsable prices are logged and dropped.
fn select_prices(wanted: &HashSet<&str>, tickers: Vec<TickerPrice>) -> PriceMap {
    let mut prices = PriceMap::with_capacity(wanted.len());

    for ticker in tickers {
        if !wanted.contains(ticker.symbol.as_str()) {
            continue;
        }
        match ticker.parsed() {
            Some(price) => {
                prices.insert(Instrument::new(ticker.symbol), price);
            }
            None => {
                warn!(instrument = %ticker.symbol, raw = %ticker.price, "unusable ticker price");
            }
        }
    }

    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, price: &str) -> TickerPrice {
        TickerPrice {
            symbol: symbol.into(),
            price: price.into(),
        }
    }

    #[test]
    fn select_prices_filters_to_requested_and_valid() {
        let wanted: HashSet<&str> = ["AUSDT", "BUSDT"].into_iter().collect();
        let tickers = vec![
            ticker("AUSDT", "1.5"),
            ticker("BUSDT", "garbage"),
            ticker("CUSDT", "3.0"),
        ];

        let prices = select_prices(&wanted, tickers);

        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get(&Instrument::new("AUSDT")), Some(&1.5));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = BinanceClient::new("https://fapi.binance.com/".into()).unwrap();
        assert_eq!(client.url, "https://fapi.binance.com");
    }
}
