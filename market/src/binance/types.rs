use serde::Deserialize;

/// `GET /fapi/v1/exchangeInfo`, trimmed to the fields the universe needs.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub quote_asset: String,
    pub status: String,
}

impl SymbolInfo {
    pub fn is_tradable_usdt(&self) -> bool {
        self.quote_asset == "USDT" && self.status == "TRADING"
    }
}

/// One entry of `GET /fapi/v1/ticker/price`. Binance sends prices as strings.
#[derive(Debug, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: String,
}

impl TickerPrice {
    /// Parsed price, or `None` when it is not a positive finite number.
    pub fn parsed(&self) -> Option<f64> {
        self.price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}
