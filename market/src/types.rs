use std::collections::HashMap;
use std::fmt;

/// A tradable symbol tracked by the engine, e.g. `BTCUSDT`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One price observation. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub ts_ms: u64,
    pub price: f64,
}

impl PriceSample {
    pub fn new(ts_ms: u64, price: f64) -> Self {
        Self { ts_ms, price }
    }
}

/// Latest known price per instrument. A missing key means "no price this pass".
pub type PriceMap = HashMap<Instrument, f64>;
