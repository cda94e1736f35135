use async_trait::async_trait;

use crate::errors::MarketError;
use crate::types::{Instrument, PriceMap};

/// Bulk source of current prices.
///
/// Instruments without a usable price are simply absent from the returned map.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
    async fn current_prices(&self, instruments: &[Instrument]) -> Result<PriceMap, MarketError>;
}
