pub mod binance;
pub mod errors;
pub mod history;
pub mod prices;
pub mod pulse;
pub mod types;
pub mod universe;

pub use errors::MarketError;
pub use history::{PriceHistory, PriceHistoryStore};
pub use prices::PriceSource;
pub use types::{Instrument, PriceMap, PriceSample};
pub use universe::{CachedUniverse, InstrumentUniverseProvider, SymbolSource, UniverseFilter};
