//! Instrument universe: which symbols a scan pass should look at.
//!
//! The raw listing comes from a [`SymbolSource`] (an exchange listing call);
//! [`CachedUniverse`] caches it for a TTL and applies the configured
//! [`UniverseFilter`] on every read.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::errors::MarketError;
use crate::types::Instrument;

/// Raw, unfiltered instrument listing.
#[async_trait]
pub trait SymbolSource: Send + Sync + 'static {
    async fn list_symbols(&self) -> Result<Vec<Instrument>, MarketError>;
}

/// Yields the set of instruments the engine should track right now.
#[async_trait]
pub trait InstrumentUniverseProvider: Send + Sync + 'static {
    async fn current_instruments(
        &self,
        filter: UniverseFilter,
    ) -> Result<Vec<Instrument>, MarketError>;
}

/// Universe filter mode, part of the runtime configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniverseFilter {
    /// Every listed instrument.
    #[default]
    All,
    /// Everything except the configured exclusion set (large caps).
    ExcludeMajors,
}

impl fmt::Display for UniverseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniverseFilter::All => f.write_str("all"),
            UniverseFilter::ExcludeMajors => f.write_str("exclude"),
        }
    }
}

impl FromStr for UniverseFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(UniverseFilter::All),
            "exclude" | "exclude_majors" => Ok(UniverseFilter::ExcludeMajors),
            other => Err(other.to_string()),
        }
    }
}

struct CachedListing {
    symbols: Arc<Vec<Instrument>>,
    fetched_at: Instant,
}

/// TTL cache in front of a [`SymbolSource`].
///
/// A failed refresh keeps serving the previous listing; only a cold cache
/// surfaces the error.
pub struct CachedUniverse<S> {
    source: Arc<S>,
    ttl: Duration,
    exclusions: HashSet<Instrument>,
    cached: Mutex<Option<CachedListing>>,
}

impl<S: SymbolSource> CachedUniverse<S> {
    pub fn new(source: Arc<S>, ttl: Duration, exclusions: HashSet<Instrument>) -> Self {
        Self {
            source,
            ttl,
            exclusions,
            cached: Mutex::new(None),
        }
    }

    /// Reloads the listing from the source, replacing the cache on success.
    #[instrument(skip(self), target = "universe")]
    pub async fn refresh(&self) -> Result<Arc<Vec<Instrument>>, MarketError> {
        let symbols = Arc::new(self.source.list_symbols().await?);

        *self.cached.lock() = Some(CachedListing {
            symbols: Arc::clone(&symbols),
            fetched_at: Instant::now(),
        });

        info!(count = symbols.len(), "instrument universe refreshed");
        Ok(symbols)
    }

    /// Fresh cached listing, or `None` when empty or older than the TTL.
    fn fresh(&self) -> Option<Arc<Vec<Instrument>>> {
        let guard = self.cached.lock();
        let listing = guard.as_ref()?;
        (listing.fetched_at.elapsed() < self.ttl).then(|| Arc::clone(&listing.symbols))
    }

    fn stale(&self) -> Option<Arc<Vec<Instrument>>> {
        self.cached.lock().as_ref().map(|l| Arc::clone(&l.symbols))
    }

    async fn listing(&self) -> Result<Arc<Vec<Instrument>>, MarketError> {
        if let Some(symbols) = self.fresh() {
            return Ok(symbols);
        }

        match self.refresh().await {
            Ok(symbols) => Ok(symbols),
            Err(e) => match self.stale() {
                Some(symbols) => {
                    warn!(error = %e, "universe refresh failed; serving stale listing");
                    Ok(symbols)
                }
                None => Err(e),
            },
        }
    }

    fn apply_filter(&self, symbols: &[Instrument], filter: UniverseFilter) -> Vec<Instrument> {
        match filter {
            UniverseFilter::All => symbols.to_vec(),
            UniverseFilter::ExcludeMajors => symbols
                .iter()
                .filter(|s| !self.exclusions.contains(*s))
                .cloned()
                .collect(),
        }
    }
}

#[async_trait]
impl<S: SymbolSource> InstrumentUniverseProvider for CachedUniverse<S> {
    async fn current_instruments(
        &self,
        filter: UniverseFilter,
    ) -> Result<Vec<Instrument>, MarketError> {
        let symbols = self.listing().await?;
        Ok(self.apply_filter(&symbols, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockSource {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl SymbolSource for MockSource {
        async fn list_symbols(&self) -> Result<Vec<Instrument>, MarketError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(MarketError::UniverseUnavailable);
            }
            Ok(vec!["BTCUSDT".into(), "ETHUSDT".into(), "PEPEUSDT".into()])
        }
    }

    fn majors() -> HashSet<Instrument> {
        ["BTCUSDT", "ETHUSDT"].into_iter().map(Instrument::from).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn listing_is_cached_until_ttl_expires() {
        let source = MockSource::new();
        let universe = CachedUniverse::new(source.clone(), Duration::from_secs(60), majors());

        universe.current_instruments(UniverseFilter::All).await.unwrap();
        universe.current_instruments(UniverseFilter::All).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;

        universe.current_instruments(UniverseFilter::All).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exclude_majors_filters_exclusion_set() {
        let universe = CachedUniverse::new(MockSource::new(), Duration::from_secs(60), majors());

        let all = universe.current_instruments(UniverseFilter::All).await.unwrap();
        let filtered = universe
            .current_instruments(UniverseFilter::ExcludeMajors)
            .await
            .unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(filtered, vec![Instrument::new("PEPEUSDT")]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_serves_stale_listing() {
        let source = MockSource::new();
        let universe = CachedUniverse::new(source.clone(), Duration::from_secs(1), majors());

        universe.current_instruments(UniverseFilter::All).await.unwrap();

        source.fail.store(true, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(5)).await;

        let out = universe.current_instruments(UniverseFilter::All).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cold_cache_failure_propagates() {
        let source = MockSource::new();
        source.fail.store(true, Ordering::SeqCst);
        let universe = CachedUniverse::new(source, Duration::from_secs(60), majors());

        let err = universe.current_instruments(UniverseFilter::All).await;
        assert!(matches!(err, Err(MarketError::UniverseUnavailable)));
    }

    #[test]
    fn filter_parses_from_operator_text() {
        assert_eq!("ALL".parse::<UniverseFilter>(), Ok(UniverseFilter::All));
        assert_eq!(
            "exclude".parse::<UniverseFilter>(),
            Ok(UniverseFilter::ExcludeMajors)
        );
        assert!("top10".parse::<UniverseFilter>().is_err());
    }
}
