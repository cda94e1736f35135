pub mod debounce;
pub mod engine;
pub mod guard;
pub mod metrics;
pub mod runner;
pub mod sweeper;
pub mod tally;
pub mod types;

pub use engine::{ScanEngine, SweepReport};
pub use runner::{PassClock, ScanScheduler, TickOutcome};
pub use sweeper::run_sweeper;
pub use types::{Alert, AlertSender, EngineConfig, PassOutcome, PassReport};
