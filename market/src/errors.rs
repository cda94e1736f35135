use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from market data api: {0}")]
    InvalidResponse(String),

    #[error("instrument listing unavailable")]
    UniverseUnavailable,
}
