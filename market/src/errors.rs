use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid quote request: {0}")]
    InvalidRequest(String),

    #[error("invalid response from quote api: {0}")]
    InvalidResponse(String),

    #[error("rate limited for {symbol}, retry in {retry_after_ms}ms")]
    RateLimited { symbol: String, retry_after_ms: u64 },
}
