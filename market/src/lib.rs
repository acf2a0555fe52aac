//! Position quotes for the trading front-end.
//!
//! Data flow:
//! caller -> PositionQuoteService (coalescing schedulers) -> QuoteSource -> QuoteViewStore

pub mod client;
pub mod errors;
pub mod poller;
pub mod service;
pub mod source;
pub mod types;
pub mod view_store;

pub use client::HttpQuoteClient;
pub use errors::QuoteError;
pub use service::{PositionQuoteService, QuoteServiceConfig};
pub use source::QuoteSource;
pub use types::*;
pub use view_store::{QuoteView, QuoteViewStore};
