use async_trait::async_trait;

use crate::errors::QuoteError;
use crate::types::{EntryQuote, EntryQuoteRequest, ExitQuote, ExitQuoteRequest};

/// Anything that can price a position: the HTTP pricing API, an RPC
/// simulation, or a test double.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
    async fn entry_quote(&self, request: &EntryQuoteRequest) -> Result<EntryQuote, QuoteError>;

    async fn exit_quote(&self, request: &ExitQuoteRequest) -> Result<ExitQuote, QuoteError>;
}
