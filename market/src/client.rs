use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::QuoteError;
use crate::source::QuoteSource;
use crate::types::{EntryQuote, EntryQuoteRequest, ExitQuote, ExitQuoteRequest, QuoteEnvelope};

/// JSON client for the pricing API.
#[derive(Clone)]
pub struct HttpQuoteClient {
    http: Client,
    base_url: String,
}

impl HttpQuoteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, QuoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B, Q>(&self, path: &str, body: &B) -> Result<Q, QuoteError>
    where
        B: Serialize + ?Sized,
        Q: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let envelope: QuoteEnvelope<Q> = resp.json().await?;
        Ok(envelope.quote)
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteClient {
    #[instrument(
        skip(self, request),
        fields(symbol = %request.symbol, side = ?request.side),
        level = "debug"
    )]
    async fn entry_quote(&self, request: &EntryQuoteRequest) -> Result<EntryQuote, QuoteError> {
        let quote: EntryQuote = self.post("quote/entry", request).await?;
        quote.validate()?;

        debug!(
            entry_price = quote.entry_price,
            fee_usd = quote.fee_usd,
            "entry quote fetched"
        );
        Ok(quote)
    }

    #[instrument(
        skip(self, request),
        fields(position = %request.position, symbol = %request.symbol),
        level = "debug"
    )]
    async fn exit_quote(&self, request: &ExitQuoteRequest) -> Result<ExitQuote, QuoteError> {
        let quote: ExitQuote = self.post("quote/exit", request).await?;
        quote.validate()?;

        debug!(
            exit_price = quote.exit_price,
            pnl_usd = quote.pnl_usd,
            "exit quote fetched"
        );
        Ok(quote)
    }
}
