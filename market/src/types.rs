use serde::{Deserialize, Serialize};

use crate::errors::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// Parameters of a position the user is about to open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryQuoteRequest {
    pub symbol: String,
    pub side: Side,
    /// Collateral in USD.
    pub collateral_usd: f64,
    pub leverage: f64,
}

impl EntryQuoteRequest {
    pub fn size_usd(&self) -> f64 {
        self.collateral_usd * self.leverage
    }

    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.symbol.trim().is_empty() {
            return Err(QuoteError::InvalidRequest("empty symbol".into()));
        }
        if !self.collateral_usd.is_finite() || self.collateral_usd <= 0.0 {
            return Err(QuoteError::InvalidRequest(format!(
                "collateral must be positive, got {}",
                self.collateral_usd
            )));
        }
        if !self.leverage.is_finite() || self.leverage < 1.0 {
            return Err(QuoteError::InvalidRequest(format!(
                "leverage must be at least 1, got {}",
                self.leverage
            )));
        }
        Ok(())
    }
}

/// Parameters of a (partial) close of an open position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitQuoteRequest {
    /// On-chain address of the position account.
    pub position: String,
    pub symbol: String,
    pub side: Side,
    pub close_size_usd: f64,
}

impl ExitQuoteRequest {
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.position.trim().is_empty() {
            return Err(QuoteError::InvalidRequest("empty position address".into()));
        }
        if !self.close_size_usd.is_finite() || self.close_size_usd <= 0.0 {
            return Err(QuoteError::InvalidRequest(format!(
                "close size must be positive, got {}",
                self.close_size_usd
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntryQuote {
    pub entry_price: f64,
    pub liquidation_price: f64,
    pub fee_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExitQuote {
    pub exit_price: f64,
    pub fee_usd: f64,
    pub pnl_usd: f64,
    pub amount_out_usd: f64,
}

/// API responses wrap the quote: `{ "quote": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct QuoteEnvelope<Q> {
    pub quote: Q,
}

/// A quote together with the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot<R, Q> {
    pub request: R,
    pub quote: Q,
    pub ts_ms: u64,
}

pub type EntrySnapshot = QuoteSnapshot<EntryQuoteRequest, EntryQuote>;
pub type ExitSnapshot = QuoteSnapshot<ExitQuoteRequest, ExitQuote>;

fn positive_price(name: &str, v: f64) -> Result<(), QuoteError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(QuoteError::InvalidResponse(format!("{name} = {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> Result<(), QuoteError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(QuoteError::InvalidResponse(format!("{name} = {v}")))
    }
}

impl EntryQuote {
    pub fn validate(&self) -> Result<(), QuoteError> {
        positive_price("entry_price", self.entry_price)?;
        non_negative("liquidation_price", self.liquidation_price)?;
        non_negative("fee_usd", self.fee_usd)
    }
}

impl ExitQuote {
    pub fn validate(&self) -> Result<(), QuoteError> {
        positive_price("exit_price", self.exit_price)?;
        non_negative("fee_usd", self.fee_usd)?;
        non_negative("amount_out_usd", self.amount_out_usd)?;
        if self.pnl_usd.is_finite() {
            Ok(())
        } else {
            Err(QuoteError::InvalidResponse(format!("pnl_usd = {}", self.pnl_usd)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(collateral_usd: f64, leverage: f64) -> EntryQuoteRequest {
        EntryQuoteRequest {
            symbol: "SOL".into(),
            side: Side::Long,
            collateral_usd,
            leverage,
        }
    }

    #[test]
    fn entry_request_validation() {
        assert!(entry(100.0, 5.0).validate().is_ok());
        assert!(entry(0.0, 5.0).validate().is_err());
        assert!(entry(100.0, 0.5).validate().is_err());
        assert!(entry(f64::NAN, 2.0).validate().is_err());

        let mut blank = entry(100.0, 2.0);
        blank.symbol = "  ".into();
        assert!(matches!(
            blank.validate(),
            Err(QuoteError::InvalidRequest(_))
        ));
    }

    #[test]
    fn size_is_collateral_times_leverage() {
        assert_eq!(entry(250.0, 4.0).size_usd(), 1_000.0);
    }

    #[test]
    fn exit_request_validation() {
        let req = ExitQuoteRequest {
            position: "7xKX...pos".into(),
            symbol: "ETH".into(),
            side: Side::Short,
            close_size_usd: 50.0,
        };
        assert!(req.validate().is_ok());

        let empty = ExitQuoteRequest {
            position: String::new(),
            ..req.clone()
        };
        assert!(empty.validate().is_err());

        let zero = ExitQuoteRequest {
            close_size_usd: 0.0,
            ..req
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn request_serializes_with_lowercase_side() {
        let json = serde_json::to_value(entry(10.0, 2.0)).unwrap();
        assert_eq!(json["side"], "long");
        assert_eq!(json["symbol"], "SOL");
    }

    #[test]
    fn envelope_decodes_and_validates() {
        let body = r#"{"quote":{"entry_price":142.5,"liquidation_price":120.1,"fee_usd":0.8}}"#;
        let env: QuoteEnvelope<EntryQuote> = serde_json::from_str(body).unwrap();
        assert_eq!(env.quote.entry_price, 142.5);
        assert!(env.quote.validate().is_ok());

        let bad = EntryQuote {
            entry_price: 0.0,
            ..env.quote
        };
        assert!(matches!(bad.validate(), Err(QuoteError::InvalidResponse(_))));
    }

    #[test]
    fn exit_quote_allows_negative_pnl() {
        let q = ExitQuote {
            exit_price: 99.0,
            fee_usd: 0.2,
            pnl_usd: -12.5,
            amount_out_usd: 40.0,
        };
        assert!(q.validate().is_ok());
    }
}
