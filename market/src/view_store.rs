//! Latest quotes, published for whoever renders them.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{EntrySnapshot, ExitSnapshot};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteView {
    pub entry: Option<EntrySnapshot>,
    pub exit: Option<ExitSnapshot>,
    /// Most recent fetch failure; cleared by the next successful quote.
    pub last_error: Option<String>,
    /// Bumped on every change, lets subscribers spot missed updates.
    pub version: u64,
}

/// State sink written by the quote executors.
#[derive(Clone)]
pub struct QuoteViewStore {
    tx: Arc<watch::Sender<QuoteView>>,
}

impl Default for QuoteViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteViewStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(QuoteView::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> QuoteView {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteView> {
        self.tx.subscribe()
    }

    pub fn set_entry(&self, snapshot: EntrySnapshot) {
        self.tx.send_modify(|view| {
            view.entry = Some(snapshot);
            view.last_error = None;
            view.version += 1;
        });
    }

    pub fn set_exit(&self, snapshot: ExitSnapshot) {
        self.tx.send_modify(|view| {
            view.exit = Some(snapshot);
            view.last_error = None;
            view.version += 1;
        });
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|view| {
            view.last_error = Some(message);
            view.version += 1;
        });
    }

    pub fn clear(&self) {
        self.tx.send_modify(|view| {
            let version = view.version + 1;
            *view = QuoteView {
                version,
                ..QuoteView::default()
            };
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryQuote, EntryQuoteRequest, QuoteSnapshot, Side};

    fn snapshot(price: f64) -> EntrySnapshot {
        QuoteSnapshot {
            request: EntryQuoteRequest {
                symbol: "SOL".into(),
                side: Side::Long,
                collateral_usd: 10.0,
                leverage: 2.0,
            },
            quote: EntryQuote {
                entry_price: price,
                liquidation_price: price * 0.6,
                fee_usd: 0.01,
            },
            ts_ms: 1,
        }
    }

    #[tokio::test]
    async fn success_clears_previous_error() {
        let store = QuoteViewStore::new();
        let mut rx = store.subscribe();

        store.set_error("timeout");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().last_error.as_deref(), Some("timeout"));

        store.set_entry(snapshot(150.0));
        rx.changed().await.unwrap();

        let view = store.current();
        assert_eq!(view.last_error, None);
        assert_eq!(view.entry.map(|s| s.quote.entry_price), Some(150.0));
        assert_eq!(view.version, 2);
    }

    #[test]
    fn clear_resets_but_keeps_counting() {
        let store = QuoteViewStore::new();
        store.set_entry(snapshot(1.0));
        store.clear();

        let view = store.current();
        assert!(view.entry.is_none());
        assert_eq!(view.version, 2);
    }
}
