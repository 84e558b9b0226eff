use rust_decimal::Decimal;
use serde::Serialize;

use crate::dolar_client::DolarClient;
use crate::models::{decimal_from_value, DolarQuote};
use crate::storage::Storage;
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Ok,
    Error,
}

/// Echo of one fetched quote in the report.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteView {
    #[serde(rename = "type")]
    pub rate_type: String,
    pub buy: Option<Decimal>,
    pub sell: Option<Decimal>,
}

/// Outcome of one fetch-and-store pass. This is the wire shape returned by
/// the force-fetch and run-job endpoints and printed by the CLIs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReport {
    pub status: FetchStatus,
    pub total_fetched: usize,
    pub total_inserted: usize,
    pub quotes: Vec<QuoteView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchReport {
    fn failed(error: AppError) -> Self {
        Self {
            status: FetchStatus::Error,
            total_fetched: 0,
            total_inserted: 0,
            quotes: Vec::new(),
            errors: Vec::new(),
            message: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

/// One full pipeline run: fetch current quotes, store each one, summarize.
/// Failures never escape; the report carries them for the caller to surface.
pub async fn fetch_and_store(client: &DolarClient, storage: &Storage) -> FetchReport {
    let quotes = match client.fetch().await {
        Ok(quotes) => quotes,
        Err(e) => {
            tracing::error!("quote fetch failed: {e}");
            return FetchReport::failed(e);
        }
    };
    let total_fetched = quotes.len();
    let (total_inserted, errors) = storage.insert_many(&quotes).await;
    tracing::info!("stored {total_inserted} of {total_fetched} quotes");
    FetchReport {
        status: FetchStatus::Ok,
        total_fetched,
        total_inserted,
        quotes: quotes.iter().map(quote_view).collect(),
        errors,
        message: None,
    }
}

fn quote_view(quote: &DolarQuote) -> QuoteView {
    let coerced = |value: &Option<serde_json::Value>| {
        value
            .as_ref()
            .and_then(|v| decimal_from_value(v).ok())
            .flatten()
    };
    QuoteView {
        rate_type: quote.casa.clone(),
        buy: coerced(&quote.compra),
        sell: coerced(&quote.venta),
    }
}
