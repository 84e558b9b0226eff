use crate::models::{DolarQuote, ExchangeRate, NewExchangeRate};
use crate::Result;

use super::Storage;

pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Maps each quote to an insertable record. A quote that fails coercion is
/// recorded by its kind and does not affect its siblings; source order is
/// preserved.
pub fn prepare_records(quotes: &[DolarQuote]) -> (Vec<NewExchangeRate>, Vec<String>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for quote in quotes {
        match NewExchangeRate::from_quote(quote) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("failed to map quote for {}: {e}", quote.casa);
                errors.push(format!("{}: {e}", quote.casa));
            }
        }
    }
    (records, errors)
}

impl Storage {
    /// Inserts one record and returns its generated id.
    pub async fn insert_one(&self, record: &NewExchangeRate) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO exchange_rates (type, buy, sell, rate, diff)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&record.rate_type)
        .bind(record.buy)
        .bind(record.sell)
        .bind(record.rate)
        .bind(record.diff)
        .fetch_one(self.pool())
        .await?;
        Ok(id)
    }

    /// Attempts every quote independently, in source order. A quote that
    /// fails coercion or insertion is recorded and does not abort the rest.
    pub async fn insert_many(&self, quotes: &[DolarQuote]) -> (usize, Vec<String>) {
        let (records, mut errors) = prepare_records(quotes);
        let mut inserted = 0;
        for record in &records {
            match self.insert_one(record).await {
                Ok(id) => {
                    tracing::debug!("inserted {} as id {id}", record.rate_type);
                    inserted += 1;
                }
                Err(e) => {
                    tracing::warn!("failed to insert rate for {}: {e}", record.rate_type);
                    errors.push(format!("{}: {e}", record.rate_type));
                }
            }
        }
        (inserted, errors)
    }

    /// Most recent records, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ExchangeRate>> {
        let rows = sqlx::query_as::<_, ExchangeRate>(
            r#"
            SELECT id, type, buy, sell, rate, diff, created_at
            FROM exchange_rates
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quotes_from(value: serde_json::Value) -> Vec<DolarQuote> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn one_malformed_quote_does_not_abort_the_batch() {
        let quotes = quotes_from(json!([
            {"casa": "oficial", "compra": 1380, "venta": 1420},
            {"casa": "blue", "compra": 1415, "venta": 1435},
            {"casa": "bolsa", "compra": "not a number", "venta": 1450},
            {"casa": "contadoconliqui", "compra": 1451, "venta": 1462},
            {"casa": "mayorista", "compra": 1390, "venta": 1400},
            {"casa": "cripto", "compra": 1440, "venta": 1460},
            {"casa": "tarjeta", "compra": null, "venta": 1846}
        ]));
        let (records, errors) = prepare_records(&quotes);

        assert_eq!(records.len(), 6);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("bolsa:"));
        // siblings keep source order and their own values
        assert_eq!(records[0].rate_type, "oficial");
        assert_eq!(records[2].rate_type, "contadoconliqui");
        assert_eq!(records[5].rate_type, "tarjeta");
        assert!(records[5].buy.is_none());
        assert!(records[5].rate.is_none());
    }

    #[test]
    fn clean_batch_prepares_every_quote() {
        let quotes = quotes_from(json!([
            {"casa": "blue", "compra": 1415, "venta": 1435},
            {"casa": "oficial", "compra": 1380, "venta": 1420}
        ]));
        let (records, errors) = prepare_records(&quotes);
        assert_eq!(records.len(), 2);
        assert!(errors.is_empty());
        assert_eq!(records[0].rate, Some("1425.00".parse().unwrap()));
    }
}
