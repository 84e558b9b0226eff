use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, Result};

/// One element of the DolarAPI response. Upstream field names (`casa`,
/// `compra`, `venta`) are mapped here and nowhere else, so the rest of the
/// system only sees our own vocabulary.
///
/// `compra`/`venta` stay as raw JSON values because the upstream payload is
/// loosely typed; numeric coercion happens per item at insert time.
#[derive(Debug, Clone, Deserialize)]
pub struct DolarQuote {
    #[serde(default)]
    pub moneda: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    pub casa: String,
    #[serde(default)]
    pub compra: Option<Value>,
    #[serde(default)]
    pub venta: Option<Value>,
    #[serde(rename = "fechaActualizacion", default)]
    pub fecha_actualizacion: Option<String>,
}

/// Persisted row of the `exchange_rates` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExchangeRate {
    pub id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub rate_type: String,
    pub buy: Option<Decimal>,
    pub sell: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub diff: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a single record.
#[derive(Debug, Clone)]
pub struct NewExchangeRate {
    pub rate_type: String,
    pub buy: Option<Decimal>,
    pub sell: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub diff: Option<Decimal>,
}

impl NewExchangeRate {
    /// Translates one upstream quote into an insertable record, coercing the
    /// raw buy/sell values and computing the derived fields.
    pub fn from_quote(quote: &DolarQuote) -> Result<Self> {
        let buy = match &quote.compra {
            Some(v) => decimal_from_value(v)?,
            None => None,
        };
        let sell = match &quote.venta {
            Some(v) => decimal_from_value(v)?,
            None => None,
        };
        let (rate, diff) = derive_rate_diff(buy, sell);
        Ok(Self {
            rate_type: quote.casa.clone(),
            buy,
            sell,
            rate,
            diff,
        })
    }
}

/// Body of `POST /api/exchange`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExchange {
    #[serde(rename = "type")]
    pub rate_type: String,
    #[serde(default)]
    pub buy: Option<Decimal>,
    #[serde(default)]
    pub sell: Option<Decimal>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub diff: Option<Decimal>,
}

impl CreateExchange {
    pub fn validate(&self) -> Result<()> {
        if self.rate_type.trim().is_empty() {
            return Err(AppError::Validation("type must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn into_record(self) -> NewExchangeRate {
        NewExchangeRate {
            rate_type: self.rate_type,
            buy: self.buy,
            sell: self.sell,
            rate: self.rate,
            diff: self.diff,
        }
    }
}

/// Midpoint and spread, rounded to two decimal places. Both are computed or
/// neither is: a quote missing one side stores null for both.
pub fn derive_rate_diff(
    buy: Option<Decimal>,
    sell: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    match (buy, sell) {
        (Some(b), Some(s)) => {
            let rate = ((b + s) / Decimal::from(2)).round_dp(2);
            let diff = (s - b).round_dp(2);
            (Some(rate), Some(diff))
        }
        _ => (None, None),
    }
}

/// Coerces an upstream JSON value into a decimal. Accepts numbers and
/// numeric strings (comma decimal separators are normalized); null means
/// the side is absent.
pub fn decimal_from_value(value: &Value) -> Result<Option<Decimal>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| AppError::Storage(format!("non-finite number: {n}")))?;
            Decimal::try_from(f)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("cannot coerce {f} to decimal: {e}")))
        }
        Value::String(s) => {
            let normalized = s.replace(',', ".");
            normalized
                .parse::<Decimal>()
                .map(Some)
                .map_err(|e| AppError::Storage(format!("cannot coerce {s:?} to decimal: {e}")))
        }
        other => Err(AppError::Storage(format!(
            "expected a numeric value, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rate_is_midpoint_and_diff_is_spread() {
        let (rate, diff) = derive_rate_diff(Some(dec("1415")), Some(dec("1435")));
        assert_eq!(rate, Some(dec("1425.00")));
        assert_eq!(diff, Some(dec("20.00")));
    }

    #[test]
    fn derived_fields_round_to_two_places() {
        let (rate, diff) = derive_rate_diff(Some(dec("100.335")), Some(dec("100.342")));
        assert_eq!(rate, Some(dec("100.34")));
        assert_eq!(diff, Some(dec("0.01")));
    }

    #[test]
    fn missing_side_leaves_both_null() {
        assert_eq!(derive_rate_diff(Some(dec("10")), None), (None, None));
        assert_eq!(derive_rate_diff(None, Some(dec("10"))), (None, None));
        assert_eq!(derive_rate_diff(None, None), (None, None));
    }

    #[test]
    fn coercion_accepts_numbers_and_numeric_strings() {
        assert_eq!(
            decimal_from_value(&json!(1415)).unwrap(),
            Some(dec("1415"))
        );
        assert_eq!(
            decimal_from_value(&json!("1415.5")).unwrap(),
            Some(dec("1415.5"))
        );
        assert_eq!(
            decimal_from_value(&json!("1415,5")).unwrap(),
            Some(dec("1415.5"))
        );
        assert_eq!(decimal_from_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn coercion_rejects_non_numeric_values() {
        assert!(decimal_from_value(&json!("not a number")).is_err());
        assert!(decimal_from_value(&json!(true)).is_err());
        assert!(decimal_from_value(&json!({"nested": 1})).is_err());
    }

    #[test]
    fn quote_maps_to_record_with_derived_fields() {
        let quote: DolarQuote =
            serde_json::from_value(json!({"casa": "blue", "compra": 1415, "venta": 1435}))
                .unwrap();
        let record = NewExchangeRate::from_quote(&quote).unwrap();
        assert_eq!(record.rate_type, "blue");
        assert_eq!(record.buy, Some(dec("1415")));
        assert_eq!(record.sell, Some(dec("1435")));
        assert_eq!(record.rate, Some(dec("1425.00")));
        assert_eq!(record.diff, Some(dec("20.00")));
    }

    #[test]
    fn quote_with_bad_buy_fails_coercion() {
        let quote: DolarQuote =
            serde_json::from_value(json!({"casa": "blue", "compra": "n/a", "venta": 1435}))
                .unwrap();
        assert!(NewExchangeRate::from_quote(&quote).is_err());
    }

    #[test]
    fn create_payload_requires_type() {
        let payload = CreateExchange {
            rate_type: "  ".to_string(),
            buy: None,
            sell: None,
            rate: None,
            diff: None,
        };
        assert!(payload.validate().is_err());
    }
}
