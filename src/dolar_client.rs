use std::time::Duration;

use crate::models::DolarQuote;
use crate::{AppError, Result};

/// Client for the DolarAPI quotes endpoint.
#[derive(Clone)]
pub struct DolarClient {
    http: reqwest::Client,
    url: String,
}

impl DolarClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetches the current quotes. Network failures, non-2xx statuses and
    /// undecodable bodies all surface as `AppError::Fetch`.
    pub async fn fetch(&self) -> Result<Vec<DolarQuote>> {
        tracing::debug!("requesting quotes from {}", self.url);
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("unexpected status {status}")));
        }
        let body = response.text().await?;
        parse_quotes(&body)
    }
}

/// Decodes the response body, which must be a JSON array of quote objects.
pub fn parse_quotes(body: &str) -> Result<Vec<DolarQuote>> {
    let quotes: Vec<DolarQuote> = serde_json::from_str(body)?;
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_configured_url() {
        assert!(DolarClient::new("https://dolarapi.com/v1/dolares").is_ok());
    }

    #[test]
    fn parses_quote_array() {
        let body = r#"[{"moneda":"USD","nombre":"Blue","casa":"blue","compra":1415,"venta":1435,"fechaActualizacion":"2025-11-06T19:58:00.000Z"}]"#;
        let quotes = parse_quotes(body).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].casa, "blue");
        assert_eq!(quotes[0].nombre.as_deref(), Some("Blue"));
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let quotes = parse_quotes(r#"[{"casa":"mayorista","compra":null,"venta":1405}]"#).unwrap();
        assert_eq!(quotes[0].casa, "mayorista");
        assert!(quotes[0].compra.is_none());
        assert!(quotes[0].moneda.is_none());
    }

    #[test]
    fn rejects_non_array_body() {
        assert!(parse_quotes(r#"{"casa":"blue"}"#).is_err());
        assert!(parse_quotes("service unavailable").is_err());
    }

    #[test]
    fn rejects_element_without_casa() {
        assert!(parse_quotes(r#"[{"compra":1415,"venta":1435}]"#).is_err());
    }
}
