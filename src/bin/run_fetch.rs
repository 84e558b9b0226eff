//! Standalone single-pass fetch: connect, fetch quotes, store them, print a
//! summary. Exits non-zero when the run fails.

use cambio_api::config::Config;
use cambio_api::dolar_client::DolarClient;
use cambio_api::fetch_service;
use cambio_api::storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(
        "connecting to database at {}:{}/{}",
        config.db_host, config.db_port, config.db_name
    );
    let storage = Storage::new(&config.database_url(), config.pool_max_size).await?;

    info!("fetching exchange rates from {}", config.dolar_api_url);
    let client = DolarClient::new(&config.dolar_api_url)?;
    let report = fetch_service::fetch_and_store(&client, &storage).await;

    println!("\n{}", "=".repeat(50));
    println!("RESULT:");
    println!("{}", "=".repeat(50));
    println!(
        "Status: {}",
        if report.is_ok() { "ok" } else { "error" }
    );
    println!("Total fetched: {}", report.total_fetched);
    println!("Successfully inserted: {}", report.total_inserted);
    if let Some(message) = &report.message {
        println!("\nMessage: {message}");
    }
    if !report.errors.is_empty() {
        println!("\nErrors:");
        for error in &report.errors {
            println!("  - {error}");
        }
    }
    if !report.quotes.is_empty() {
        println!("\nExchange rates fetched:");
        for quote in &report.quotes {
            println!(
                "  - {}: buy {}, sell {}",
                quote.rate_type,
                quote
                    .buy
                    .map(|d| format!("${d}"))
                    .unwrap_or_else(|| "n/a".to_string()),
                quote
                    .sell
                    .map(|d| format!("${d}"))
                    .unwrap_or_else(|| "n/a".to_string()),
            );
        }
    }
    println!("{}", "=".repeat(50));

    if !report.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
