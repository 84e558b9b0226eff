use std::sync::Arc;

use cambio_api::config::Config;
use cambio_api::dolar_client::DolarClient;
use cambio_api::models::AppState;
use cambio_api::routes;
use cambio_api::scheduler::Scheduler;
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
    info!("database ready, migrations applied");

    let client = DolarClient::new(&config.dolar_api_url)?;
    let scheduler = Arc::new(Scheduler::new(
        client,
        storage.clone(),
        config.scheduler_interval(),
    ));
    let state = AppState::new(storage, scheduler.clone());
    tokio::spawn(async move { scheduler.run_loop().await });

    let app = routes::init(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
