//! Batch fetch with injectable connection parameters, for one-off runs
//! against a non-default database target. Prints the report as JSON.

use clap::Parser;

use cambio_api::config::Config;
use cambio_api::dolar_client::DolarClient;
use cambio_api::fetch_service;
use cambio_api::storage::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Fetch exchange rates from DolarAPI and store in PostgreSQL")]
struct Args {
    /// PostgreSQL host
    #[arg(long)]
    db_host: Option<String>,
    /// PostgreSQL port
    #[arg(long)]
    db_port: Option<u16>,
    /// Database name
    #[arg(long)]
    db_name: Option<String>,
    /// Database user
    #[arg(long)]
    db_user: Option<String>,
    /// Database password
    #[arg(long)]
    db_password: Option<String>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.db_host {
            config.db_host = host;
        }
        if let Some(port) = self.db_port {
            config.db_port = port;
        }
        if let Some(name) = self.db_name {
            config.db_name = name;
        }
        if let Some(user) = self.db_user {
            config.db_user = user;
        }
        if let Some(password) = self.db_password {
            config.db_password = password;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    args.apply(&mut config);

    let storage = Storage::new(&config.database_url(), config.pool_max_size).await?;
    let client = DolarClient::new(&config.dolar_api_url)?;
    let report = fetch_service::fetch_and_store(&client, &storage).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
