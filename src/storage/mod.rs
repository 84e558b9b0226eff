mod exchange;
pub use exchange::DEFAULT_LIST_LIMIT;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::Result;

/// Sole owner of the persisted exchange-rate history. Cheap to clone, the
/// pool is reference-counted.
#[derive(Clone)]
pub struct Storage {
    pool: PgPool,
}

impl Storage {
    /// Connects the pool and runs pending migrations. The acquire timeout is
    /// bounded so pool exhaustion surfaces as an error instead of hanging.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
