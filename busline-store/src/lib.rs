pub mod app_config;
pub mod database;
pub mod memory_ledger;
pub mod pg_ledger;
pub mod seed;

pub use database::DbClient;
pub use memory_ledger::InMemoryLedger;
pub use pg_ledger::PgLedger;

use app_config::{Config, StorageBackend};
use busline_core::{BookingLedger, CoreError, TicketNumberGenerator};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Open the configured ledger and make sure the route catalog exists
pub async fn open_ledger(config: &Config) -> Result<Arc<dyn BookingLedger>, StoreError> {
    let ticket_numbers = TicketNumberGenerator::new(config.booking.max_ticket_attempts);

    let ledger: Arc<dyn BookingLedger> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory booking ledger");
            Arc::new(InMemoryLedger::new(ticket_numbers))
        }
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let db = DbClient::new(&config.database).await?;
            db.migrate().await?;
            Arc::new(PgLedger::new(db.pool, ticket_numbers))
        }
    };

    seed::ensure_catalog_seeded(ledger.as_ref()).await?;
    Ok(ledger)
}
