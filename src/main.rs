use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use ulendo_api::config::ApiConfig;
use ulendo_db::{MemoryStore, PgStore, TicketStore, create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    let store: Arc<dyn TicketStore> = match &config.database_url {
        Some(database_url) => {
            let db_pool = create_pool(database_url).await?;
            initialize_database(&db_pool).await?;
            Arc::new(PgStore::new(db_pool))
        }
        None => Arc::new(MemoryStore::new()),
    };

    // Start API server
    ulendo_api::start_server(config, store).await?;

    Ok(())
}
