use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;
use ulendo_api::middleware::auth::hash_password;
use ulendo_core::models::user::Role;
use ulendo_db::{PgStore, TicketStore, models::NewUser, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL must be set to run migrations")?;

    info!("Connecting to database...");
    let db_pool = ulendo_db::create_pool(&database_url).await?;

    info!("Initializing database schema...");
    initialize_database(&db_pool).await?;
    info!("Database schema initialized successfully.");

    // Staff accounts cannot self-register, so the first admin comes from here
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };
    let full_name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

    let store = PgStore::new(db_pool);
    let created = store
        .create_user(NewUser {
            email: email.clone(),
            full_name,
            phone: None,
            role: Role::Admin,
            password_hash: hash_password(&password)?,
        })
        .await?;

    match created {
        Some(admin) => info!(id = %admin.id, "Created admin account {}", email),
        None => warn!("An account for {} already exists; leaving it unchanged", email),
    }

    Ok(())
}
