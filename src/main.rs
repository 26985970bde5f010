//! Minimal host process: prepares the database and settings so an embedding
//! frontend (or an operator) gets a ready store. All economy behavior lives
//! in the library.

use dotenvy::dotenv;
use tacklebox::config::{database, settings::Settings};
use tacklebox::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env before settings, so TACKLEBOX_CONFIG / DATABASE_URL can come
    // from the file
    dotenv().ok();

    let settings = Settings::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(settings.log_filter.as_deref().unwrap_or("info"))
        }))
        .init();

    info!(
        url = %database::resolve_database_url(settings.database_url.as_deref()),
        "connecting"
    );
    let db = database::create_connection(settings.database_url.as_deref()).await?;
    database::create_tables(&db).await?;
    info!("schema ready");
    Ok(())
}
