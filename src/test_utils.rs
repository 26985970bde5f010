//! Shared test fixtures.
//!
//! Every test runs against its own in-memory sqlite database with the full
//! schema applied, so tests stay independent and order-insensitive.

use crate::{config::database, entities::currency, errors::Result};
use rand::{SeedableRng, rngs::StdRng};
use sea_orm::{Database, DatabaseConnection, Set, prelude::*};

/// Creates a fresh in-memory database with all tables and indexes.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a currency directly, bypassing the registry's validation. The
/// code is stored lowercase the way the registry would store it.
pub async fn create_test_currency(
    db: &DatabaseConnection,
    guild_id: i64,
    name: &str,
    code: &str,
) -> Result<currency::Model> {
    currency::ActiveModel {
        guild_id: Set(guild_id),
        name: Set(name.to_string()),
        code: Set(code.to_lowercase()),
        is_main: Set(false),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A deterministic rng for draw and attendance tests.
#[must_use]
pub fn test_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
