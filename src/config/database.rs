//! Database configuration module.
//!
//! Handles `SQLite` connection setup and schema creation using `SeaORM`.
//! Table statements are generated from the entity definitions with
//! `Schema::create_table_from_entity`, and the uniqueness constraints the
//! data model relies on are created as named indexes. Everything is built
//! with `IF NOT EXISTS`, so setup is explicitly idempotent instead of
//! swallowing "already exists" failures at runtime.

use crate::entities::{
    Balance, Currency, DrawCounter, GuildSettings, InventoryEntry, Item, LootEntry, SellListing,
    User, balance, currency, draw_counter, inventory_entry, item, loot_entry, sell_listing, user,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_URL: &str = "sqlite://data/tacklebox.sqlite?mode=rwc";

/// Resolves the database URL: explicit override first (the settings
/// file), then `DATABASE_URL`, then the built-in `SQLite` default.
pub fn resolve_database_url(override_url: Option<&str>) -> String {
    override_url.map_or_else(
        || std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
        str::to_string,
    )
}

/// Establishes a connection using [`resolve_database_url`].
pub async fn create_connection(override_url: Option<&str>) -> Result<DatabaseConnection> {
    Database::connect(resolve_database_url(override_url))
        .await
        .map_err(Into::into)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

async fn create_index(db: &DatabaseConnection, statement: &IndexCreateStatement) -> Result<()> {
    let builder = db.get_database_backend();
    db.execute(builder.build(statement)).await?;
    Ok(())
}

/// Creates all tables and unique indexes. Safe to call on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, GuildSettings).await?;
    create_table(db, Currency).await?;
    create_table(db, User).await?;
    create_table(db, Balance).await?;
    create_table(db, Item).await?;
    create_table(db, InventoryEntry).await?;
    create_table(db, SellListing).await?;
    create_table(db, LootEntry).await?;
    create_table(db, DrawCounter).await?;

    // Uniqueness constraints from the data model. Currency codes are stored
    // lowercase, so the plain index enforces the case-insensitive rule.
    create_index(
        db,
        Index::create()
            .name("idx_currencies_guild_code")
            .table(Currency)
            .col(currency::Column::GuildId)
            .col(currency::Column::Code)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_users_guild_external")
            .table(User)
            .col(user::Column::GuildId)
            .col(user::Column::ExternalId)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_balances_user_currency")
            .table(Balance)
            .col(balance::Column::UserId)
            .col(balance::Column::CurrencyId)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_items_guild_name")
            .table(Item)
            .col(item::Column::GuildId)
            .col(item::Column::Name)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_inventories_user_item")
            .table(InventoryEntry)
            .col(inventory_entry::Column::UserId)
            .col(inventory_entry::Column::ItemId)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_sell_listings_guild_item")
            .table(SellListing)
            .col(sell_listing::Column::GuildId)
            .col(sell_listing::Column::ItemId)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_loot_entries_guild_item")
            .table(LootEntry)
            .col(loot_entry::Column::GuildId)
            .col(loot_entry::Column::ItemId)
            .unique()
            .if_not_exists(),
    )
    .await?;
    create_index(
        db,
        Index::create()
            .name("idx_draw_counters_guild_user_date")
            .table(DrawCounter)
            .col(draw_counter::Column::GuildId)
            .col(draw_counter::Column::UserId)
            .col(draw_counter::Column::Date)
            .unique()
            .if_not_exists(),
    )
    .await?;

    Ok(())
}
