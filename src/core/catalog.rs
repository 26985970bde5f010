//! Item catalog - per-guild items the shop and loot table hang off.
//!
//! Item names are unique per guild, case-insensitively. `stock: None` is
//! the unlimited sentinel; `Some(n)` counts down as units are bought and
//! never goes below zero.

use crate::{
    entities::{InventoryEntry, Item, LootEntry, SellListing, inventory_entry, item, loot_entry,
        sell_listing},
    errors::{Error, Result},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::{info, instrument};

/// Adds an item to the guild catalog.
#[instrument(skip(db, description))]
#[allow(clippy::too_many_arguments)]
pub async fn add_item(
    db: &DatabaseConnection,
    guild_id: i64,
    name: &str,
    price: i64,
    description: &str,
    currency_id: i64,
    stock: Option<i32>,
    listed: bool,
) -> Result<item::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid("item name cannot be empty"));
    }
    if price < 0 {
        return Err(Error::invalid("item price cannot be negative"));
    }
    if let Some(n) = stock {
        if n < 0 {
            return Err(Error::invalid("item stock cannot be negative"));
        }
    }

    if get_by_name(db, guild_id, name).await?.is_some() {
        return Err(Error::DuplicateItemName {
            name: name.to_string(),
        });
    }

    let created = item::ActiveModel {
        guild_id: Set(guild_id),
        name: Set(name.to_string()),
        price: Set(price),
        description: Set(description.to_string()),
        currency_id: Set(currency_id),
        stock: Set(stock),
        listed: Set(listed),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(guild_id, name = %created.name, price, ?stock, "item added");
    Ok(created)
}

/// Case-insensitive exact name lookup.
pub async fn get_by_name<C: ConnectionTrait>(
    conn: &C,
    guild_id: i64,
    name: &str,
) -> Result<Option<item::Model>> {
    Item::find()
        .filter(item::Column::GuildId.eq(guild_id))
        .filter(Expr::expr(Func::lower(Expr::col(item::Column::Name))).eq(name.to_lowercase()))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Like [`get_by_name`] but failing with [`Error::ItemNotFound`].
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    guild_id: i64,
    name: &str,
) -> Result<item::Model> {
    get_by_name(conn, guild_id, name)
        .await?
        .ok_or_else(|| Error::ItemNotFound {
            name: name.to_string(),
        })
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<item::Model>> {
    Item::find_by_id(id).one(conn).await.map_err(Into::into)
}

/// Listed items only, creation order. The storefront view.
pub async fn list_listed(db: &DatabaseConnection, guild_id: i64) -> Result<Vec<item::Model>> {
    Item::find()
        .filter(item::Column::GuildId.eq(guild_id))
        .filter(item::Column::Listed.eq(true))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every item in the guild, listed or not.
pub async fn list_all(db: &DatabaseConnection, guild_id: i64) -> Result<Vec<item::Model>> {
    Item::find()
        .filter(item::Column::GuildId.eq(guild_id))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Takes an item off the storefront: clears its `listed` flag and removes
/// any sell listing for it. Inventories already holding the item are left
/// untouched. Fails with [`Error::ItemNotFound`] when the name matches no
/// listed item.
#[instrument(skip(db))]
pub async fn delist(db: &DatabaseConnection, guild_id: i64, name: &str) -> Result<item::Model> {
    let found = resolve(db, guild_id, name).await?;
    if !found.listed {
        return Err(Error::ItemNotFound {
            name: name.to_string(),
        });
    }

    let txn = db.begin().await?;

    Item::update_many()
        .col_expr(item::Column::Listed, Expr::value(false))
        .filter(item::Column::Id.eq(found.id))
        .exec(&txn)
        .await?;
    SellListing::delete_many()
        .filter(sell_listing::Column::ItemId.eq(found.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(guild_id, name = %found.name, "item delisted");
    Ok(found)
}

/// Puts a delisted item back on the storefront.
#[instrument(skip(db))]
pub async fn relist(db: &DatabaseConnection, guild_id: i64, name: &str) -> Result<item::Model> {
    let found = resolve(db, guild_id, name).await?;

    let mut model: item::ActiveModel = found.into();
    model.listed = Set(true);
    let updated = model.update(db).await?;
    info!(guild_id, name = %updated.name, "item relisted");
    Ok(updated)
}

/// Hard-deletes an item and everything hanging off it: inventory entries,
/// sell listings and loot entries, in one transaction.
#[instrument(skip(db))]
pub async fn purge(db: &DatabaseConnection, guild_id: i64, name: &str) -> Result<item::Model> {
    let found = resolve(db, guild_id, name).await?;

    let txn = db.begin().await?;

    InventoryEntry::delete_many()
        .filter(inventory_entry::Column::ItemId.eq(found.id))
        .exec(&txn)
        .await?;
    SellListing::delete_many()
        .filter(sell_listing::Column::ItemId.eq(found.id))
        .exec(&txn)
        .await?;
    LootEntry::delete_many()
        .filter(loot_entry::Column::ItemId.eq(found.id))
        .exec(&txn)
        .await?;
    Item::delete_by_id(found.id).exec(&txn).await?;

    txn.commit().await?;
    info!(guild_id, name = %found.name, "item purged");
    Ok(found)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_currency, setup_test_db};

    #[tokio::test]
    async fn test_add_item_validates_inputs() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;

        assert!(matches!(
            add_item(&db, 1, " ", 10, "", currency.id, None, true)
                .await
                .unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));
        assert!(matches!(
            add_item(&db, 1, "Potion", -1, "", currency.id, None, true)
                .await
                .unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));
        assert!(matches!(
            add_item(&db, 1, "Potion", 10, "", currency.id, Some(-3), true)
                .await
                .unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_rejects_duplicate_name_case_insensitively() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "heals", currency.id, None, true).await?;

        let result = add_item(&db, 1, "POTION", 20, "", currency.id, None, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateItemName { name } if name == "POTION"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_is_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let created = add_item(&db, 1, "Old Boot", 3, "", currency.id, Some(5), true).await?;

        let resolved = resolve(&db, 1, "old BOOT").await?;
        assert_eq!(resolved.id, created.id);

        assert!(matches!(
            resolve(&db, 1, "new boot").await.unwrap_err(),
            Error::ItemNotFound { name } if name == "new boot"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_listed_excludes_hidden_items() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        add_item(&db, 1, "Relic", 0, "", currency.id, None, false).await?;

        let listed = list_listed(&db, 1).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Potion");
        assert_eq!(list_all(&db, 1).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_delist_hides_item_and_drops_sell_listings() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let created = add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        crate::core::market::register_sell_listing(&db, 1, "Potion", 4, "coin").await?;

        delist(&db, 1, "Potion").await?;

        let after = get_by_id(&db, created.id).await?.unwrap();
        assert!(!after.listed);
        assert!(crate::core::market::list_sell_listings(&db, 1).await?.is_empty());

        // A second delist finds no listed item under the name
        assert!(matches!(
            delist(&db, 1, "Potion").await.unwrap_err(),
            Error::ItemNotFound { name: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_relist_restores_visibility() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;

        delist(&db, 1, "Potion").await?;
        let back = relist(&db, 1, "Potion").await?;
        assert!(back.listed);

        Ok(())
    }

    #[tokio::test]
    async fn test_purge_cascades() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let created = add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        crate::core::market::register_sell_listing(&db, 1, "Potion", 4, "coin").await?;

        let holder = crate::core::user::get_or_create(&db, 1, 100).await?;
        crate::core::inventory::adjust_quantity(&db, holder.id, created.id, 2).await?;

        purge(&db, 1, "Potion").await?;

        assert!(get_by_id(&db, created.id).await?.is_none());
        assert!(crate::core::market::list_sell_listings(&db, 1).await?.is_empty());
        assert!(crate::core::inventory::get_inventory(&db, holder.id)
            .await?
            .is_empty());

        Ok(())
    }
}
