//! Member inventories.
//!
//! One row per (user, item) with quantity strictly positive; a row whose
//! quantity would reach zero is deleted rather than kept around. Every
//! quantity change in the crate (buy, sell, gifting, loot wins, admin
//! settlement) funnels through [`adjust_quantity`].

use crate::{
    core::{catalog, user},
    entities::{InventoryEntry, Item, inventory_entry, item},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::{debug, info, instrument};

/// Applies a signed delta to a user's holding of one item.
///
/// Inserts the row on first acquisition, deletes it when the quantity
/// reaches zero, and refuses with [`Error::InsufficientQuantity`] when the
/// delta would take it negative. Returns the new quantity (zero when the
/// row was deleted).
pub async fn adjust_quantity<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    item_id: i64,
    delta: i64,
) -> Result<i64> {
    let existing = InventoryEntry::find()
        .filter(inventory_entry::Column::UserId.eq(user_id))
        .filter(inventory_entry::Column::ItemId.eq(item_id))
        .one(conn)
        .await?;

    let held = existing.as_ref().map_or(0, |e| e.quantity);
    let new_quantity = held + delta;
    if new_quantity < 0 {
        let name = Item::find_by_id(item_id)
            .one(conn)
            .await?
            .map_or_else(|| format!("#{item_id}"), |i| i.name);
        return Err(Error::InsufficientQuantity {
            item: name,
            held,
            requested: -delta,
        });
    }

    match (existing, new_quantity) {
        (Some(row), 0) => {
            InventoryEntry::delete_by_id(row.id).exec(conn).await?;
        }
        (Some(row), q) => {
            let mut model: inventory_entry::ActiveModel = row.into();
            model.quantity = Set(q);
            model.update(conn).await?;
        }
        (None, 0) => {}
        (None, q) => {
            inventory_entry::ActiveModel {
                user_id: Set(user_id),
                item_id: Set(item_id),
                quantity: Set(q),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }

    debug!(user_id, item_id, delta, new_quantity, "inventory adjusted");
    Ok(new_quantity)
}

/// How many units of one item a user holds. Missing row reads as zero.
pub async fn quantity_of<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    item_id: i64,
) -> Result<i64> {
    let row = InventoryEntry::find()
        .filter(inventory_entry::Column::UserId.eq(user_id))
        .filter(inventory_entry::Column::ItemId.eq(item_id))
        .one(conn)
        .await?;
    Ok(row.map_or(0, |e| e.quantity))
}

/// A user's full inventory paired with the items, acquisition order.
pub async fn get_inventory(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<(inventory_entry::Model, item::Model)>> {
    let rows = InventoryEntry::find()
        .filter(inventory_entry::Column::UserId.eq(user_id))
        .find_also_related(Item)
        .order_by_asc(inventory_entry::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(entry, found)| found.map(|found| (entry, found)))
        .collect())
}

/// Admin settlement for items: grants (positive) or reclaims (negative)
/// units of an item, creating the member row on the fly.
#[instrument(skip(db))]
pub async fn settle_item(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    item_name: &str,
    quantity: i64,
) -> Result<i64> {
    if quantity == 0 {
        return Err(Error::invalid("settlement quantity cannot be zero"));
    }
    let found = catalog::resolve(db, guild_id, item_name).await?;
    let holder = user::get_or_create(db, guild_id, external_id).await?;

    let txn = db.begin().await?;
    let new_quantity = adjust_quantity(&txn, holder.id, found.id, quantity).await?;
    txn.commit().await?;

    info!(guild_id, external_id, item = %found.name, quantity, "inventory settled");
    Ok(new_quantity)
}

/// Wipes a member's inventory. Returns the number of rows removed.
#[instrument(skip(db))]
pub async fn clear(db: &DatabaseConnection, guild_id: i64, external_id: i64) -> Result<u64> {
    let holder = user::get_or_create(db, guild_id, external_id).await?;
    let result = InventoryEntry::delete_many()
        .filter(inventory_entry::Column::UserId.eq(holder.id))
        .exec(db)
        .await?;
    info!(guild_id, external_id, removed = result.rows_affected, "inventory cleared");
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::catalog::add_item;
    use crate::test_utils::{create_test_currency, setup_test_db};

    #[tokio::test]
    async fn test_adjust_quantity_inserts_accumulates_and_deletes() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let potion = add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        let holder = user::get_or_create(&db, 1, 100).await?;

        assert_eq!(adjust_quantity(&db, holder.id, potion.id, 2).await?, 2);
        assert_eq!(adjust_quantity(&db, holder.id, potion.id, 3).await?, 5);
        assert_eq!(adjust_quantity(&db, holder.id, potion.id, -5).await?, 0);

        // Row deleted at zero, not kept with quantity 0
        assert!(get_inventory(&db, holder.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_quantity_refuses_underflow() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let potion = add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        let holder = user::get_or_create(&db, 1, 100).await?;
        adjust_quantity(&db, holder.id, potion.id, 1).await?;

        let result = adjust_quantity(&db, holder.id, potion.id, -2).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientQuantity {
                held: 1,
                requested: 2,
                ..
            }
        ));
        assert_eq!(quantity_of(&db, holder.id, potion.id).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_inventory_joins_items_in_acquisition_order() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let potion = add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        let boot = add_item(&db, 1, "Old Boot", 3, "", currency.id, None, true).await?;
        let holder = user::get_or_create(&db, 1, 100).await?;

        adjust_quantity(&db, holder.id, boot.id, 1).await?;
        adjust_quantity(&db, holder.id, potion.id, 4).await?;

        let rows = get_inventory(&db, holder.id).await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.name, "Old Boot");
        assert_eq!(rows[1].1.name, "Potion");
        assert_eq!(rows[1].0.quantity, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_settle_item_grant_and_reclaim() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;

        assert_eq!(settle_item(&db, 1, 100, "Potion", 3).await?, 3);
        assert_eq!(settle_item(&db, 1, 100, "potion", -1).await?, 2);

        // Unlike balances there is no floor: reclaiming more than held fails
        let result = settle_item(&db, 1, 100, "Potion", -5).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientQuantity { .. }
        ));

        assert!(matches!(
            settle_item(&db, 1, 100, "Potion", 0).await.unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_wipes_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", currency.id, None, true).await?;
        add_item(&db, 1, "Old Boot", 3, "", currency.id, None, true).await?;
        settle_item(&db, 1, 100, "Potion", 2).await?;
        settle_item(&db, 1, 100, "Old Boot", 1).await?;

        assert_eq!(clear(&db, 1, 100).await?, 2);
        let holder = user::get_or_create(&db, 1, 100).await?;
        assert!(get_inventory(&db, holder.id).await?.is_empty());

        Ok(())
    }
}
