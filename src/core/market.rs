//! Shop trades: buying listed items and selling back through sell listings.
//!
//! Buying is guarded against the last-unit race: the stock decrement runs
//! as a conditional `UPDATE ... WHERE stock > 0` inside the purchase
//! transaction, and a zero `rows_affected` means another buyer got there
//! first. Sell listings are upserts keyed on (guild, item), so
//! re-registering an item simply replaces its buy-back price.

use crate::{
    core::{catalog, currency, inventory, ledger, user},
    entities::{Item, SellListing, item, sell_listing},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// What a completed purchase looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseReceipt {
    /// The item as it was at purchase time.
    pub item: item::Model,
    /// Buyer's balance after the debit.
    pub new_balance: i64,
    /// Stock left after this unit, `None` for unlimited items.
    pub remaining_stock: Option<i32>,
}

/// What a completed sale looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    /// The item sold back.
    pub item: item::Model,
    /// Units sold.
    pub quantity: i64,
    /// Total credited (listing price times quantity).
    pub proceeds: i64,
    /// Seller's balance after the credit.
    pub new_balance: i64,
}

/// Buys one unit of a listed item.
///
/// Fails with [`Error::ItemNotFound`] for unknown or delisted names,
/// [`Error::OutOfStock`] when finite stock is exhausted and
/// [`Error::InsufficientFunds`] when the price is not covered. Debit,
/// inventory credit and stock decrement commit as one transaction.
#[instrument(skip(db))]
pub async fn buy(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    item_name: &str,
) -> Result<PurchaseReceipt> {
    let found = catalog::resolve(db, guild_id, item_name).await?;
    if !found.listed {
        return Err(Error::ItemNotFound {
            name: item_name.to_string(),
        });
    }
    if matches!(found.stock, Some(n) if n <= 0) {
        return Err(Error::OutOfStock { name: found.name });
    }
    let paying = currency::find_by_id(db, found.currency_id).await?;
    let buyer = user::get_or_create(db, guild_id, external_id).await?;

    let txn = db.begin().await?;

    let new_balance = ledger::spend(&txn, buyer.id, &paying, found.price).await?;
    inventory::adjust_quantity(&txn, buyer.id, found.id, 1).await?;

    let remaining_stock = if found.stock.is_some() {
        // Conditional decrement so two buyers can't share the last unit
        let result = Item::update_many()
            .col_expr(
                item::Column::Stock,
                Expr::col(item::Column::Stock).sub(1),
            )
            .filter(item::Column::Id.eq(found.id))
            .filter(item::Column::Stock.gt(0))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            warn!(guild_id, item = %found.name, "purchase lost the last-unit race");
            return Err(Error::OutOfStock { name: found.name });
        }
        Item::find_by_id(found.id)
            .one(&txn)
            .await?
            .and_then(|i| i.stock)
    } else {
        None
    };

    txn.commit().await?;
    info!(guild_id, external_id, item = %found.name, new_balance, "item bought");
    Ok(PurchaseReceipt {
        item: found,
        new_balance,
        remaining_stock,
    })
}

/// Registers (or replaces) the buy-back listing for an item.
#[instrument(skip(db))]
pub async fn register_sell_listing(
    db: &DatabaseConnection,
    guild_id: i64,
    item_name: &str,
    price: i64,
    currency_identifier: &str,
) -> Result<sell_listing::Model> {
    if price < 0 {
        return Err(Error::invalid("listing price cannot be negative"));
    }
    let found = catalog::resolve(db, guild_id, item_name).await?;
    let paying = currency::resolve(db, guild_id, currency_identifier).await?;

    let existing = SellListing::find()
        .filter(sell_listing::Column::GuildId.eq(guild_id))
        .filter(sell_listing::Column::ItemId.eq(found.id))
        .one(db)
        .await?;

    let listing = match existing {
        Some(row) => {
            let mut model: sell_listing::ActiveModel = row.into();
            model.price = Set(price);
            model.currency_id = Set(paying.id);
            model.update(db).await?
        }
        None => {
            sell_listing::ActiveModel {
                guild_id: Set(guild_id),
                item_id: Set(found.id),
                price: Set(price),
                currency_id: Set(paying.id),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    info!(guild_id, item = %found.name, price, currency = %paying.code, "sell listing registered");
    Ok(listing)
}

/// Removes an item's buy-back listing. Fails with [`Error::NotListed`]
/// when there is none.
#[instrument(skip(db))]
pub async fn remove_sell_listing(
    db: &DatabaseConnection,
    guild_id: i64,
    item_name: &str,
) -> Result<()> {
    let found = catalog::resolve(db, guild_id, item_name).await?;

    let result = SellListing::delete_many()
        .filter(sell_listing::Column::GuildId.eq(guild_id))
        .filter(sell_listing::Column::ItemId.eq(found.id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::NotListed { name: found.name });
    }
    info!(guild_id, item = %found.name, "sell listing removed");
    Ok(())
}

/// Sells units of a held item back at its listed buy-back price.
///
/// Fails with [`Error::NotListed`] when the item has no sell listing and
/// [`Error::InsufficientQuantity`] when the member holds fewer than
/// `quantity`. Inventory debit and balance credit commit as one
/// transaction.
#[instrument(skip(db))]
pub async fn sell(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    item_name: &str,
    quantity: i64,
) -> Result<SaleReceipt> {
    if quantity <= 0 {
        return Err(Error::invalid("sale quantity must be positive"));
    }
    let found = catalog::resolve(db, guild_id, item_name).await?;
    let listing = SellListing::find()
        .filter(sell_listing::Column::GuildId.eq(guild_id))
        .filter(sell_listing::Column::ItemId.eq(found.id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotListed {
            name: found.name.clone(),
        })?;
    let seller = user::get_or_create(db, guild_id, external_id).await?;

    let txn = db.begin().await?;
    inventory::adjust_quantity(&txn, seller.id, found.id, -quantity).await?;
    let proceeds = listing.price * quantity;
    let new_balance = ledger::adjust(&txn, seller.id, listing.currency_id, proceeds).await?;
    txn.commit().await?;

    info!(guild_id, external_id, item = %found.name, quantity, proceeds, "item sold");
    Ok(SaleReceipt {
        item: found,
        quantity,
        proceeds,
        new_balance,
    })
}

/// Every sell listing in the guild paired with its item, creation order.
pub async fn list_sell_listings(
    db: &DatabaseConnection,
    guild_id: i64,
) -> Result<Vec<(sell_listing::Model, item::Model)>> {
    let rows = SellListing::find()
        .filter(sell_listing::Column::GuildId.eq(guild_id))
        .find_also_related(Item)
        .order_by_asc(sell_listing::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(listing, found)| found.map(|found| (listing, found)))
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::catalog::add_item;
    use crate::test_utils::{create_test_currency, setup_test_db};

    #[tokio::test]
    async fn test_buy_debits_credits_and_decrements_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", coin.id, Some(3), true).await?;
        let buyer = user::get_or_create(&db, 1, 100).await?;
        ledger::adjust(&db, buyer.id, coin.id, 25).await?;

        let receipt = buy(&db, 1, 100, "potion").await?;
        assert_eq!(receipt.new_balance, 15);
        assert_eq!(receipt.remaining_stock, Some(2));
        assert_eq!(inventory::quantity_of(&db, buyer.id, receipt.item.id).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_buy_unlimited_stock_never_runs_out() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 1, "", coin.id, None, true).await?;
        let buyer = user::get_or_create(&db, 1, 100).await?;
        ledger::adjust(&db, buyer.id, coin.id, 3).await?;

        for _ in 0..3 {
            let receipt = buy(&db, 1, 100, "Potion").await?;
            assert_eq!(receipt.remaining_stock, None);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_buy_refusals_leave_state_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", coin.id, Some(1), true).await?;
        add_item(&db, 1, "Relic", 5, "", coin.id, Some(0), true).await?;
        add_item(&db, 1, "Secret", 5, "", coin.id, None, false).await?;
        let buyer = user::get_or_create(&db, 1, 100).await?;
        ledger::adjust(&db, buyer.id, coin.id, 5).await?;

        assert!(matches!(
            buy(&db, 1, 100, "Nothing").await.unwrap_err(),
            Error::ItemNotFound { name: _ }
        ));
        // Delisted items read as not found to buyers
        assert!(matches!(
            buy(&db, 1, 100, "Secret").await.unwrap_err(),
            Error::ItemNotFound { name: _ }
        ));
        assert!(matches!(
            buy(&db, 1, 100, "Relic").await.unwrap_err(),
            Error::OutOfStock { name: _ }
        ));
        assert!(matches!(
            buy(&db, 1, 100, "Potion").await.unwrap_err(),
            Error::InsufficientFunds {
                current: 5,
                required: 10,
                ..
            }
        ));

        // Nothing moved
        assert_eq!(ledger::get(&db, buyer.id, coin.id).await?, 5);
        assert!(inventory::get_inventory(&db, buyer.id).await?.is_empty());
        let potion = catalog::resolve(&db, 1, "Potion").await?;
        assert_eq!(potion.stock, Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_buy_last_unit_exhausts_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 2, "", coin.id, Some(1), true).await?;
        let first = user::get_or_create(&db, 1, 100).await?;
        let second = user::get_or_create(&db, 1, 200).await?;
        ledger::adjust(&db, first.id, coin.id, 10).await?;
        ledger::adjust(&db, second.id, coin.id, 10).await?;

        let receipt = buy(&db, 1, 100, "Potion").await?;
        assert_eq!(receipt.remaining_stock, Some(0));

        let result = buy(&db, 1, 200, "Potion").await;
        assert!(matches!(result.unwrap_err(), Error::OutOfStock { name: _ }));
        // Losing buyer keeps their money and gets no unit
        assert_eq!(ledger::get(&db, second.id, coin.id).await?, 10);
        assert!(inventory::get_inventory(&db, second.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_buys_of_last_unit() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 2, "", coin.id, Some(1), true).await?;
        let first = user::get_or_create(&db, 1, 100).await?;
        let second = user::get_or_create(&db, 1, 200).await?;
        ledger::adjust(&db, first.id, coin.id, 10).await?;
        ledger::adjust(&db, second.id, coin.id, 10).await?;

        let (a, b) = tokio::join!(buy(&db, 1, 100, "Potion"), buy(&db, 1, 200, "Potion"));
        let (winner_id, loser_id, receipt, lost) = if a.is_ok() {
            (first.id, second.id, a?, b)
        } else {
            (second.id, first.id, b?, a)
        };
        assert!(matches!(lost.unwrap_err(), Error::OutOfStock { name: _ }));
        assert_eq!(receipt.remaining_stock, Some(0));

        // Exactly one unit sold: winner paid and holds it, loser untouched
        let potion = catalog::resolve(&db, 1, "Potion").await?;
        assert_eq!(potion.stock, Some(0));
        assert_eq!(ledger::get(&db, winner_id, coin.id).await?, 8);
        assert_eq!(ledger::get(&db, loser_id, coin.id).await?, 10);
        assert_eq!(inventory::quantity_of(&db, winner_id, potion.id).await?, 1);
        assert_eq!(inventory::quantity_of(&db, loser_id, potion.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_sell_listing_upserts() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        let gem = create_test_currency(&db, 1, "Gem", "gem").await?;
        add_item(&db, 1, "Potion", 10, "", coin.id, None, true).await?;

        let first = register_sell_listing(&db, 1, "Potion", 4, "coin").await?;
        let second = register_sell_listing(&db, 1, "Potion", 7, "gem").await?;

        // Replaced in place, not duplicated
        assert_eq!(first.id, second.id);
        assert_eq!(second.price, 7);
        assert_eq!(second.currency_id, gem.id);
        assert_eq!(list_sell_listings(&db, 1).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_sell_requires_listing_and_holdings() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", coin.id, None, true).await?;
        inventory::settle_item(&db, 1, 100, "Potion", 2).await?;

        assert!(matches!(
            sell(&db, 1, 100, "Potion", 1).await.unwrap_err(),
            Error::NotListed { name: _ }
        ));

        register_sell_listing(&db, 1, "Potion", 4, "coin").await?;
        assert!(matches!(
            sell(&db, 1, 100, "Potion", 3).await.unwrap_err(),
            Error::InsufficientQuantity {
                held: 2,
                requested: 3,
                ..
            }
        ));

        let receipt = sell(&db, 1, 100, "Potion", 2).await?;
        assert_eq!(receipt.proceeds, 8);
        assert_eq!(receipt.new_balance, 8);
        let seller = user::get_or_create(&db, 1, 100).await?;
        assert!(inventory::get_inventory(&db, seller.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_sell_listing() -> Result<()> {
        let db = setup_test_db().await?;
        let coin = create_test_currency(&db, 1, "Fox Coin", "coin").await?;
        add_item(&db, 1, "Potion", 10, "", coin.id, None, true).await?;
        register_sell_listing(&db, 1, "Potion", 4, "coin").await?;

        remove_sell_listing(&db, 1, "Potion").await?;
        assert!(list_sell_listings(&db, 1).await?.is_empty());

        assert!(matches!(
            remove_sell_listing(&db, 1, "Potion").await.unwrap_err(),
            Error::NotListed { name: _ }
        ));

        Ok(())
    }
}
