//! Member-to-member gifting.
//!
//! A gift moves value between two members without creating or destroying
//! any of it: the debit and the credit commit as one transaction, and the
//! debit side refuses (rather than floors) when the sender cannot cover
//! the gift.

use crate::{
    core::{catalog, currency, inventory, ledger, user},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

/// Gifts currency from one member to another.
///
/// Fails with [`Error::SelfGift`] when sender and recipient are the same
/// member and [`Error::InsufficientFunds`] when the sender cannot cover
/// the amount. Returns (sender balance, recipient balance) after the move.
#[instrument(skip(db))]
pub async fn gift_currency(
    db: &DatabaseConnection,
    guild_id: i64,
    from_external: i64,
    to_external: i64,
    identifier: &str,
    amount: i64,
) -> Result<(i64, i64)> {
    if from_external == to_external {
        return Err(Error::SelfGift);
    }
    if amount <= 0 {
        return Err(Error::invalid("gift amount must be positive"));
    }
    let gifted = currency::resolve(db, guild_id, identifier).await?;
    let sender = user::get_or_create(db, guild_id, from_external).await?;
    let recipient = user::get_or_create(db, guild_id, to_external).await?;

    let txn = db.begin().await?;
    let sender_balance = ledger::spend(&txn, sender.id, &gifted, amount).await?;
    let recipient_balance = ledger::adjust(&txn, recipient.id, gifted.id, amount).await?;
    txn.commit().await?;

    info!(
        guild_id,
        from_external, to_external, currency = %gifted.code, amount, "currency gifted"
    );
    Ok((sender_balance, recipient_balance))
}

/// Gifts units of a held item from one member to another.
///
/// Same shape as [`gift_currency`] over two inventory rows:
/// [`Error::InsufficientQuantity`] when the sender holds fewer than
/// `quantity`. Returns (sender quantity, recipient quantity) after the
/// move.
#[instrument(skip(db))]
pub async fn gift_item(
    db: &DatabaseConnection,
    guild_id: i64,
    from_external: i64,
    to_external: i64,
    item_name: &str,
    quantity: i64,
) -> Result<(i64, i64)> {
    if from_external == to_external {
        return Err(Error::SelfGift);
    }
    if quantity <= 0 {
        return Err(Error::invalid("gift quantity must be positive"));
    }
    let gifted = catalog::resolve(db, guild_id, item_name).await?;
    let sender = user::get_or_create(db, guild_id, from_external).await?;
    let recipient = user::get_or_create(db, guild_id, to_external).await?;

    let txn = db.begin().await?;
    let sender_quantity = inventory::adjust_quantity(&txn, sender.id, gifted.id, -quantity).await?;
    let recipient_quantity =
        inventory::adjust_quantity(&txn, recipient.id, gifted.id, quantity).await?;
    txn.commit().await?;

    info!(
        guild_id,
        from_external, to_external, item = %gifted.name, quantity, "item gifted"
    );
    Ok((sender_quantity, recipient_quantity))
}
