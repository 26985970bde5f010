//! Balance ledger.
//!
//! One row per (user, currency); a missing row reads as zero. Every write
//! funnels through [`adjust`], which clamps the result at zero - balances
//! never go negative, whichever operation produced the delta. Spends that
//! must not be absorbed by the clamp go through [`spend`] instead, which
//! refuses rather than floors.

use crate::{
    entities::{Balance, balance, currency},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::{debug, instrument};

/// Reads a user's balance in one currency. Missing row reads as zero.
pub async fn get<C: ConnectionTrait>(conn: &C, user_id: i64, currency_id: i64) -> Result<i64> {
    let row = Balance::find()
        .filter(balance::Column::UserId.eq(user_id))
        .filter(balance::Column::CurrencyId.eq(currency_id))
        .one(conn)
        .await?;
    Ok(row.map_or(0, |b| b.amount))
}

/// Applies a signed delta to a user's balance, clamping the result at zero.
///
/// Returns the new balance. A delta that would push the balance negative is
/// absorbed: the balance lands on exactly zero, never an error. Callers that
/// need the spend to fail instead use [`spend`].
#[instrument(skip(conn))]
pub async fn adjust<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    currency_id: i64,
    delta: i64,
) -> Result<i64> {
    let existing = Balance::find()
        .filter(balance::Column::UserId.eq(user_id))
        .filter(balance::Column::CurrencyId.eq(currency_id))
        .one(conn)
        .await?;

    let new_amount = match existing {
        Some(row) => {
            let new_amount = (row.amount + delta).max(0);
            let mut model: balance::ActiveModel = row.into();
            model.amount = Set(new_amount);
            model.update(conn).await?;
            new_amount
        }
        None => {
            let new_amount = delta.max(0);
            balance::ActiveModel {
                user_id: Set(user_id),
                currency_id: Set(currency_id),
                amount: Set(new_amount),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            new_amount
        }
    };

    debug!(user_id, currency_id, delta, new_amount, "balance adjusted");
    Ok(new_amount)
}

/// Debits an exact amount, refusing with [`Error::InsufficientFunds`] when
/// the balance cannot cover it. Returns the new balance.
pub async fn spend<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    currency: &currency::Model,
    amount: i64,
) -> Result<i64> {
    if amount < 0 {
        return Err(Error::invalid("spend amount cannot be negative"));
    }
    let current = get(conn, user_id, currency.id).await?;
    if current < amount {
        return Err(Error::InsufficientFunds {
            currency: currency.name.clone(),
            current,
            required: amount,
        });
    }
    adjust(conn, user_id, currency.id, -amount).await
}

/// Admin settlement: applies a signed delta to a member's balance in the
/// resolved currency. The zero-floor still applies, so an over-large
/// deduction lands the member on zero rather than failing.
#[instrument(skip(db))]
pub async fn settle(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    identifier: &str,
    amount: i64,
) -> Result<i64> {
    if amount == 0 {
        return Err(Error::invalid("settlement amount cannot be zero"));
    }
    let currency = crate::core::currency::resolve(db, guild_id, identifier).await?;
    let holder = crate::core::user::get_or_create(db, guild_id, external_id).await?;

    let txn = db.begin().await?;
    let new_amount = adjust(&txn, holder.id, currency.id, amount).await?;
    txn.commit().await?;
    Ok(new_amount)
}

/// All of a user's balances paired with their currencies, creation order.
/// Currencies the user never touched are absent.
pub async fn balances_with_currencies(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<(balance::Model, currency::Model)>> {
    let rows = Balance::find()
        .filter(balance::Column::UserId.eq(user_id))
        .find_also_related(crate::entities::Currency)
        .order_by_asc(balance::Column::CurrencyId)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(bal, cur)| cur.map(|cur| (bal, cur)))
        .collect())
}
