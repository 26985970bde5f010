//! Daily check-in rewards.
//!
//! A member may attend once per quota day (see [`crate::core::clock`]) and
//! receives a 1d50 roll of the guild's configured attendance currency. A
//! second, bonus check-in on the same day is available to members holding
//! one of the lucky items, which is consumed by the claim.
//!
//! The once-per-day guards are enforced inside the claim transaction: the
//! date stamp is written with a conditional update and a `rows_affected`
//! check, so two concurrent claims by the same member cannot both credit.

use crate::{
    core::{catalog, clock, currency, guild, inventory, ledger, user},
    entities::{User, currency as currency_entity, user as user_entity},
    errors::{Error, Result},
};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{Condition, DatabaseConnection, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Item names that unlock the bonus check-in, in consumption priority
/// order.
pub const LUCKY_ITEMS: [&str; 2] = ["Attendance Die", "Lucky Tail"];

/// Sides on the attendance reward die.
const REWARD_DIE: i64 = 50;

/// What a check-in paid out.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendOutcome {
    /// The 1d50 result, also the amount credited.
    pub roll: i64,
    /// Balance in the attendance currency after the credit.
    pub new_balance: i64,
    /// The currency credited.
    pub currency: currency_entity::Model,
    /// The lucky item consumed; `None` for the base check-in.
    pub used_item: Option<String>,
}

/// Claims the base daily check-in.
///
/// Fails with [`Error::NoAttendCurrency`] while the guild has not
/// configured one and [`Error::AlreadyAttended`] on a repeat claim within
/// the same quota day. The date stamp and the credit commit as one
/// transaction; a concurrent duplicate claim loses the conditional stamp
/// and is refused.
#[instrument(skip(db, rng))]
pub async fn attend(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    rng: &mut impl Rng,
) -> Result<AttendOutcome> {
    let settings = guild::ensure_settings(db, guild_id).await?;
    let attend_currency_id = settings.attend_currency_id.ok_or(Error::NoAttendCurrency)?;
    let claimant = user::get_or_create(db, guild_id, external_id).await?;
    let today = clock::today();

    if claimant.last_attend_date == Some(today) {
        return Err(Error::AlreadyAttended);
    }

    let rewarded = currency::find_by_id(db, attend_currency_id).await?;
    let roll = rng.gen_range(1..=REWARD_DIE);

    let txn = db.begin().await?;
    // Stamp-before-credit: a concurrent claim that already stamped today
    // makes this update touch zero rows
    let stamped = User::update_many()
        .col_expr(user_entity::Column::LastAttendDate, Expr::value(today))
        .filter(user_entity::Column::Id.eq(claimant.id))
        .filter(
            Condition::any()
                .add(user_entity::Column::LastAttendDate.is_null())
                .add(user_entity::Column::LastAttendDate.ne(today)),
        )
        .exec(&txn)
        .await?;
    if stamped.rows_affected == 0 {
        return Err(Error::AlreadyAttended);
    }
    let new_balance = ledger::adjust(&txn, claimant.id, rewarded.id, roll).await?;
    txn.commit().await?;

    info!(guild_id, external_id, roll, new_balance, "attendance claimed");
    Ok(AttendOutcome {
        roll,
        new_balance,
        currency: rewarded,
        used_item: None,
    })
}

/// Claims the bonus check-in by consuming one lucky item.
///
/// Requires the base check-in first ([`Error::AttendanceRequired`]), at
/// most once per day ([`Error::AlreadyAttended`]), and one of
/// [`LUCKY_ITEMS`] in the member's inventory ([`Error::MissingLuckyItem`]).
/// The base check-in date is left untouched. All guards are re-checked
/// against rows read inside the claim transaction.
#[instrument(skip(db, rng))]
pub async fn bonus_attend(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    rng: &mut impl Rng,
) -> Result<AttendOutcome> {
    let settings = guild::ensure_settings(db, guild_id).await?;
    let attend_currency_id = settings.attend_currency_id.ok_or(Error::NoAttendCurrency)?;
    let claimant = user::get_or_create(db, guild_id, external_id).await?;
    let today = clock::today();

    let rewarded = currency::find_by_id(db, attend_currency_id).await?;
    let roll = rng.gen_range(1..=REWARD_DIE);

    let txn = db.begin().await?;

    let current = User::find_by_id(claimant.id)
        .one(&txn)
        .await?
        .unwrap_or_else(|| claimant.clone());
    if current.last_attend_date != Some(today) {
        return Err(Error::AttendanceRequired);
    }
    if current.last_bonus_attend_date == Some(today) {
        return Err(Error::AlreadyAttended);
    }

    // First lucky item held, in priority order
    let mut chosen = None;
    for name in LUCKY_ITEMS {
        if let Some(found) = catalog::get_by_name(&txn, guild_id, name).await? {
            if inventory::quantity_of(&txn, claimant.id, found.id).await? > 0 {
                chosen = Some(found);
                break;
            }
        }
    }
    let chosen = chosen.ok_or(Error::MissingLuckyItem)?;

    inventory::adjust_quantity(&txn, claimant.id, chosen.id, -1).await?;
    let new_balance = ledger::adjust(&txn, claimant.id, rewarded.id, roll).await?;
    let stamped = User::update_many()
        .col_expr(user_entity::Column::LastBonusAttendDate, Expr::value(today))
        .filter(user_entity::Column::Id.eq(claimant.id))
        .filter(
            Condition::any()
                .add(user_entity::Column::LastBonusAttendDate.is_null())
                .add(user_entity::Column::LastBonusAttendDate.ne(today)),
        )
        .exec(&txn)
        .await?;
    if stamped.rows_affected == 0 {
        return Err(Error::AlreadyAttended);
    }
    txn.commit().await?;

    info!(
        guild_id,
        external_id, roll, new_balance, used_item = %chosen.name, "bonus attendance claimed"
    );
    Ok(AttendOutcome {
        roll,
        new_balance,
        currency: rewarded,
        used_item: Some(chosen.name),
    })
}
