//! Currency registry - per-guild named/coded currencies.
//!
//! Codes are normalized to lowercase on creation, so the per-guild
//! uniqueness rule is case-insensitive by construction. Identifier
//! resolution is a two-stage lookup: exact code match first, then exact
//! name match, both case-insensitive.

use crate::{
    core::guild,
    entities::{Currency, GuildSettings, Item, currency, guild_settings, item},
    errors::{Error, Result},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, PaginatorTrait, QueryOrder, Set, TransactionTrait,
    prelude::*,
};
use tracing::{info, instrument};

/// Creates a new currency with `is_main = false, is_active = true`.
///
/// The code is stored lowercase; creation fails with [`Error::DuplicateCode`]
/// if the guild already has a currency under that code (case-insensitively).
#[instrument(skip(db))]
pub async fn create(
    db: &DatabaseConnection,
    guild_id: i64,
    name: &str,
    code: &str,
) -> Result<currency::Model> {
    let name = name.trim();
    let code = code.trim().to_lowercase();
    if name.is_empty() {
        return Err(Error::invalid("currency name cannot be empty"));
    }
    if code.is_empty() {
        return Err(Error::invalid("currency code cannot be empty"));
    }

    if find_by_code(db, guild_id, &code).await?.is_some() {
        return Err(Error::DuplicateCode { code });
    }

    let created = currency::ActiveModel {
        guild_id: Set(guild_id),
        name: Set(name.to_string()),
        code: Set(code),
        is_main: Set(false),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(guild_id, code = %created.code, "currency created");
    Ok(created)
}

/// Exact case-insensitive code lookup. Codes are stored lowercase, so
/// lowercasing the probe is enough.
pub async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    guild_id: i64,
    code: &str,
) -> Result<Option<currency::Model>> {
    Currency::find()
        .filter(currency::Column::GuildId.eq(guild_id))
        .filter(currency::Column::Code.eq(code.to_lowercase()))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Primary-key lookup for callers holding a foreign key. Dangling keys
/// surface as [`Error::CurrencyNotFound`].
pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> Result<currency::Model> {
    Currency::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::CurrencyNotFound {
            identifier: format!("#{id}"),
        })
}

/// Exact case-insensitive name lookup.
pub async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    guild_id: i64,
    name: &str,
) -> Result<Option<currency::Model>> {
    Currency::find()
        .filter(currency::Column::GuildId.eq(guild_id))
        .filter(
            Expr::expr(Func::lower(Expr::col(currency::Column::Name))).eq(name.to_lowercase()),
        )
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Resolves a currency by identifier: exact code match first, then exact
/// name match, both case-insensitive.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    guild_id: i64,
    identifier: &str,
) -> Result<currency::Model> {
    if let Some(found) = find_by_code(conn, guild_id, identifier).await? {
        return Ok(found);
    }
    if let Some(found) = find_by_name(conn, guild_id, identifier).await? {
        return Ok(found);
    }
    Err(Error::CurrencyNotFound {
        identifier: identifier.to_string(),
    })
}

/// Lists every currency in the guild, creation order.
pub async fn list(db: &DatabaseConnection, guild_id: i64) -> Result<Vec<currency::Model>> {
    Currency::find()
        .filter(currency::Column::GuildId.eq(guild_id))
        .order_by_asc(currency::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists only active currencies, creation order.
pub async fn list_active(db: &DatabaseConnection, guild_id: i64) -> Result<Vec<currency::Model>> {
    Currency::find()
        .filter(currency::Column::GuildId.eq(guild_id))
        .filter(currency::Column::IsActive.eq(true))
        .order_by_asc(currency::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Flips a currency's active flag. Fails with [`Error::AlreadyInState`]
/// when the currency is already in the requested state - callers want the
/// explicit refusal, not a silent no-op.
#[instrument(skip(db))]
pub async fn set_active(
    db: &DatabaseConnection,
    guild_id: i64,
    identifier: &str,
    active: bool,
) -> Result<currency::Model> {
    let found = resolve(db, guild_id, identifier).await?;
    if found.is_active == active {
        return Err(Error::AlreadyInState {
            name: found.name,
            active,
        });
    }

    let mut model: currency::ActiveModel = found.into();
    model.is_active = Set(active);
    let updated = model.update(db).await?;
    info!(guild_id, code = %updated.code, active, "currency state changed");
    Ok(updated)
}

/// Deletes a currency. Refused with [`Error::CurrencyInUse`] while it is the
/// guild's attendance or main currency, or while any item is priced in it.
#[instrument(skip(db))]
pub async fn delete(
    db: &DatabaseConnection,
    guild_id: i64,
    identifier: &str,
) -> Result<currency::Model> {
    let found = resolve(db, guild_id, identifier).await?;

    let txn = db.begin().await?;

    let settings = guild::ensure_settings(&txn, guild_id).await?;
    if settings.attend_currency_id == Some(found.id) || settings.main_currency_id == Some(found.id)
    {
        return Err(Error::CurrencyInUse {
            name: found.name,
            reason: "it is the guild's attendance or main currency".to_string(),
        });
    }

    let item_count = Item::find()
        .filter(item::Column::GuildId.eq(guild_id))
        .filter(item::Column::CurrencyId.eq(found.id))
        .count(&txn)
        .await?;
    if item_count > 0 {
        return Err(Error::CurrencyInUse {
            name: found.name,
            reason: format!("{item_count} item(s) are priced in it"),
        });
    }

    Currency::delete_by_id(found.id).exec(&txn).await?;
    txn.commit().await?;
    info!(guild_id, code = %found.code, "currency deleted");
    Ok(found)
}

/// Makes the identified currency the guild's main currency.
///
/// Clears `is_main` on every currency in the guild, sets it on the target
/// and updates the guild's main-currency pointer; the three writes commit
/// as one unit so no observable state ever has two mains or zero mains.
#[instrument(skip(db))]
pub async fn set_main(
    db: &DatabaseConnection,
    guild_id: i64,
    identifier: &str,
) -> Result<currency::Model> {
    let found = resolve(db, guild_id, identifier).await?;
    guild::ensure_settings(db, guild_id).await?;

    let txn = db.begin().await?;
    promote_in(&txn, guild_id, found.id).await?;
    txn.commit().await?;

    info!(guild_id, code = %found.code, "main currency set");
    resolve(db, guild_id, identifier).await
}

/// Renames the guild's main currency, keeping its code.
///
/// When the main-currency pointer is unset but currencies exist, the
/// flagged currency (or failing that, the first created) is elected main
/// first, matching the registry's self-healing behavior.
#[instrument(skip(db))]
pub async fn rename_main(
    db: &DatabaseConnection,
    guild_id: i64,
    new_name: &str,
) -> Result<currency::Model> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(Error::invalid("currency name cannot be empty"));
    }

    let settings = guild::ensure_settings(db, guild_id).await?;

    let txn = db.begin().await?;

    let main_id = match settings.main_currency_id {
        Some(id) => id,
        None => {
            let currencies = Currency::find()
                .filter(currency::Column::GuildId.eq(guild_id))
                .order_by_asc(currency::Column::Id)
                .all(&txn)
                .await?;
            let elected = currencies
                .iter()
                .find(|c| c.is_main)
                .or_else(|| currencies.first())
                .ok_or(Error::NoMainCurrency)?
                .id;
            promote_in(&txn, guild_id, elected).await?;
            elected
        }
    };

    let main = Currency::find_by_id(main_id)
        .one(&txn)
        .await?
        .ok_or(Error::NoMainCurrency)?;
    let old_name = main.name.clone();

    let mut model: currency::ActiveModel = main.into();
    model.name = Set(new_name.to_string());
    let renamed = model.update(&txn).await?;

    txn.commit().await?;
    info!(guild_id, %old_name, %new_name, "main currency renamed");
    Ok(renamed)
}

/// The three main-currency writes, shared by [`set_main`] and the election
/// path of [`rename_main`]. Must run inside the caller's transaction.
async fn promote_in<C: ConnectionTrait>(conn: &C, guild_id: i64, currency_id: i64) -> Result<()> {
    Currency::update_many()
        .col_expr(currency::Column::IsMain, Expr::value(false))
        .filter(currency::Column::GuildId.eq(guild_id))
        .exec(conn)
        .await?;
    Currency::update_many()
        .col_expr(currency::Column::IsMain, Expr::value(true))
        .filter(currency::Column::Id.eq(currency_id))
        .exec(conn)
        .await?;

    // ensure_settings ran before the transaction, so the row exists
    GuildSettings::update_many()
        .col_expr(
            guild_settings::Column::MainCurrencyId,
            Expr::value(currency_id),
        )
        .filter(guild_settings::Column::GuildId.eq(guild_id))
        .exec(conn)
        .await?;
    Ok(())
}
