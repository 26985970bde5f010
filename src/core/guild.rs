//! Guild settings - the per-guild configuration row.
//!
//! The settings row is created lazily on first reference and starts bare:
//! no main currency, no attendance currency. Nothing is auto-seeded, so
//! operations that need a main currency fail with a typed error until an
//! admin configures one.

use crate::{
    entities::{GuildSettings, guild_settings},
    errors::Result,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, prelude::*};
use tracing::{info, instrument};

/// Gets the guild's settings row, creating a bare one if absent.
/// This is the idempotent setup guard for a guild's economy.
pub async fn ensure_settings<C: ConnectionTrait>(
    conn: &C,
    guild_id: i64,
) -> Result<guild_settings::Model> {
    if let Some(settings) = GuildSettings::find_by_id(guild_id).one(conn).await? {
        return Ok(settings);
    }

    let settings = guild_settings::ActiveModel {
        guild_id: Set(guild_id),
        attend_currency_id: Set(None),
        main_currency_id: Set(None),
    }
    .insert(conn)
    .await?;
    info!(guild_id, "created guild settings");
    Ok(settings)
}

/// Points the guild's attendance reward at the currency matching
/// `identifier` (code first, then name).
#[instrument(skip(db))]
pub async fn set_attend_currency(
    db: &DatabaseConnection,
    guild_id: i64,
    identifier: &str,
) -> Result<crate::entities::currency::Model> {
    let currency = crate::core::currency::resolve(db, guild_id, identifier).await?;
    let settings = ensure_settings(db, guild_id).await?;

    let mut active: guild_settings::ActiveModel = settings.into();
    active.attend_currency_id = Set(Some(currency.id));
    active.update(db).await?;
    info!(guild_id, currency = %currency.code, "attendance currency set");
    Ok(currency)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::{create_test_currency, setup_test_db};

    #[tokio::test]
    async fn test_ensure_settings_creates_bare_row() -> Result<()> {
        let db = setup_test_db().await?;

        let settings = ensure_settings(&db, 1).await?;
        assert_eq!(settings.guild_id, 1);
        assert!(settings.main_currency_id.is_none());
        assert!(settings.attend_currency_id.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_settings_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let first = ensure_settings(&db, 1).await?;
        let second = ensure_settings(&db, 1).await?;
        assert_eq!(first, second);

        let all = GuildSettings::find().all(&db).await?;
        assert_eq!(all.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_attend_currency() -> Result<()> {
        let db = setup_test_db().await?;
        let currency = create_test_currency(&db, 1, "Fox Coin", "coin").await?;

        let set = set_attend_currency(&db, 1, "coin").await?;
        assert_eq!(set.id, currency.id);

        let settings = ensure_settings(&db, 1).await?;
        assert_eq!(settings.attend_currency_id, Some(currency.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_attend_currency_unknown_identifier() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_attend_currency(&db, 1, "nope").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CurrencyNotFound { identifier: _ }
        ));

        Ok(())
    }
}
