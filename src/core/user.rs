//! Guild members, created lazily on first reference.

use crate::{
    entities::{User, user},
    errors::Result,
};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use tracing::debug;

/// Gets the internal user row for a platform user in a guild, creating it
/// on first reference.
pub async fn get_or_create(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
) -> Result<user::Model> {
    if let Some(found) = User::find()
        .filter(user::Column::GuildId.eq(guild_id))
        .filter(user::Column::ExternalId.eq(external_id))
        .one(db)
        .await?
    {
        return Ok(found);
    }

    let created = user::ActiveModel {
        guild_id: Set(guild_id),
        external_id: Set(external_id),
        last_attend_date: Set(None),
        last_bonus_attend_date: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(guild_id, external_id, user_id = created.id, "created user");
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_get_or_create_is_lazy_and_stable() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create(&db, 1, 42).await?;
        let second = get_or_create(&db, 1, 42).await?;
        assert_eq!(first.id, second.id);
        assert!(first.last_attend_date.is_none());

        let all = User::find().all(&db).await?;
        assert_eq!(all.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_same_external_id_is_scoped_per_guild() -> Result<()> {
        let db = setup_test_db().await?;

        let in_guild_1 = get_or_create(&db, 1, 42).await?;
        let in_guild_2 = get_or_create(&db, 2, 42).await?;
        assert_ne!(in_guild_1.id, in_guild_2.id);

        Ok(())
    }
}
