//! Guild settings entity - Per-guild configuration pointers.
//!
//! Each guild owns at most one row, created lazily on first reference.
//! The main- and attendance-currency pointers are nullable so a freshly
//! bootstrapped guild has neither until an admin configures them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guild settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guild_settings")]
pub struct Model {
    /// Guild identifier (the platform-side guild key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    /// Currency credited by attendance rewards, if configured
    pub attend_currency_id: Option<i64>,
    /// The guild's main currency, if configured
    pub main_currency_id: Option<i64>,
}

/// `GuildSettings` has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
