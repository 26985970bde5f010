//! Currency entity - A named, coded unit of account scoped to a guild.
//!
//! Codes are stored lowercase and are unique per guild (case-insensitively).
//! At most one currency per guild carries `is_main = true` at a time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Currency database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    /// Unique identifier for the currency
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild
    pub guild_id: i64,
    /// Human-readable name (e.g., "Fox Coin")
    pub name: String,
    /// Short code, stored lowercase (e.g., "coin")
    pub code: String,
    /// Whether this is the guild's main currency
    pub is_main: bool,
    /// Inactive currencies are hidden from listings but keep their balances
    pub is_active: bool,
}

/// Defines relationships between Currency and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One currency prices many items
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
    /// One currency backs many balances
    #[sea_orm(has_many = "super::balance::Entity")]
    Balances,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
