//! User entity - A guild member known to the economy, created lazily.
//!
//! `external_id` is the platform-side user key; (guild, external user) pairs
//! are unique. Attendance dates live here so the once-per-day guards are a
//! single row read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Internal user identifier (balances and inventories key on this)
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild
    pub guild_id: i64,
    /// Platform-side user identifier
    pub external_id: i64,
    /// Day of the last claimed attendance reward, in the reference time zone
    pub last_attend_date: Option<Date>,
    /// Day of the last claimed bonus attendance reward
    pub last_bonus_attend_date: Option<Date>,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user holds many balances
    #[sea_orm(has_many = "super::balance::Entity")]
    Balances,
    /// One user holds many inventory entries
    #[sea_orm(has_many = "super::inventory_entry::Entity")]
    InventoryEntries,
}

impl Related<super::balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balances.def()
    }
}

impl Related<super::inventory_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
