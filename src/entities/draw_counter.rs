//! Draw counter entity - Per-user, per-day count of loot-draw attempts.
//!
//! A new day means a new row, so there is no explicit reset; (guild, user,
//! date) is unique and the date is computed in the process-wide reference
//! time zone.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Draw counter database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_counters")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild
    pub guild_id: i64,
    /// Owning user (internal id)
    pub user_id: i64,
    /// The day this counter covers, in the reference time zone
    pub date: Date,
    /// Attempts consumed on that day
    pub count: i32,
}

/// `DrawCounter` has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
