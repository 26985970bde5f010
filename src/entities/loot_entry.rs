//! Loot entry entity - One item's win chance in a guild's loot table.
//!
//! The auto-increment id doubles as the explicit creation-order key the
//! cumulative-sum draw walks, so draw outcomes are deterministic and
//! reproducible rather than depending on incidental storage order.
//! (guild, item) is unique; re-registering replaces the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Loot entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loot_entries")]
pub struct Model {
    /// Unique identifier; also the stable walk order for draws
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild
    pub guild_id: i64,
    /// The item this entry grants
    pub item_id: i64,
    /// Win chance in percent, 0 < chance <= 100
    pub chance: f64,
}

/// Defines relationships between `LootEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The granted item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
