//! Inventory entry entity - How many of one item one user holds.
//!
//! Quantity is always positive; the inventory helpers delete the row when it
//! reaches zero, so an absent row is the canonical "holds none".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventories")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user (internal id)
    pub user_id: i64,
    /// The held item
    pub item_id: i64,
    /// Quantity held, always > 0
    pub quantity: i64,
}

/// Defines relationships between `InventoryEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The held item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// The owning user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
