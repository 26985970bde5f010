//! Item entity - A catalog entry purchasable through the shop.
//!
//! `stock = None` means unlimited; a finite stock never goes below zero.
//! Unlisted items stay out of the purchase flow but remain valid inventory
//! and loot targets (admin- and loot-only items).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild
    pub guild_id: i64,
    /// Item name, unique per guild
    pub name: String,
    /// Purchase price, never negative
    pub price: i64,
    /// Human-readable description
    pub description: String,
    /// Currency the price is denominated in
    pub currency_id: i64,
    /// Remaining stock; `None` = unlimited
    pub stock: Option<i32>,
    /// Whether the item is visible in the standard purchase flow
    pub listed: bool,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The currency this item is priced in
    #[sea_orm(
        belongs_to = "super::currency::Entity",
        from = "Column::CurrencyId",
        to = "super::currency::Column::Id"
    )]
    Currency,
    /// Inventory entries holding this item
    #[sea_orm(has_many = "super::inventory_entry::Entity")]
    InventoryEntries,
    /// Loot entries granting this item
    #[sea_orm(has_many = "super::loot_entry::Entity")]
    LootEntries,
}

impl Related<super::currency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currency.def()
    }
}

impl Related<super::inventory_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryEntries.def()
    }
}

impl Related<super::loot_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LootEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
