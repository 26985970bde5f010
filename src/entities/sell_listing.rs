//! Sell listing entity - A buy-back offer for one item in one guild.
//!
//! Keyed uniquely by (guild, item); registration upserts, so repeated calls
//! overwrite price and payout currency.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sell listing database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sell_listings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild
    pub guild_id: i64,
    /// The item that can be sold back
    pub item_id: i64,
    /// Payout per unit
    pub price: i64,
    /// Currency the payout is denominated in
    pub currency_id: i64,
}

/// Defines relationships between `SellListing` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The listed item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// The payout currency
    #[sea_orm(
        belongs_to = "super::currency::Entity",
        from = "Column::CurrencyId",
        to = "super::currency::Column::Id"
    )]
    Currency,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::currency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currency.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
