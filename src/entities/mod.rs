//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod balance;
pub mod currency;
pub mod draw_counter;
pub mod guild_settings;
pub mod inventory_entry;
pub mod item;
pub mod loot_entry;
pub mod sell_listing;
pub mod user;

// Re-export specific types to avoid conflicts
pub use balance::{Column as BalanceColumn, Entity as Balance, Model as BalanceModel};
pub use currency::{Column as CurrencyColumn, Entity as Currency, Model as CurrencyModel};
pub use draw_counter::{
    Column as DrawCounterColumn, Entity as DrawCounter, Model as DrawCounterModel,
};
pub use guild_settings::{
    Column as GuildSettingsColumn, Entity as GuildSettings, Model as GuildSettingsModel,
};
pub use inventory_entry::{
    Column as InventoryEntryColumn, Entity as InventoryEntry, Model as InventoryEntryModel,
};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use loot_entry::{Column as LootEntryColumn, Entity as LootEntry, Model as LootEntryModel};
pub use sell_listing::{
    Column as SellListingColumn, Entity as SellListing, Model as SellListingModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
