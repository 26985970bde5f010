//! Core business logic, framework-agnostic and async throughout.
//!
//! One module per economy component. All mutating operations run as a single
//! database transaction scoped to the rows they touch; the store's
//! serialization is the only locking in play.

/// Daily attendance rewards (base and item-consuming bonus)
pub mod attendance;
/// Item catalog: creation, delisting, hard purge
pub mod catalog;
/// The process-wide reference day for daily quotas
pub mod clock;
/// Currency registry: creation, resolution, activation, main-currency flag
pub mod currency;
/// Per-guild settings row and configuration pointers
pub mod guild;
/// Per-user item inventories and the shared quantity upsert
pub mod inventory;
/// Per-user per-currency balances
pub mod ledger;
/// Weighted loot table and the quota-bounded draw
pub mod loot;
/// Buying, sell listings and selling back
pub mod market;
/// Currency and item gifting between users
pub mod transfer;
/// Lazily created guild members
pub mod user;
