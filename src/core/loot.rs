//! Probability-weighted loot draws with a daily quota.
//!
//! Each guild keeps one loot table: at most one entry per item, the
//! chances summing to at most 100 (plus a small float tolerance). The
//! remainder up to 100 is the miss chance. Draws roll uniformly in
//! [0, 100) and walk the entries in creation order, so the table's
//! observable odds match its registered chances exactly.
//!
//! A member gets [`DAILY_DRAW_QUOTA`] draws per quota day. A miss consumes
//! a draw just like a win does.

use crate::{
    core::{catalog, clock, guild, inventory, user},
    entities::{DrawCounter, Item, LootEntry, draw_counter, item, loot_entry},
    errors::{Error, Result},
};
use rand::Rng;
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Draws a member may make per quota day.
pub const DAILY_DRAW_QUOTA: i32 = 3;

/// Tolerance on the 100% capacity check, absorbing float accumulation
/// error across entries.
const CAPACITY_EPSILON: f64 = 1e-6;

/// The guild's loot table as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct LootTable {
    /// Entries paired with their items, creation order (the draw walk
    /// order).
    pub entries: Vec<(loot_entry::Model, item::Model)>,
    /// Sum of the chances, capped at 100.
    pub total: f64,
    /// What remains up to 100: the miss chance.
    pub miss: f64,
}

/// One resolved draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutcome {
    /// The item won, `None` on a miss.
    pub won: Option<item::Model>,
    /// The roll in [0, 100).
    pub roll: f64,
    /// The table total the roll was measured against.
    pub total: f64,
    /// Draws consumed today, this one included.
    pub daily_count: i32,
}

/// Registers (or replaces) an item's draw chance.
///
/// Replace-all semantics: every existing entry for the item is removed
/// and exactly one row inserted, so re-registering can only ever shrink
/// the table total by the difference. An unknown item name is auto-created
/// as a hidden catalog row (price 0, unlimited, unlisted) priced in the
/// main currency, failing with [`Error::NoMainCurrency`] when none is set.
/// A chance that would push the table past 100 fails with
/// [`Error::OverCapacity`] and leaves the table untouched.
#[instrument(skip(db))]
pub async fn set_chance(
    db: &DatabaseConnection,
    guild_id: i64,
    item_name: &str,
    chance: f64,
) -> Result<loot_entry::Model> {
    if !chance.is_finite() || chance <= 0.0 {
        return Err(Error::invalid("chance must be a positive percentage"));
    }

    let found = match catalog::get_by_name(db, guild_id, item_name).await? {
        Some(found) => found,
        None => {
            let settings = guild::ensure_settings(db, guild_id).await?;
            let main_id = settings.main_currency_id.ok_or(Error::NoMainCurrency)?;
            catalog::add_item(db, guild_id, item_name, 0, "", main_id, None, false).await?
        }
    };

    let txn = db.begin().await?;

    // Capacity is judged against the table WITHOUT this item's entries,
    // since they are about to be replaced.
    let others = LootEntry::find()
        .filter(loot_entry::Column::GuildId.eq(guild_id))
        .filter(loot_entry::Column::ItemId.ne(found.id))
        .all(&txn)
        .await?;
    let other_sum: f64 = others.iter().map(|e| e.chance).sum();
    let total = other_sum + chance;
    if total > 100.0 + CAPACITY_EPSILON {
        return Err(Error::OverCapacity { chance, total });
    }

    LootEntry::delete_many()
        .filter(loot_entry::Column::GuildId.eq(guild_id))
        .filter(loot_entry::Column::ItemId.eq(found.id))
        .exec(&txn)
        .await?;
    let entry = loot_entry::ActiveModel {
        guild_id: Set(guild_id),
        item_id: Set(found.id),
        chance: Set(chance),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(guild_id, item = %found.name, chance, total, "loot chance set");
    Ok(entry)
}

/// The guild's loot table with its computed total and miss remainder.
pub async fn list_entries(db: &DatabaseConnection, guild_id: i64) -> Result<LootTable> {
    let rows = LootEntry::find()
        .filter(loot_entry::Column::GuildId.eq(guild_id))
        .find_also_related(Item)
        .order_by_asc(loot_entry::Column::Id)
        .all(db)
        .await?;

    let entries: Vec<(loot_entry::Model, item::Model)> = rows
        .into_iter()
        .filter_map(|(entry, found)| found.map(|found| (entry, found)))
        .collect();
    let total = entries
        .iter()
        .map(|(e, _)| e.chance)
        .sum::<f64>()
        .min(100.0);
    Ok(LootTable {
        entries,
        total,
        miss: 100.0 - total,
    })
}

/// Clears the guild's loot table. Returns the number of entries removed.
#[instrument(skip(db))]
pub async fn reset_all(db: &DatabaseConnection, guild_id: i64) -> Result<u64> {
    let result = LootEntry::delete_many()
        .filter(loot_entry::Column::GuildId.eq(guild_id))
        .exec(db)
        .await?;
    info!(guild_id, removed = result.rows_affected, "loot table reset");
    Ok(result.rows_affected)
}

/// Makes one draw against the guild's loot table.
///
/// Fails with [`Error::NoLootConfigured`] on an empty table and
/// [`Error::QuotaExceeded`] once today's [`DAILY_DRAW_QUOTA`] is spent
/// (a refused draw leaves the counter untouched). The quota re-check,
/// counter increment and any inventory credit commit as one transaction,
/// so concurrent draws cannot stretch the quota.
#[instrument(skip(db, rng))]
pub async fn draw(
    db: &DatabaseConnection,
    guild_id: i64,
    external_id: i64,
    rng: &mut impl Rng,
) -> Result<DrawOutcome> {
    let drawer = user::get_or_create(db, guild_id, external_id).await?;
    let today = clock::today();

    let txn = db.begin().await?;

    let entries = LootEntry::find()
        .filter(loot_entry::Column::GuildId.eq(guild_id))
        .order_by_asc(loot_entry::Column::Id)
        .all(&txn)
        .await?;
    if entries.is_empty() {
        return Err(Error::NoLootConfigured);
    }

    let counter = DrawCounter::find()
        .filter(draw_counter::Column::GuildId.eq(guild_id))
        .filter(draw_counter::Column::UserId.eq(drawer.id))
        .filter(draw_counter::Column::Date.eq(today))
        .one(&txn)
        .await?;
    let spent = counter.as_ref().map_or(0, |c| c.count);
    if spent >= DAILY_DRAW_QUOTA {
        return Err(Error::QuotaExceeded {
            limit: DAILY_DRAW_QUOTA,
        });
    }
    let daily_count = spent + 1;
    match counter {
        Some(row) => {
            let mut model: draw_counter::ActiveModel = row.into();
            model.count = Set(daily_count);
            model.update(&txn).await?;
        }
        None => {
            draw_counter::ActiveModel {
                guild_id: Set(guild_id),
                user_id: Set(drawer.id),
                date: Set(today),
                count: Set(daily_count),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    let roll: f64 = rng.gen_range(0.0..100.0);
    let total = entries
        .iter()
        .map(|e| e.chance)
        .sum::<f64>()
        .min(100.0);

    let won = if roll >= total {
        None
    } else {
        pick_winner(&entries, roll)
    };

    let won = match won {
        Some(entry) => {
            inventory::adjust_quantity(&txn, drawer.id, entry.item_id, 1).await?;
            Item::find_by_id(entry.item_id).one(&txn).await?
        }
        None => None,
    };

    txn.commit().await?;

    debug!(guild_id, external_id, roll, total, daily_count, won = won.is_some(), "draw resolved");
    Ok(DrawOutcome {
        won,
        roll,
        total,
        daily_count,
    })
}

/// Walks the entries in creation order, accumulating chances; the first
/// band containing the roll wins. Non-positive chances are skipped so they
/// can never widen a band.
fn pick_winner(entries: &[loot_entry::Model], roll: f64) -> Option<loot_entry::Model> {
    let mut cumulative = 0.0;
    for entry in entries {
        if entry.chance <= 0.0 {
            continue;
        }
        if roll < cumulative + entry.chance {
            return Some(entry.clone());
        }
        cumulative += entry.chance;
    }
    None
}
