//! Unified error type for the economy core.
//!
//! Every business-rule violation is a recoverable, typed variant carrying
//! enough structured context for the caller to render a precise message.
//! Only storage failures (`Database`) are treated as fatal by callers.

use thiserror::Error;

/// All errors the economy core can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// No currency in the guild matches the given code or name.
    #[error("no currency matches identifier '{identifier}'")]
    CurrencyNotFound {
        /// The code or name the caller tried to resolve.
        identifier: String,
    },

    /// No item in the guild matches the given name.
    #[error("no item named '{name}'")]
    ItemNotFound {
        /// The item name that failed to resolve.
        name: String,
    },

    /// The item exists but has no sell listing.
    #[error("item '{name}' is not registered for sale")]
    NotListed {
        /// The item name.
        name: String,
    },

    /// A currency with this code already exists in the guild.
    #[error("currency code '{code}' already exists in this guild")]
    DuplicateCode {
        /// The conflicting code (stored lowercase).
        code: String,
    },

    /// An item with this name already exists in the guild.
    #[error("item '{name}' already exists in this guild")]
    DuplicateItemName {
        /// The conflicting item name.
        name: String,
    },

    /// The currency is already in the requested active/inactive state.
    #[error("currency '{name}' is already {}", state_word(.active))]
    AlreadyInState {
        /// The currency name.
        name: String,
        /// The state the caller asked for.
        active: bool,
    },

    /// The currency cannot be deleted because something still references it.
    #[error("currency '{name}' is in use: {reason}")]
    CurrencyInUse {
        /// The currency name.
        name: String,
        /// What still references it.
        reason: String,
    },

    /// The balance does not cover the requested debit.
    #[error("insufficient funds: have {current}, need {required} {currency}")]
    InsufficientFunds {
        /// Currency the shortfall is in.
        currency: String,
        /// Current balance.
        current: i64,
        /// Amount the operation required.
        required: i64,
    },

    /// The inventory does not hold the requested quantity.
    #[error("insufficient quantity of '{item}': have {held}, need {requested}")]
    InsufficientQuantity {
        /// The item name.
        item: String,
        /// Quantity currently held.
        held: i64,
        /// Quantity the operation required.
        requested: i64,
    },

    /// The item has finite stock and none is left.
    #[error("item '{name}' is out of stock")]
    OutOfStock {
        /// The item name.
        name: String,
    },

    /// A user tried to gift to themselves.
    #[error("cannot gift to yourself")]
    SelfGift,

    /// Registering this chance would push the guild's loot table past 100%.
    #[error("chance {chance:.2}% would bring the loot table to {total:.2}% > 100%")]
    OverCapacity {
        /// The chance the caller tried to register.
        chance: f64,
        /// The table total that registration would have produced.
        total: f64,
    },

    /// The user already spent today's loot draws.
    #[error("daily draw quota of {limit} reached")]
    QuotaExceeded {
        /// The fixed per-day limit.
        limit: i32,
    },

    /// The guild has no loot entries configured.
    #[error("no loot configured for this guild")]
    NoLootConfigured,

    /// The guild has no main currency set.
    #[error("this guild has no main currency")]
    NoMainCurrency,

    /// The guild has no attendance reward currency set.
    #[error("this guild has no attendance currency")]
    NoAttendCurrency,

    /// The user already claimed this attendance reward today.
    #[error("attendance already claimed today")]
    AlreadyAttended,

    /// Bonus attendance requires the base attendance first.
    #[error("base attendance has not been claimed today")]
    AttendanceRequired,

    /// Bonus attendance requires holding one of the lucky items.
    #[error("no lucky item held for bonus attendance")]
    MissingLuckyItem,

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with it.
        message: String,
    },

    /// Configuration file or environment problem.
    #[error("configuration error: {message}")]
    Config {
        /// What failed to load or parse.
        message: String,
    },

    /// Storage-layer failure; not a business-rule violation.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

fn state_word(active: &bool) -> &'static str {
    if *active { "active" } else { "inactive" }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an [`Error::InvalidArgument`] with a formatted message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
