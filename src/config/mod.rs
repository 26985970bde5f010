/// Database configuration and connection management
pub mod database;

/// Runtime settings loaded from `tacklebox.toml`
pub mod settings;
