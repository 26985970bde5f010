//! Runtime settings loaded from an optional `tacklebox.toml`.
//!
//! The host process points at a settings file via `TACKLEBOX_CONFIG` (or the
//! default path). A missing file is not an error - every field has a
//! sensible default - but a malformed file is, so typos surface at startup
//! instead of silently running with defaults.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_PATH: &str = "tacklebox.toml";

/// Host-process settings. Business-rule constants (draw quota, attendance
/// roll) are deliberately not configurable here; they are part of the
/// economy's contract.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Overrides `DATABASE_URL` / the built-in default when set.
    pub database_url: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset (e.g. `"info"`).
    pub log_filter: Option<String>,
}

impl Settings {
    /// Loads settings from `TACKLEBOX_CONFIG` or `tacklebox.toml`,
    /// falling back to defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = std::env::var("TACKLEBOX_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Loads settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config {
            message: format!("invalid settings file: {e}"),
        })
    }
}
