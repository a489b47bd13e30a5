//! Configuration loading and management

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::catalog::Catalog;
use crate::hold::HoldConfig;
use crate::session::{SessionConfig, DEFAULT_CELEBRATION_MS};

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Hold timing and narration settings
    pub session: SessionConfig,

    /// JSON catalog replacing the built-in lesson
    pub catalog_path: Option<PathBuf>,

    /// Drop items harder than this
    pub max_difficulty: Option<u8>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = parse::<u64>(&lookup, "SIGNE_HOLD_MS")? {
            if ms == 0 {
                bail!("SIGNE_HOLD_MS must be greater than zero");
            }
            config.session.hold = HoldConfig {
                hold_duration_ms: ms,
            };
        }

        let celebration_ms =
            parse::<u64>(&lookup, "SIGNE_CELEBRATION_MS")?.unwrap_or(DEFAULT_CELEBRATION_MS);
        if celebration_ms == 0 {
            bail!("SIGNE_CELEBRATION_MS must be greater than zero");
        }
        config.session.celebration = Duration::from_millis(celebration_ms);

        if let Some(language) = lookup("SIGNE_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            config.session.language = language.trim().to_string();
        }

        config.catalog_path = lookup("SIGNE_CATALOG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        config.max_difficulty = parse::<u8>(&lookup, "SIGNE_MAX_DIFFICULTY")?;

        Ok(config)
    }

    /// Build the lesson catalog this configuration describes
    pub fn catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::from_json_file(path)
                .with_context(|| format!("failed to load catalog from {}", path.display()))?,
            None => Catalog::builtin(),
        };

        match self.max_difficulty {
            Some(max) => catalog
                .with_max_difficulty(max)
                .with_context(|| format!("no items with difficulty <= {max}")),
            None => Ok(catalog),
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(None),
    }
}
