//! Run-scoped configuration for the sweep.
//!
//! The daily cap, page size, and inter-update delay are an explicit
//! [`RunConfig`] that gets passed into the scan and update phases, so tests
//! can run with small caps and no delay.

use eyre::Context;
use std::time::Duration;

/// Self-imposed ceiling on privacy updates per run, to stay within remote
/// quota.
pub const DEFAULT_DAILY_LIMIT: usize = 200;

/// Items requested per `playlistItems.list` page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Pause after each successful update.
pub const DEFAULT_UPDATE_DELAY: Duration = Duration::from_millis(100);

/// Hard upper bound imposed by the YouTube list endpoints.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Knobs for one run of the sweep.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of videos collected by the scan and updated per run.
    pub daily_limit: usize,
    /// Page size for playlist enumeration, at most [`MAX_PAGE_SIZE`].
    pub page_size: u32,
    /// Fixed delay inserted after each successful update.
    pub per_update_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            per_update_delay: DEFAULT_UPDATE_DELAY,
        }
    }
}

impl RunConfig {
    /// Builds the run configuration from defaults with environment-variable
    /// overrides: `YT_UNLIST_DAILY_LIMIT`, `YT_UNLIST_PAGE_SIZE`, and
    /// `YT_UNLIST_UPDATE_DELAY_MS`.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Some(limit) = read_env("YT_UNLIST_DAILY_LIMIT")? {
            config.daily_limit = limit;
        }
        if let Some(page_size) = read_env("YT_UNLIST_PAGE_SIZE")? {
            config.page_size = page_size;
        }
        if let Some(delay_ms) = read_env("YT_UNLIST_UPDATE_DELAY_MS")? {
            config.per_update_delay = Duration::from_millis(delay_ms);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.daily_limit == 0 {
            eyre::bail!("daily limit must be at least 1");
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            eyre::bail!(
                "page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE,
                self.page_size
            );
        }
        Ok(())
    }
}

fn read_env<T>(name: &str) -> eyre::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("parse {name}={raw}")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.daily_limit, 200);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn rejects_zero_daily_limit() {
        let config = RunConfig {
            daily_limit: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_pages() {
        let config = RunConfig {
            page_size: 51,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            page_size: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
