//! Directory settings loaded via OrthoConfig.
//!
//! Values come from `DIRECTORY_*` environment variables, configuration files
//! and command-line flags, in OrthoConfig's usual precedence. Absent values
//! fall back to the defaults below.

use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PaginationLimits, PaginationLimitsError};
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

/// Errors raised while turning settings into runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("DIRECTORY_DATABASE_URL is not set")]
    MissingDatabaseUrl,
    /// Page size settings are inconsistent.
    #[error("invalid page size settings: {0}")]
    Pagination(#[from] PaginationLimitsError),
}

/// Configuration for the directory backend and its admin tool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DIRECTORY")]
pub struct DirectorySettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept open.
    pub pool_min_idle: Option<u32>,
    /// Connection checkout timeout in seconds.
    pub pool_connection_timeout_secs: Option<u64>,
    /// Page size applied when a list request gives none.
    #[ortho_config(default = 20)]
    pub default_page_size: i64,
    /// Upper bound on any requested page size.
    #[ortho_config(default = 200)]
    pub max_page_size: i64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_max_size: None,
            pool_min_idle: None,
            pool_connection_timeout_secs: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl DirectorySettings {
    /// Return the configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Return the configured pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(PoolConfig::DEFAULT_MAX_SIZE)
    }

    /// Return the configured idle connection floor, falling back to the
    /// default.
    pub fn pool_min_idle(&self) -> u32 {
        self.pool_min_idle.unwrap_or(PoolConfig::DEFAULT_MIN_IDLE)
    }

    /// Return the checkout timeout, falling back to the default.
    pub fn pool_connection_timeout(&self) -> Duration {
        self.pool_connection_timeout_secs
            .map_or(PoolConfig::DEFAULT_CONNECTION_TIMEOUT, Duration::from_secs)
    }

    /// Build the connection pool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url()
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url)
            .with_max_size(self.pool_max_size())
            .with_min_idle(Some(self.pool_min_idle()))
            .with_connection_timeout(self.pool_connection_timeout()))
    }

    /// Build the pagination limits applied to list requests.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Pagination`] when a size is not positive or
    /// the default exceeds the maximum.
    pub fn pagination_limits(&self) -> Result<PaginationLimits, SettingsError> {
        let limits = PaginationLimits::new(self.default_page_size, self.max_page_size)?;
        Ok(limits)
    }
}
