//! # cohort-config
//!
//! Layered configuration loading for cohorts using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`COHORTS_*` prefix, `__` as separator)
//! 2. Project-level `.cohorts/config.toml`
//! 3. User-level `~/.config/cohorts/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `COHORTS_ANALYTICS__VIEW_ID` -> `analytics.view_id`,
//! `COHORTS_GENERAL__KEEP_MEMBERS` -> `general.keep_members`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! The loaded [`CohortsConfig`] is passed explicitly to the reporting client;
//! nothing downstream reads the process environment.
//!
//! # Usage
//!
//! ```no_run
//! use cohort_config::CohortsConfig;
//!
//! let config = CohortsConfig::load_with_dotenv().expect("config");
//!
//! if config.analytics.is_configured() {
//!     println!("View: {}", config.analytics.view_id);
//! }
//! ```

mod analytics;
mod error;
mod general;

pub use analytics::{AnalyticsConfig, MAX_PAGE_SIZE};
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local configuration.
pub const PROJECT_DIR: &str = ".cohorts";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "COHORTS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CohortsConfig {
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl CohortsConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration rooted at `project_root` instead of the current directory.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        Self::figment_for(project_root)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for the current directory.
    ///
    /// Public so tests can inspect the figment directly or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain for a specific project root.
    #[must_use]
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// A copy safe to print, with the service-account key path reduced to its file name.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.analytics.service_account_path.is_empty() {
            let file_name = Path::new(&copy.analytics.service_account_path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            copy.analytics.service_account_path = format!("…/{file_name}");
        }
        copy
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cohorts").join("config.toml"))
    }
}
