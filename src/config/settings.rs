//! User settings for walletbook
//!
//! Holds the base currency that reports and currency-less accounts fall back
//! to, the display date format and an optional log filter.

use serde::{Deserialize, Serialize};

use super::paths::WalletPaths;
use crate::error::WalletError;
use crate::models::AssetCode;

/// User settings persisted in `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency that reports are computed in
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// `tracing` filter directive used when `WALLETBOOK_LOG` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    /// Whether `wallet init` has run
    #[serde(default)]
    pub setup_completed: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            base_currency: default_base_currency(),
            date_format: default_date_format(),
            log_filter: None,
            setup_completed: false,
        }
    }
}

impl Settings {
    /// The base currency as a validated asset code
    pub fn base_asset(&self) -> Result<AssetCode, WalletError> {
        AssetCode::new(&self.base_currency).map_err(|e| {
            WalletError::Config(format!(
                "Invalid base currency '{}': {}",
                self.base_currency, e
            ))
        })
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &WalletPaths) -> Result<Self, WalletError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| WalletError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                WalletError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Not persisted until the caller decides to
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &WalletPaths) -> Result<(), WalletError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| WalletError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| WalletError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
