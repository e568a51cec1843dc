//! Path management for walletbook
//!
//! ## Path Resolution Order
//!
//! 1. `WALLETBOOK_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/walletbook` or `~/.config/walletbook`
//! 3. Windows: `%APPDATA%\walletbook`

use std::path::PathBuf;

use crate::error::WalletError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "WALLETBOOK_DATA_DIR";

/// Manages all paths used by walletbook
#[derive(Debug, Clone)]
pub struct WalletPaths {
    base_dir: PathBuf,
}

impl WalletPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, WalletError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create WalletPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Table files live here (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.data_dir().join("accounts.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn tags_file(&self) -> PathBuf {
        self.data_dir().join("tags.json")
    }

    pub fn tag_associations_file(&self) -> PathBuf {
        self.data_dir().join("tag_associations.json")
    }

    pub fn exchange_rates_file(&self) -> PathBuf {
        self.data_dir().join("exchange_rates.json")
    }

    pub fn report_templates_file(&self) -> PathBuf {
        self.data_dir().join("report_templates.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), WalletError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| WalletError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| WalletError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if walletbook has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, WalletError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                WalletError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("walletbook"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, WalletError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| WalletError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("walletbook"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var(DATA_DIR_ENV, custom_path);
        let paths = WalletPaths::new().unwrap();
        env::remove_var(DATA_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().join("wb"));

        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_table_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());
        let data = temp_dir.path().join("data");

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.transactions_file(), data.join("transactions.json"));
        assert_eq!(paths.tag_associations_file(), data.join("tag_associations.json"));
        assert_eq!(paths.report_templates_file(), data.join("report_templates.json"));
    }
}
