//! Configuration module for walletbook
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::WalletPaths;
pub use settings::Settings;
