// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration for the portal sign-in stack.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`PORTAL_*`)
//!
//! # Usage
//!
//! ```ignore
//! use portal_common_config::load_config;
//!
//! let config = load_config()?;
//! println!("settle delay: {:?}", config.oauth.settle_delay);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::{ConfigError, Result};
pub use layer::PortalConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlFileSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct PortalConfig {
	pub oauth: OAuthConfig,
	pub account: Option<AccountConfig>,
	pub storage: StorageConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`PORTAL_*`)
/// 2. Config file (`$XDG_CONFIG_HOME/portal/config.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<PortalConfig> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlFileSource::user()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<std::path::PathBuf>) -> Result<PortalConfig> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlFileSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<PortalConfig> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = PortalConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: PortalConfigLayer) -> Result<PortalConfig> {
	let oauth = layer.oauth.unwrap_or_default().finalize();
	let account = layer.account.unwrap_or_default().finalize()?;
	let storage = layer.storage.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&oauth)?;

	info!(
		settle_delay_ms = oauth.settle_delay.as_millis() as u64,
		retry_attempts = oauth.retry_attempts,
		retry_delay_ms = oauth.retry_delay.as_millis() as u64,
		state_ttl_secs = oauth.state_ttl.as_secs(),
		account_configured = account.is_some(),
		tab_storage = %storage.tab_storage_path.display(),
		"Portal configuration loaded"
	);

	Ok(PortalConfig {
		oauth,
		account,
		storage,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(oauth: &OAuthConfig) -> Result<()> {
	if oauth.retry_attempts == 0 {
		return Err(ConfigError::Validation(
			"oauth.retry_attempts must be at least 1".to_string(),
		));
	}

	for (key, path) in [
		("oauth.success_path", &oauth.success_path),
		("oauth.failure_path", &oauth.failure_path),
	] {
		if !path.starts_with('/') {
			return Err(ConfigError::InvalidValue {
				key: key.to_string(),
				message: format!("'{path}' must start with '/'"),
			});
		}
		// `//host` and `/\host` join onto the origin as a different authority.
		if path.starts_with("//") || path.starts_with("/\\") {
			return Err(ConfigError::InvalidValue {
				key: key.to_string(),
				message: format!("'{path}' must be a path on the app origin, not a host"),
			});
		}
	}

	Ok(())
}
