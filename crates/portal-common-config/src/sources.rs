// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::PortalConfigLayer;
use crate::sections::{
	AccountConfigLayer, LoggingConfigLayer, OAuthConfigLayer, StorageConfigLayer,
};

/// Where a source sits in the merge order. Later layers override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// One contributor to the merged [`PortalConfigLayer`].
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<PortalConfigLayer, ConfigError>;
}

/// Contributes nothing; section `finalize` supplies the built-in values.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"built-in"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<PortalConfigLayer, ConfigError> {
		Ok(PortalConfigLayer::default())
	}
}

#[derive(Debug, Clone)]
enum TomlLocation {
	Explicit(PathBuf),
	/// `$XDG_CONFIG_HOME/portal/config.toml`, resolved at load time.
	UserConfigDir,
}

/// A `config.toml`, either at a given path or in the user's config directory.
/// A file that does not exist contributes an empty layer.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
	location: TomlLocation,
}

impl TomlFileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			location: TomlLocation::Explicit(path.into()),
		}
	}

	pub fn user() -> Self {
		Self {
			location: TomlLocation::UserConfigDir,
		}
	}

	/// The file this source reads, if one can be named on this platform.
	pub fn path(&self) -> Option<PathBuf> {
		match &self.location {
			TomlLocation::Explicit(path) => Some(path.clone()),
			TomlLocation::UserConfigDir => {
				dirs::config_dir().map(|dir| dir.join("portal").join("config.toml"))
			}
		}
	}
}

impl ConfigSource for TomlFileSource {
	fn name(&self) -> &'static str {
		match self.location {
			TomlLocation::Explicit(_) => "config-file",
			TomlLocation::UserConfigDir => "user-config-file",
		}
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<PortalConfigLayer, ConfigError> {
		let Some(path) = self.path() else {
			debug!("no config directory on this platform, skipping config file");
			return Ok(PortalConfigLayer::default());
		};
		read_toml_layer(&path)
	}
}

fn read_toml_layer(path: &Path) -> Result<PortalConfigLayer, ConfigError> {
	let content = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
			debug!(path = %path.display(), "config file not found, skipping");
			return Ok(PortalConfigLayer::default());
		}
		Err(source) => {
			return Err(ConfigError::FileRead {
				path: path.to_path_buf(),
				source,
			})
		}
	};

	let layer = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
		path: path.to_path_buf(),
		source,
	})?;
	trace!(path = %path.display(), "parsed config file");
	Ok(layer)
}

/// Environment variable source.
///
/// Convention: PORTAL_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<PortalConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(PortalConfigLayer {
			oauth: Some(load_oauth_from_env()?),
			account: Some(load_account_from_env()),
			storage: Some(load_storage_from_env()),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_oauth_from_env() -> Result<OAuthConfigLayer, ConfigError> {
	Ok(OAuthConfigLayer {
		settle_delay_ms: env_parse("PORTAL_OAUTH_SETTLE_DELAY_MS", "u64")?,
		retry_attempts: env_parse("PORTAL_OAUTH_RETRY_ATTEMPTS", "u32")?,
		retry_delay_ms: env_parse("PORTAL_OAUTH_RETRY_DELAY_MS", "u64")?,
		max_elapsed_ms: env_parse("PORTAL_OAUTH_MAX_ELAPSED_MS", "u64")?,
		state_ttl_secs: env_parse("PORTAL_OAUTH_STATE_TTL_SECS", "u64")?,
		success_path: env_var("PORTAL_OAUTH_SUCCESS_PATH"),
		failure_path: env_var("PORTAL_OAUTH_FAILURE_PATH"),
	})
}

fn load_account_from_env() -> AccountConfigLayer {
	AccountConfigLayer {
		endpoint: env_var("PORTAL_ACCOUNT_ENDPOINT"),
		project_id: env_var("PORTAL_ACCOUNT_PROJECT_ID"),
		database_id: env_var("PORTAL_ACCOUNT_DATABASE_ID"),
		users_collection_id: env_var("PORTAL_ACCOUNT_USERS_COLLECTION_ID"),
	}
}

fn load_storage_from_env() -> StorageConfigLayer {
	StorageConfigLayer {
		tab_storage_path: env_var("PORTAL_STORAGE_TAB_STORAGE_PATH").map(PathBuf::from),
	}
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("PORTAL_LOGGING_FORMAT") {
		Some(v) => Some(v.parse().map_err(|message| ConfigError::InvalidValue {
			key: "PORTAL_LOGGING_FORMAT".to_string(),
			message,
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("PORTAL_LOGGING_LEVEL"),
		format,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn precedence_orders_env_last() {
		let mut order = vec![
			Precedence::Environment,
			Precedence::Defaults,
			Precedence::ConfigFile,
		];
		order.sort();
		assert_eq!(
			order,
			vec![
				Precedence::Defaults,
				Precedence::ConfigFile,
				Precedence::Environment
			]
		);
	}

	#[test]
	fn missing_toml_file_is_empty_layer() {
		let dir = tempfile::tempdir().unwrap();
		let source = TomlFileSource::new(dir.path().join("absent.toml"));
		let layer = source.load().unwrap();
		assert!(layer.oauth.is_none());
	}

	#[test]
	fn toml_file_is_parsed() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		let mut file = std::fs::File::create(&path).unwrap();
		writeln!(file, "[oauth]\nretry_delay_ms = 250").unwrap();

		let layer = TomlFileSource::new(&path).load().unwrap();
		assert_eq!(layer.oauth.unwrap().retry_delay_ms, Some(250));
	}

	#[test]
	fn malformed_toml_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[oauth\nretry").unwrap();

		let err = TomlFileSource::new(&path).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
		assert!(err.to_string().contains("config.toml"));
	}

	#[test]
	fn explicit_source_names_its_path() {
		let source = TomlFileSource::new("/etc/portal/config.toml");
		assert_eq!(source.name(), "config-file");
		assert_eq!(source.path(), Some(PathBuf::from("/etc/portal/config.toml")));
	}

	#[test]
	fn user_source_resolves_under_portal_dir() {
		let source = TomlFileSource::user();
		assert_eq!(source.name(), "user-config-file");
		if let Some(path) = source.path() {
			assert!(path.ends_with("portal/config.toml"));
		}
	}

	#[test]
	fn unreadable_path_is_a_read_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = TomlFileSource::new(dir.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::FileRead { .. }));
	}

	#[test]
	fn env_parse_rejects_garbage() {
		std::env::set_var("PORTAL_TEST_ENV_PARSE_GARBAGE", "three");
		let result: Result<Option<u32>, _> = env_parse("PORTAL_TEST_ENV_PARSE_GARBAGE", "u32");
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
		std::env::remove_var("PORTAL_TEST_ENV_PARSE_GARBAGE");
	}

	#[test]
	fn env_parse_treats_empty_as_unset() {
		std::env::set_var("PORTAL_TEST_ENV_PARSE_EMPTY", "");
		let result: Option<u64> = env_parse("PORTAL_TEST_ENV_PARSE_EMPTY", "u64").unwrap();
		assert_eq!(result, None);
		std::env::remove_var("PORTAL_TEST_ENV_PARSE_EMPTY");
	}
}
