// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account service (session + user documents) connection settings.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_USERS_COLLECTION_ID: &str = "users";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountConfigLayer {
	pub endpoint: Option<String>,
	pub project_id: Option<String>,
	pub database_id: Option<String>,
	pub users_collection_id: Option<String>,
}

impl AccountConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.project_id.is_some() {
			self.project_id = other.project_id;
		}
		if other.database_id.is_some() {
			self.database_id = other.database_id;
		}
		if other.users_collection_id.is_some() {
			self.users_collection_id = other.users_collection_id;
		}
	}

	/// Returns `None` when no endpoint is configured.
	pub fn finalize(self) -> Result<Option<AccountConfig>, ConfigError> {
		let Some(endpoint) = self.endpoint else {
			return Ok(None);
		};

		let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidValue {
			key: "account.endpoint".to_string(),
			message: e.to_string(),
		})?;
		if !matches!(endpoint.scheme(), "http" | "https") {
			return Err(ConfigError::InvalidValue {
				key: "account.endpoint".to_string(),
				message: format!("unsupported scheme '{}'", endpoint.scheme()),
			});
		}

		let project_id = self.project_id.ok_or_else(|| {
			ConfigError::Validation("account.project_id is required when account.endpoint is set".to_string())
		})?;
		let database_id = self.database_id.ok_or_else(|| {
			ConfigError::Validation("account.database_id is required when account.endpoint is set".to_string())
		})?;

		Ok(Some(AccountConfig {
			endpoint,
			project_id,
			database_id,
			users_collection_id: self
				.users_collection_id
				.unwrap_or_else(|| DEFAULT_USERS_COLLECTION_ID.to_string()),
		}))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountConfig {
	pub endpoint: Url,
	pub project_id: String,
	pub database_id: String,
	pub users_collection_id: String,
}
