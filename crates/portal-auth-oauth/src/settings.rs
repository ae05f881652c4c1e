// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use portal_common_config::OAuthConfig;
use portal_common_retry::RetryConfig;
use url::Url;

/// Timing and routing parameters for one orchestrator.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
	/// Waited once after a callback is detected, before the first identity lookup.
	pub settle_delay: Duration,
	/// Linear backoff around identity lookups.
	pub retry: RetryConfig,
	pub state_ttl: Duration,
	pub success_path: String,
	pub failure_path: String,
}

impl Default for OAuthSettings {
	fn default() -> Self {
		Self::from(&OAuthConfig::default())
	}
}

impl From<&OAuthConfig> for OAuthSettings {
	fn from(config: &OAuthConfig) -> Self {
		Self {
			settle_delay: config.settle_delay,
			retry: RetryConfig::linear(config.retry_attempts, config.retry_delay)
				.with_max_elapsed(config.max_elapsed),
			state_ttl: config.state_ttl,
			success_path: config.success_path.clone(),
			failure_path: config.failure_path.clone(),
		}
	}
}

impl OAuthSettings {
	pub fn default_success_url(&self, origin: &Url) -> Result<Url, url::ParseError> {
		origin.join(&self.success_path)
	}

	pub fn default_failure_url(&self, origin: &Url) -> Result<Url, url::ParseError> {
		origin.join(&self.failure_path)
	}
}
