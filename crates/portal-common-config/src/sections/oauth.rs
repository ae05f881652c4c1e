// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth flow timing and redirect targets.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 3000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_STATE_TTL_SECS: u64 = 600;
pub const DEFAULT_SUCCESS_PATH: &str = "/dashboard";
pub const DEFAULT_FAILURE_PATH: &str = "/login";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OAuthConfigLayer {
	pub settle_delay_ms: Option<u64>,
	pub retry_attempts: Option<u32>,
	pub retry_delay_ms: Option<u64>,
	pub max_elapsed_ms: Option<u64>,
	pub state_ttl_secs: Option<u64>,
	pub success_path: Option<String>,
	pub failure_path: Option<String>,
}

impl OAuthConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.settle_delay_ms.is_some() {
			self.settle_delay_ms = other.settle_delay_ms;
		}
		if other.retry_attempts.is_some() {
			self.retry_attempts = other.retry_attempts;
		}
		if other.retry_delay_ms.is_some() {
			self.retry_delay_ms = other.retry_delay_ms;
		}
		if other.max_elapsed_ms.is_some() {
			self.max_elapsed_ms = other.max_elapsed_ms;
		}
		if other.state_ttl_secs.is_some() {
			self.state_ttl_secs = other.state_ttl_secs;
		}
		if other.success_path.is_some() {
			self.success_path = other.success_path;
		}
		if other.failure_path.is_some() {
			self.failure_path = other.failure_path;
		}
	}

	pub fn finalize(self) -> OAuthConfig {
		OAuthConfig {
			settle_delay: Duration::from_millis(
				self.settle_delay_ms.unwrap_or(DEFAULT_SETTLE_DELAY_MS),
			),
			retry_attempts: self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
			retry_delay: Duration::from_millis(self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)),
			max_elapsed: self.max_elapsed_ms.map(Duration::from_millis),
			state_ttl: Duration::from_secs(self.state_ttl_secs.unwrap_or(DEFAULT_STATE_TTL_SECS)),
			success_path: self
				.success_path
				.unwrap_or_else(|| DEFAULT_SUCCESS_PATH.to_string()),
			failure_path: self
				.failure_path
				.unwrap_or_else(|| DEFAULT_FAILURE_PATH.to_string()),
		}
	}
}

/// Resolved OAuth flow settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthConfig {
	/// Wait between detecting a callback and the first identity lookup.
	pub settle_delay: Duration,
	pub retry_attempts: u32,
	/// Base delay for linear backoff (`retry_delay * attempt`).
	pub retry_delay: Duration,
	/// Optional wall-clock ceiling on the verification loop.
	pub max_elapsed: Option<Duration>,
	pub state_ttl: Duration,
	pub success_path: String,
	pub failure_path: String,
}

impl Default for OAuthConfig {
	fn default() -> Self {
		OAuthConfigLayer::default().finalize()
	}
}
