// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The marker persisted before navigating to the identity provider.
//!
//! A redirect hands control of the tab to the provider, so nothing held in
//! memory survives it. [`RedirectState`] is written to tab-scoped storage just
//! before the redirect and read back when the provider sends the user home.
//! It is advisory: an expired or missing marker does not block a callback.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of a redirect marker before it is considered stale.
pub const REDIRECT_STATE_TTL_MINUTES: i64 = 10;

/// Identity providers the flow can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
	Google,
}

impl OAuthProvider {
	pub fn as_str(&self) -> &'static str {
		match self {
			OAuthProvider::Google => "google",
		}
	}
}

impl fmt::Display for OAuthProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An in-flight OAuth attempt.
///
/// Serialized as `{"provider":"google","timestamp":<epoch ms>,"redirectUrl":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectState {
	pub provider: OAuthProvider,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub timestamp: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect_url: Option<String>,
}

impl RedirectState {
	pub fn new(provider: OAuthProvider, redirect_url: Option<String>) -> Self {
		Self::at(provider, Utc::now(), redirect_url)
	}

	pub fn at(provider: OAuthProvider, timestamp: DateTime<Utc>, redirect_url: Option<String>) -> Self {
		Self {
			provider,
			timestamp,
			redirect_url,
		}
	}

	pub fn default_ttl() -> Duration {
		Duration::minutes(REDIRECT_STATE_TTL_MINUTES)
	}

	/// Stale once strictly more than `ttl` has passed since `timestamp`.
	pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
		now - self.timestamp > ttl
	}

	pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
		now - self.timestamp
	}
}
