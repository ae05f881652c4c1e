// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Detects a page load that is returning from the identity provider.

use std::fmt;

use url::Url;
use zeroize::Zeroize;

/// Query parameter carrying the provider-issued user id.
pub const USER_ID_PARAM: &str = "userId";
/// Query parameter carrying the one-time session secret.
pub const SECRET_PARAM: &str = "secret";

/// One-time secret from the callback URL. Zeroized on drop, never printed.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct CallbackSecret(String);

impl CallbackSecret {
	pub fn new(secret: impl Into<String>) -> Self {
		Self(secret.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for CallbackSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("CallbackSecret([REDACTED])")
	}
}

impl fmt::Display for CallbackSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

/// Both callback parameters, present and non-empty.
#[derive(Debug, Clone)]
pub struct CallbackParams {
	pub user_id: String,
	pub secret: CallbackSecret,
}

impl CallbackParams {
	pub fn from_url(url: &Url) -> Option<Self> {
		let mut user_id = None;
		let mut secret = None;
		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				USER_ID_PARAM if user_id.is_none() => user_id = Some(value.into_owned()),
				SECRET_PARAM if secret.is_none() => secret = Some(CallbackSecret::new(value.into_owned())),
				_ => {}
			}
		}

		let user_id = user_id.filter(|v| !v.is_empty())?;
		let secret = secret.filter(|v| !v.expose().is_empty())?;
		Some(Self { user_id, secret })
	}
}

/// True iff both `userId` and `secret` appear in the query string.
///
/// Presence is enough here; empty values are rejected later by
/// [`CallbackParams::from_url`].
pub fn is_callback(url: &Url) -> bool {
	let mut has_user_id = false;
	let mut has_secret = false;
	for (key, _) in url.query_pairs() {
		match key.as_ref() {
			USER_ID_PARAM => has_user_id = true,
			SECRET_PARAM => has_secret = true,
			_ => {}
		}
	}
	has_user_id && has_secret
}
