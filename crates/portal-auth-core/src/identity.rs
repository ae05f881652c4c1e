// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authenticated principal returned by the session service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-issued unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for UserId {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl From<&str> for UserId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// A verified identity. Read-only to the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
	pub id: UserId,
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
}

impl Identity {
	pub fn new(id: impl Into<UserId>, email: impl Into<String>, display_name: Option<String>) -> Self {
		Self {
			id: id.into(),
			email: email.into(),
			display_name,
		}
	}

	/// The part of the email before `@`, if non-empty.
	pub fn email_local_part(&self) -> Option<&str> {
		self.email.split('@').next().filter(|s| !s.is_empty())
	}

	/// Display name with blank values treated as absent.
	pub fn non_empty_display_name(&self) -> Option<&str> {
		self.display_name.as_deref().filter(|s| !s.trim().is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn email_local_part_splits_at_first_at_sign() {
		let identity = Identity::new("u1", "jane.doe@example.com", None);
		assert_eq!(identity.email_local_part(), Some("jane.doe"));
	}

	#[test]
	fn email_local_part_is_none_for_leading_at() {
		let identity = Identity::new("u1", "@example.com", None);
		assert_eq!(identity.email_local_part(), None);
	}

	#[test]
	fn blank_display_name_is_treated_as_absent() {
		let identity = Identity::new("u1", "a@b.co", Some("   ".to_string()));
		assert_eq!(identity.non_empty_display_name(), None);
	}

	#[test]
	fn serializes_with_camel_case_fields() {
		let identity = Identity::new("u1", "a@b.co", Some("Ann".to_string()));
		let json = serde_json::to_value(&identity).unwrap();
		assert_eq!(json["id"], "u1");
		assert_eq!(json["displayName"], "Ann");
	}
}
