// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use portal_auth_core::UserId;
use serde::{Deserialize, Serialize};

/// An application-level user, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
	pub id: UserId,
	pub name: String,
	pub email: String,
}

/// Fields for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserRecord {
	pub name: String,
	pub email: String,
}

impl NewUserRecord {
	/// Name trimmed; email trimmed and lowercased.
	pub fn normalized(self) -> Self {
		Self {
			name: self.name.trim().to_string(),
			email: self.email.trim().to_lowercase(),
		}
	}
}

/// A partial update. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

impl ProfileUpdate {
	pub fn name(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			email: None,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.email.is_none()
	}

	pub fn apply_to(&self, record: &mut UserRecord) {
		if let Some(name) = &self.name {
			record.name = name.clone();
		}
		if let Some(email) = &self.email {
			record.email = email.clone();
		}
	}
}
