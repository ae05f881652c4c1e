// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ensures every signed-in identity has exactly one application user record.

use std::sync::Arc;

use portal_auth_core::Identity;
use tracing::{debug, info, instrument, warn};

use crate::error::{ReconcileError, RecordStoreError};
use crate::events::{ProfileEvent, ProfileEvents};
use crate::record::{NewUserRecord, UserRecord};
use crate::store::UserRecordStore;

/// Name used when an identity offers nothing better.
pub const FALLBACK_USER_NAME: &str = "User";

/// Result of [`UserRecordReconciler::ensure_user_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
	/// `false` when a record for the email already existed.
	pub created: bool,
	pub record: UserRecord,
}

/// Display name, then email local part, then [`FALLBACK_USER_NAME`].
pub fn default_record_name(identity: &Identity) -> String {
	identity
		.non_empty_display_name()
		.or_else(|| identity.email_local_part())
		.unwrap_or(FALLBACK_USER_NAME)
		.to_string()
}

#[derive(Debug, Clone)]
pub struct UserRecordReconciler {
	store: Arc<dyn UserRecordStore>,
	events: ProfileEvents,
}

impl UserRecordReconciler {
	pub fn new(store: Arc<dyn UserRecordStore>, events: ProfileEvents) -> Self {
		Self { store, events }
	}

	pub fn store(&self) -> &Arc<dyn UserRecordStore> {
		&self.store
	}

	/// Looks the identity up by email and creates a record only if none exists.
	///
	/// Existing records are returned untouched. Failures are not retried.
	#[instrument(skip(self, identity), fields(user_id = %identity.id), name = "UserRecordReconciler::ensure_user_record")]
	pub async fn ensure_user_record(&self, identity: &Identity) -> Result<Reconciliation, ReconcileError> {
		let email = identity.email.clone();

		let existing = self
			.store
			.find_by_email(&email)
			.await
			.map_err(|source| ReconcileError::Lookup {
				email: email.clone(),
				source,
			})?;

		if let Some(record) = existing {
			debug!(record_id = %record.id, "user record already exists");
			return Ok(Reconciliation {
				created: false,
				record,
			});
		}

		let new_record = NewUserRecord {
			name: default_record_name(identity),
			email: email.clone(),
		};

		match self.store.create(&identity.id, new_record).await {
			Ok(record) => {
				info!(record_id = %record.id, "user record created");
				self.events.publish(ProfileEvent::Created {
					user_id: record.id.clone(),
					email: record.email.clone(),
				});
				Ok(Reconciliation {
					created: true,
					record,
				})
			}
			// Lost a race with a concurrent sign-in for the same email.
			Err(RecordStoreError::DuplicateEmail(_)) => {
				warn!("user record appeared during creation; re-reading");
				let record = self
					.store
					.find_by_email(&email)
					.await
					.map_err(|source| ReconcileError::Lookup {
						email: email.clone(),
						source,
					})?
					.ok_or_else(|| ReconcileError::Create {
						email: email.clone(),
						source: RecordStoreError::DuplicateEmail(email.clone()),
					})?;
				Ok(Reconciliation {
					created: false,
					record,
				})
			}
			Err(source) => Err(ReconcileError::Create { email, source }),
		}
	}
}
