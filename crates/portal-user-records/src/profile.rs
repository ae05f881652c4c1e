// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reading and editing the signed-in user's profile.

use std::sync::Arc;

use portal_auth_core::{Identity, UserId};
use tracing::{info, instrument};

use crate::error::{ProfileError, RecordStoreError};
use crate::events::{ProfileEvent, ProfileEvents};
use crate::reconcile::FALLBACK_USER_NAME;
use crate::record::{ProfileUpdate, UserRecord};
use crate::store::UserRecordStore;
use crate::validation::{validate_update, validate_user_name};

#[derive(Debug, Clone)]
pub struct ProfileService {
	store: Arc<dyn UserRecordStore>,
	events: ProfileEvents,
}

impl ProfileService {
	pub fn new(store: Arc<dyn UserRecordStore>, events: ProfileEvents) -> Self {
		Self { store, events }
	}

	pub fn events(&self) -> &ProfileEvents {
		&self.events
	}

	pub async fn get_profile(&self, id: &UserId) -> Result<Option<UserRecord>, ProfileError> {
		Ok(self.store.find_by_id(id).await?)
	}

	/// Validates and trims the name, persists it, then notifies subscribers.
	#[instrument(skip(self, name), fields(user_id = %id), name = "ProfileService::update_display_name")]
	pub async fn update_display_name(&self, id: &UserId, name: &str) -> Result<UserRecord, ProfileError> {
		validate_user_name(name)?;
		self.update_profile(id, ProfileUpdate::name(name.trim())).await
	}

	#[instrument(skip(self, update), fields(user_id = %id), name = "ProfileService::update_profile")]
	pub async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<UserRecord, ProfileError> {
		validate_update(&update)?;
		let update = ProfileUpdate {
			name: update.name.map(|n| n.trim().to_string()),
			email: update.email.map(|e| e.trim().to_lowercase()),
		};

		if update.is_empty() {
			return self
				.store
				.find_by_id(id)
				.await?
				.ok_or_else(|| RecordStoreError::NotFound(id.clone()).into());
		}

		let record = self.store.update(id, update).await?;
		info!("profile updated");
		self.events.publish(ProfileEvent::Updated {
			user_id: record.id.clone(),
			name: record.name.clone(),
		});
		Ok(record)
	}

	/// Record name, then the identity's display name, then [`FALLBACK_USER_NAME`].
	pub async fn display_name(&self, identity: &Identity) -> String {
		let record_name = match self.store.find_by_id(&identity.id).await {
			Ok(Some(record)) if !record.name.trim().is_empty() => Some(record.name),
			_ => None,
		};
		record_name
			.or_else(|| identity.non_empty_display_name().map(str::to_string))
			.unwrap_or_else(|| FALLBACK_USER_NAME.to_string())
	}
}
