// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User-record storage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use portal_auth_core::UserId;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{RecordStoreError, Result};
use crate::record::{NewUserRecord, ProfileUpdate, UserRecord};

/// The application's own user data store.
#[async_trait]
pub trait UserRecordStore: Send + Sync + std::fmt::Debug {
	/// Exact-match lookup. Absence is `Ok(None)`.
	async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

	async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>>;

	/// Fails with [`RecordStoreError::DuplicateEmail`] if the email is taken.
	async fn create(&self, id: &UserId, record: NewUserRecord) -> Result<UserRecord>;

	async fn update(&self, id: &UserId, update: ProfileUpdate) -> Result<UserRecord>;
}

/// In-memory store that enforces one record per email.
#[derive(Debug, Default)]
pub struct MemoryUserRecordStore {
	records: RwLock<BTreeMap<UserId, UserRecord>>,
}

impl MemoryUserRecordStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.records.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.records.read().await.is_empty()
	}

	pub async fn all(&self) -> Vec<UserRecord> {
		self.records.read().await.values().cloned().collect()
	}
}

#[async_trait]
impl UserRecordStore for MemoryUserRecordStore {
	async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
		let records = self.records.read().await;
		Ok(records.values().find(|r| r.email == email).cloned())
	}

	async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>> {
		Ok(self.records.read().await.get(id).cloned())
	}

	async fn create(&self, id: &UserId, record: NewUserRecord) -> Result<UserRecord> {
		let mut records = self.records.write().await;
		if records.contains_key(id) {
			return Err(RecordStoreError::DuplicateId(id.clone()));
		}
		if records.values().any(|r| r.email == record.email) {
			return Err(RecordStoreError::DuplicateEmail(record.email));
		}

		let created = UserRecord {
			id: id.clone(),
			name: record.name,
			email: record.email,
		};
		records.insert(id.clone(), created.clone());
		debug!(user_id = %id, "user record inserted");
		Ok(created)
	}

	async fn update(&self, id: &UserId, update: ProfileUpdate) -> Result<UserRecord> {
		let mut records = self.records.write().await;

		if let Some(email) = &update.email {
			if records.values().any(|r| &r.email == email && &r.id != id) {
				return Err(RecordStoreError::DuplicateEmail(email.clone()));
			}
		}

		let record = records
			.get_mut(id)
			.ok_or_else(|| RecordStoreError::NotFound(id.clone()))?;
		update.apply_to(record);
		Ok(record.clone())
	}
}
