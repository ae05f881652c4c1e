// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! [`UserRecordStore`] backed by the users collection.

use async_trait::async_trait;
use portal_auth_core::UserId;
use portal_user_records::{NewUserRecord, ProfileUpdate, RecordStoreError, UserRecord, UserRecordStore};
use serde::Deserialize;
use tracing::instrument;

use crate::client::{equal_query, AccountClient};
use crate::error::AccountClientError;

#[derive(Debug, Deserialize)]
struct UserDocument {
	#[serde(rename = "$id")]
	id: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	email: String,
}

impl From<UserDocument> for UserRecord {
	fn from(doc: UserDocument) -> Self {
		UserRecord {
			id: UserId::new(doc.id),
			name: doc.name,
			email: doc.email,
		}
	}
}

#[derive(Debug, Clone)]
pub struct HttpUserRecordStore {
	client: AccountClient,
}

impl HttpUserRecordStore {
	pub fn new(client: AccountClient) -> Self {
		Self { client }
	}
}

#[async_trait]
impl UserRecordStore for HttpUserRecordStore {
	#[instrument(skip(self, email), name = "HttpUserRecordStore::find_by_email")]
	async fn find_by_email(&self, email: &str) -> portal_user_records::Result<Option<UserRecord>> {
		let list = self
			.client
			.list_documents::<UserDocument>(&[equal_query("email", email)])
			.await?;
		Ok(list.documents.into_iter().next().map(UserRecord::from))
	}

	#[instrument(skip(self), name = "HttpUserRecordStore::find_by_id")]
	async fn find_by_id(&self, id: &UserId) -> portal_user_records::Result<Option<UserRecord>> {
		let doc = self.client.get_document::<UserDocument>(id.as_str()).await?;
		Ok(doc.map(UserRecord::from))
	}

	#[instrument(skip(self, record), name = "HttpUserRecordStore::create")]
	async fn create(&self, id: &UserId, record: NewUserRecord) -> portal_user_records::Result<UserRecord> {
		match self
			.client
			.create_document::<_, UserDocument>(id.as_str(), &record)
			.await
		{
			Ok(doc) => Ok(doc.into()),
			Err(AccountClientError::Api { status: 409, .. }) => Err(RecordStoreError::DuplicateEmail(record.email)),
			Err(e) => Err(e.into()),
		}
	}

	#[instrument(skip(self, update), name = "HttpUserRecordStore::update")]
	async fn update(&self, id: &UserId, update: ProfileUpdate) -> portal_user_records::Result<UserRecord> {
		match self
			.client
			.update_document::<_, UserDocument>(id.as_str(), &update)
			.await
		{
			Ok(doc) => Ok(doc.into()),
			Err(AccountClientError::Api { status: 404, .. }) => Err(RecordStoreError::NotFound(id.clone())),
			Err(AccountClientError::Api { status: 409, .. }) => Err(RecordStoreError::DuplicateEmail(
				update.email.unwrap_or_default(),
			)),
			Err(e) => Err(e.into()),
		}
	}
}
