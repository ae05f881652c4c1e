// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use portal_auth_core::{OAuthError, OAuthErrorCode, UserId};
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordStoreError {
	#[error("user record not found: {0}")]
	NotFound(UserId),

	#[error("a user record already exists for {0}")]
	DuplicateEmail(String),

	#[error("a user record already exists with id {0}")]
	DuplicateId(UserId),

	#[error("user record store error: {0}")]
	Backend(String),
}

pub type Result<T> = std::result::Result<T, RecordStoreError>;

/// Why a record could not be ensured for an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
	#[error("failed to look up user record for {email}: {source}")]
	Lookup {
		email: String,
		#[source]
		source: RecordStoreError,
	},

	#[error("failed to create user record for {email}: {source}")]
	Create {
		email: String,
		#[source]
		source: RecordStoreError,
	},
}

impl ReconcileError {
	pub fn to_oauth_error(&self) -> OAuthError {
		OAuthError::new(OAuthErrorCode::UserDocumentFailed, self.to_string())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error(transparent)]
	Store(#[from] RecordStoreError),
}
