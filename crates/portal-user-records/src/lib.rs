// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application user records.
//!
//! The session service owns identities; this crate owns the application's
//! own record for each of them. [`UserRecordReconciler`] creates a record
//! the first time an email signs in and never touches it again.
//! [`ProfileService`] handles later edits and broadcasts [`ProfileEvent`]s.

pub mod error;
pub mod events;
pub mod profile;
pub mod reconcile;
pub mod record;
pub mod store;
pub mod validation;

pub use error::{ProfileError, ReconcileError, RecordStoreError, Result};
pub use events::{ProfileEvent, ProfileEvents};
pub use profile::ProfileService;
pub use reconcile::{default_record_name, Reconciliation, UserRecordReconciler, FALLBACK_USER_NAME};
pub use record::{NewUserRecord, ProfileUpdate, UserRecord};
pub use store::{MemoryUserRecordStore, UserRecordStore};
pub use validation::{
	validate_email, validate_new_record, validate_update, validate_user_name, ValidationError,
	MAX_USER_NAME_CHARS,
};
