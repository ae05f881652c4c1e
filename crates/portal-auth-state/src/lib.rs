// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tab-scoped storage and the redirect-state store.
//!
//! The redirect to the identity provider tears down the running process, so
//! the only continuation that survives is what was written here beforehand.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use portal_auth_core::{OAuthProvider, RedirectState};
//! use portal_auth_state::{MemoryTabStorage, RedirectStateStore};
//!
//! # tokio_test::block_on(async {
//! let store = RedirectStateStore::new(Arc::new(MemoryTabStorage::new()));
//! store
//! 	.save(&RedirectState::new(OAuthProvider::Google, Some("https://app.example.com/".into())))
//! 	.await;
//!
//! let pending = store.load().await.unwrap();
//! assert_eq!(pending.provider, OAuthProvider::Google);
//!
//! store.clear().await;
//! assert!(store.load().await.is_none());
//! # });
//! ```

pub mod error;
pub mod storage;
pub mod store;

pub use error::{Result, StorageError};
pub use storage::{FileTabStorage, MemoryTabStorage, TabStorage};
pub use store::{RedirectStateStore, REDIRECT_STATE_KEY};
