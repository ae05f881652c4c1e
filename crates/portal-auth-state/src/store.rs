// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redirect-state persistence with read-time TTL expiry.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use portal_auth_core::RedirectState;
use tracing::{debug, warn};

use crate::storage::TabStorage;

/// Fixed storage key for the in-flight Google redirect.
pub const REDIRECT_STATE_KEY: &str = "google_oauth_state";

/// Persists at most one [`RedirectState`] per tab.
///
/// The marker is advisory. `save` and `clear` log and swallow backend
/// failures, and `load` treats anything unreadable as absent.
#[derive(Debug, Clone)]
pub struct RedirectStateStore {
	storage: Arc<dyn TabStorage>,
	ttl: Duration,
}

impl RedirectStateStore {
	pub fn new(storage: Arc<dyn TabStorage>) -> Self {
		Self {
			storage,
			ttl: RedirectState::default_ttl(),
		}
	}

	pub fn with_ttl(mut self, ttl: StdDuration) -> Self {
		match Duration::from_std(ttl) {
			Ok(ttl) => self.ttl = ttl,
			Err(e) => warn!(error = %e, "redirect state TTL out of range, keeping default"),
		}
		self
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn storage(&self) -> &Arc<dyn TabStorage> {
		&self.storage
	}

	#[tracing::instrument(skip(self, state), fields(provider = %state.provider), name = "RedirectStateStore::save")]
	pub async fn save(&self, state: &RedirectState) {
		let raw = match serde_json::to_string(state) {
			Ok(raw) => raw,
			Err(e) => {
				warn!(error = %e, "failed to serialize redirect state");
				return;
			}
		};

		match self.storage.set_item(REDIRECT_STATE_KEY, &raw).await {
			Ok(()) => debug!(timestamp = %state.timestamp, "redirect state saved"),
			Err(e) => warn!(error = %e, "failed to save redirect state"),
		}
	}

	/// The stored state, if present, well-formed and not expired.
	pub async fn load(&self) -> Option<RedirectState> {
		self.load_at(Utc::now()).await
	}

	/// [`load`](Self::load) evaluated against an explicit clock.
	#[tracing::instrument(skip(self), name = "RedirectStateStore::load")]
	pub async fn load_at(&self, now: DateTime<Utc>) -> Option<RedirectState> {
		let raw = match self.storage.get_item(REDIRECT_STATE_KEY).await {
			Ok(Some(raw)) => raw,
			Ok(None) => {
				debug!("no redirect state stored");
				return None;
			}
			Err(e) => {
				warn!(error = %e, "failed to read redirect state");
				return None;
			}
		};

		let state: RedirectState = match serde_json::from_str(&raw) {
			Ok(state) => state,
			Err(e) => {
				warn!(error = %e, "stored redirect state is malformed");
				return None;
			}
		};

		if state.is_expired_at(now, self.ttl) {
			debug!(
				age_secs = state.age_at(now).num_seconds(),
				ttl_secs = self.ttl.num_seconds(),
				"redirect state expired, clearing"
			);
			self.clear().await;
			return None;
		}

		Some(state)
	}

	/// Remove the stored state. Idempotent.
	pub async fn clear(&self) {
		match self.storage.remove_item(REDIRECT_STATE_KEY).await {
			Ok(()) => debug!("redirect state cleared"),
			Err(e) => warn!(error = %e, "failed to clear redirect state"),
		}
	}
}
