// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wires configuration into the sign-in components.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use portal_account_client::{AccountClient, HttpSessionFacade, HttpUserRecordStore, Navigator};
use portal_auth_core::{Location, StaticLocation};
use portal_auth_oauth::{OAuthOrchestrator, OAuthSettings};
use portal_auth_state::{FileTabStorage, RedirectStateStore, TabStorage};
use portal_common_config::PortalConfig;
use portal_user_records::{ProfileEvents, ProfileService, UserRecordReconciler, UserRecordStore};
use url::Url;

/// Remembers the last URL it was asked to open; the command prints it.
#[derive(Debug, Default)]
pub struct CapturingNavigator {
	last: Mutex<Option<Url>>,
}

impl CapturingNavigator {
	pub fn take(&self) -> Option<Url> {
		self.last.lock().ok().and_then(|mut last| last.take())
	}
}

impl Navigator for CapturingNavigator {
	fn navigate(&self, url: &Url) -> std::result::Result<(), String> {
		let mut last = self.last.lock().map_err(|e| e.to_string())?;
		*last = Some(url.clone());
		Ok(())
	}
}

pub fn tab_storage(config: &PortalConfig) -> Arc<dyn TabStorage> {
	Arc::new(FileTabStorage::new(config.storage.tab_storage_path.clone()))
}

/// Redirect-state access for commands that never talk to the account service.
pub fn state_store(config: &PortalConfig) -> RedirectStateStore {
	RedirectStateStore::new(tab_storage(config)).with_ttl(config.oauth.state_ttl)
}

pub struct Portal {
	pub orchestrator: OAuthOrchestrator,
	pub profiles: ProfileService,
	pub navigator: Arc<CapturingNavigator>,
}

impl Portal {
	pub fn build(config: &PortalConfig, current_url: Url) -> Result<Self> {
		let account = config
			.account
			.clone()
			.context("account.endpoint is not configured (set PORTAL_ACCOUNT_ENDPOINT or [account] in config.toml)")?;

		let storage = tab_storage(config);
		let client = AccountClient::new(account, storage.clone()).context("failed to build account client")?;

		let location: Arc<dyn Location> = Arc::new(StaticLocation::new(current_url));
		let navigator = Arc::new(CapturingNavigator::default());
		let session = Arc::new(HttpSessionFacade::new(
			client.clone(),
			location.clone(),
			navigator.clone(),
		));

		let records: Arc<dyn UserRecordStore> = Arc::new(HttpUserRecordStore::new(client));
		let events = ProfileEvents::default();

		let orchestrator = OAuthOrchestrator::new(
			session,
			location,
			RedirectStateStore::new(storage),
			UserRecordReconciler::new(records.clone(), events.clone()),
			OAuthSettings::from(&config.oauth),
		);

		Ok(Self {
			orchestrator,
			profiles: ProfileService::new(records, events),
			navigator,
		})
	}
}
