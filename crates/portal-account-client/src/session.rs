// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! [`SessionFacade`] over the account service.

use std::sync::Arc;

use async_trait::async_trait;
use portal_auth_core::{CallbackParams, Identity, Location, OAuthProvider, SessionError, SessionFacade};
use tracing::{debug, info, instrument};
use url::Url;

use crate::client::{AccountClient, AccountResponse};

/// Sends the user agent somewhere else. A browser host navigates; the
/// command line prints the URL.
pub trait Navigator: Send + Sync + std::fmt::Debug {
	fn navigate(&self, url: &Url) -> Result<(), String>;
}

impl From<AccountResponse> for Identity {
	fn from(account: AccountResponse) -> Self {
		let display_name = Some(account.name).filter(|n| !n.trim().is_empty());
		Identity::new(account.id, account.email, display_name)
	}
}

#[derive(Debug, Clone)]
pub struct HttpSessionFacade {
	client: AccountClient,
	location: Arc<dyn Location>,
	navigator: Arc<dyn Navigator>,
}

impl HttpSessionFacade {
	pub fn new(client: AccountClient, location: Arc<dyn Location>, navigator: Arc<dyn Navigator>) -> Self {
		Self {
			client,
			location,
			navigator,
		}
	}

	pub fn client(&self) -> &AccountClient {
		&self.client
	}
}

#[async_trait]
impl SessionFacade for HttpSessionFacade {
	/// Uses the stored session if it is still valid. On a callback load with
	/// no usable session, exchanges the callback token first.
	#[instrument(skip(self), name = "HttpSessionFacade::current_identity")]
	async fn current_identity(&self) -> portal_auth_core::session::Result<Identity> {
		if let Some(account) = self.client.get_account().await? {
			return Ok(account.into());
		}

		let Some(params) = CallbackParams::from_url(&self.location.current_url()) else {
			return Err(SessionError::NoSession);
		};

		self.client
			.create_token_session(&params.user_id, &params.secret)
			.await?;
		info!(user_id = %params.user_id, "session created from callback token");

		match self.client.get_account().await? {
			Some(account) => Ok(account.into()),
			None => Err(SessionError::NoSession),
		}
	}

	#[instrument(skip(self), name = "HttpSessionFacade::start_oauth_redirect")]
	async fn start_oauth_redirect(
		&self,
		provider: OAuthProvider,
		success_url: &Url,
		failure_url: &Url,
	) -> portal_auth_core::session::Result<()> {
		let url = self
			.client
			.oauth_url(provider, success_url, failure_url)
			.map_err(|e| SessionError::Redirect(e.to_string()))?;
		debug!(provider = provider.as_str(), "handing off to oauth provider");
		self.navigator.navigate(&url).map_err(SessionError::Redirect)
	}

	#[instrument(skip(self), name = "HttpSessionFacade::end_session")]
	async fn end_session(&self) -> portal_auth_core::session::Result<()> {
		self.client.delete_current_session().await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_account_name_is_no_display_name() {
		let identity: Identity = AccountResponse {
			id: "u1".into(),
			email: "a@b.co".into(),
			name: "  ".into(),
		}
		.into();
		assert_eq!(identity.display_name, None);
		assert_eq!(identity.id.as_str(), "u1");
	}
}
