// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Thin client for the account service REST API.
//!
//! Covers the handful of endpoints the sign-in flow needs: token sessions,
//! the current account, and documents in the users collection.

use std::sync::Arc;
use std::time::Duration;

use portal_auth_core::{CallbackSecret, OAuthProvider};
use portal_auth_state::TabStorage;
use portal_common_config::AccountConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{api_error, AccountClientError, Result};
use crate::secret::SessionSecret;

/// Tab-storage key holding the current session secret.
pub const SESSION_SECRET_KEY: &str = "portal_session";

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const SESSION_HEADER: &str = "X-Appwrite-Session";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
	#[serde(rename = "$id")]
	pub id: String,
	#[serde(default)]
	pub email: String,
	#[serde(default)]
	pub name: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
	secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenSessionRequest<'a> {
	user_id: &'a str,
	secret: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
	pub total: u64,
	pub documents: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest<'a, T> {
	document_id: &'a str,
	data: &'a T,
}

#[derive(Debug, Serialize)]
struct UpdateDocumentRequest<'a, T> {
	data: &'a T,
}

/// An exact-match query in the service's JSON query syntax.
pub fn equal_query(attribute: &str, value: &str) -> String {
	serde_json::json!({
		"method": "equal",
		"attribute": attribute,
		"values": [value],
	})
	.to_string()
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct AccountClient {
	config: AccountConfig,
	http_client: reqwest::Client,
	storage: Arc<dyn TabStorage>,
}

impl AccountClient {
	#[instrument(skip_all, name = "AccountClient::new")]
	pub fn new(config: AccountConfig, storage: Arc<dyn TabStorage>) -> Result<Self> {
		let http_client = reqwest::Client::builder()
			.user_agent(user_agent())
			.timeout(REQUEST_TIMEOUT)
			.build()?;

		Ok(Self {
			config,
			http_client,
			storage,
		})
	}

	pub fn config(&self) -> &AccountConfig {
		&self.config
	}

	/// `{endpoint}/{segments...}`, keeping any base path on the endpoint.
	pub fn url(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.config.endpoint.clone();
		url.path_segments_mut()
			.map_err(|_| AccountClientError::InvalidEndpoint(self.config.endpoint.to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	fn documents_url(&self, extra: &[&str]) -> Result<Url> {
		let mut segments = vec![
			"databases",
			self.config.database_id.as_str(),
			"collections",
			self.config.users_collection_id.as_str(),
			"documents",
		];
		segments.extend_from_slice(extra);
		self.url(&segments)
	}

	// =========================================================================
	// Session secret
	// =========================================================================

	pub async fn session_secret(&self) -> Result<Option<SessionSecret>> {
		Ok(self
			.storage
			.get_item(SESSION_SECRET_KEY)
			.await?
			.filter(|s| !s.is_empty())
			.map(SessionSecret::new))
	}

	pub async fn clear_session_secret(&self) -> Result<()> {
		self.storage.remove_item(SESSION_SECRET_KEY).await?;
		Ok(())
	}

	async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
		let mut request = self
			.http_client
			.request(method, url)
			.header(PROJECT_HEADER, &self.config.project_id);
		if let Some(secret) = self.session_secret().await? {
			request = request.header(SESSION_HEADER, secret.expose());
		}
		Ok(request)
	}

	async fn check(response: Response) -> Result<Response> {
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		let body = response.text().await.unwrap_or_default();
		Err(api_error(status.as_u16(), &body))
	}

	async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
		let body = Self::check(response).await?.text().await?;
		serde_json::from_str(&body).map_err(|e| AccountClientError::ParseError(e.to_string()))
	}

	// =========================================================================
	// Account
	// =========================================================================

	/// Exchanges callback parameters for a session and stores its secret.
	#[instrument(skip(self, secret), name = "AccountClient::create_token_session")]
	pub async fn create_token_session(&self, user_id: &str, secret: &CallbackSecret) -> Result<SessionSecret> {
		debug!("exchanging callback token for a session");
		let url = self.url(&["account", "sessions", "token"])?;
		let response = self
			.request(Method::POST, url)
			.await?
			.json(&TokenSessionRequest {
				user_id,
				secret: secret.expose(),
			})
			.send()
			.await?;

		let session: SessionResponse = Self::json(response).await?;
		if session.secret.is_empty() {
			return Err(AccountClientError::ParseError(
				"session response carried no secret".to_string(),
			));
		}
		self.storage.set_item(SESSION_SECRET_KEY, &session.secret).await?;
		Ok(SessionSecret::new(session.secret))
	}

	/// The signed-in account, or `None` without a valid session.
	#[instrument(skip(self), name = "AccountClient::get_account")]
	pub async fn get_account(&self) -> Result<Option<AccountResponse>> {
		if self.session_secret().await?.is_none() {
			debug!("no stored session secret");
			return Ok(None);
		}

		let url = self.url(&["account"])?;
		let response = self.request(Method::GET, url).await?.send().await?;
		if response.status() == StatusCode::UNAUTHORIZED {
			debug!("stored session rejected");
			return Ok(None);
		}
		Self::json(response).await.map(Some)
	}

	/// Deletes the current session and forgets its secret. A session the
	/// service no longer knows counts as deleted.
	#[instrument(skip(self), name = "AccountClient::delete_current_session")]
	pub async fn delete_current_session(&self) -> Result<()> {
		if self.session_secret().await?.is_some() {
			let url = self.url(&["account", "sessions", "current"])?;
			let response = self.request(Method::DELETE, url).await?.send().await?;
			if response.status() != StatusCode::UNAUTHORIZED && response.status() != StatusCode::NOT_FOUND {
				Self::check(response).await?;
			}
		}
		self.clear_session_secret().await
	}

	/// Where to send the browser to start a provider sign-in.
	pub fn oauth_url(&self, provider: OAuthProvider, success: &Url, failure: &Url) -> Result<Url> {
		let mut url = self.url(&["account", "tokens", "oauth2", provider.as_str()])?;
		url.query_pairs_mut()
			.append_pair("project", &self.config.project_id)
			.append_pair("success", success.as_str())
			.append_pair("failure", failure.as_str());
		Ok(url)
	}

	// =========================================================================
	// Documents
	// =========================================================================

	#[instrument(skip(self, queries), name = "AccountClient::list_documents")]
	pub async fn list_documents<T: DeserializeOwned>(&self, queries: &[String]) -> Result<DocumentList<T>> {
		let mut url = self.documents_url(&[])?;
		if !queries.is_empty() {
			let mut pairs = url.query_pairs_mut();
			for query in queries {
				pairs.append_pair("queries[]", query);
			}
		}
		let response = self.request(Method::GET, url).await?.send().await?;
		Self::json(response).await
	}

	/// `None` when the document does not exist.
	#[instrument(skip(self), name = "AccountClient::get_document")]
	pub async fn get_document<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
		let url = self.documents_url(&[id])?;
		let response = self.request(Method::GET, url).await?.send().await?;
		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		Self::json(response).await.map(Some)
	}

	#[instrument(skip(self, data), name = "AccountClient::create_document")]
	pub async fn create_document<D: Serialize + Sync, T: DeserializeOwned>(&self, id: &str, data: &D) -> Result<T> {
		let url = self.documents_url(&[])?;
		let response = self
			.request(Method::POST, url)
			.await?
			.json(&CreateDocumentRequest { document_id: id, data })
			.send()
			.await?;
		Self::json(response).await
	}

	#[instrument(skip(self, data), name = "AccountClient::update_document")]
	pub async fn update_document<D: Serialize + Sync, T: DeserializeOwned>(&self, id: &str, data: &D) -> Result<T> {
		let url = self.documents_url(&[id])?;
		let response = self
			.request(Method::PATCH, url)
			.await?
			.json(&UpdateDocumentRequest { data })
			.send()
			.await?;
		Self::json(response).await
	}
}

pub fn user_agent() -> String {
	format!("portal/{}", env!("CARGO_PKG_VERSION"))
}
