// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborators the sign-in flow consumes: the session service and the
//! current page location.

use async_trait::async_trait;
use portal_common_retry::RetryableError;
use url::Url;

use crate::identity::Identity;
use crate::redirect::OAuthProvider;

/// Failures reported by a [`SessionFacade`].
///
/// Display strings are what the error mapper classifies, so network failures
/// say "network" and provider refusals say "cancelled".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
	#[error("no active session")]
	NoSession,

	#[error("network request failed: {0}")]
	Network(String),

	#[error("sign-in cancelled by provider: {0}")]
	Cancelled(String),

	#[error("failed to start oauth redirect: {0}")]
	Redirect(String),

	#[error("session returned an incomplete identity: {0}")]
	InvalidIdentity(String),

	#[error("session service error ({status}): {message}")]
	Service { status: u16, message: String },

	#[error("session service error: {0}")]
	Backend(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl RetryableError for SessionError {
	/// Any failure may clear up once the session has propagated. The last
	/// error still decides the reported code.
	fn is_retryable(&self) -> bool {
		true
	}
}

/// Wraps the identity provider SDK. The flow never speaks the provider
/// protocol itself.
#[async_trait]
pub trait SessionFacade: Send + Sync + std::fmt::Debug {
	/// The identity behind the current session. Fails with
	/// [`SessionError::NoSession`] when there is none.
	async fn current_identity(&self) -> Result<Identity>;

	/// Hand the tab to the provider. Returning `Ok` means navigation has been
	/// started; an `Err` means it never began.
	async fn start_oauth_redirect(
		&self,
		provider: OAuthProvider,
		success_url: &Url,
		failure_url: &Url,
	) -> Result<()>;

	async fn end_session(&self) -> Result<()>;
}

/// The URL the current page was loaded from.
pub trait Location: Send + Sync + std::fmt::Debug {
	fn current_url(&self) -> Url;

	/// `scheme://host[:port]` of the current URL.
	fn origin(&self) -> Url {
		let mut url = self.current_url();
		url.set_path("/");
		url.set_query(None);
		url.set_fragment(None);
		url
	}
}

/// A fixed location, for command-line hosts and tests.
#[derive(Debug, Clone)]
pub struct StaticLocation(Url);

impl StaticLocation {
	pub fn new(url: Url) -> Self {
		Self(url)
	}
}

impl Location for StaticLocation {
	fn current_url(&self) -> Url {
		self.0.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn origin_strips_path_query_and_fragment() {
		let location = StaticLocation::new(
			Url::parse("https://app.example.com:8443/dashboard?userId=1&secret=2#top").unwrap(),
		);
		assert_eq!(location.origin().as_str(), "https://app.example.com:8443/");
	}

	#[test]
	fn every_session_error_is_retryable() {
		assert!(SessionError::NoSession.is_retryable());
		assert!(SessionError::Network("reset".into()).is_retryable());
		assert!(SessionError::Service {
			status: 503,
			message: "unavailable".into()
		}
		.is_retryable());
		assert!(SessionError::Cancelled("access_denied".into()).is_retryable());
		assert!(SessionError::Redirect("blocked".into()).is_retryable());
	}

	#[test]
	fn display_text_feeds_classification() {
		use crate::error::{map_error, OAuthErrorCode};

		assert_eq!(
			map_error(&SessionError::Network("timeout".into())).code,
			OAuthErrorCode::NetworkError
		);
		assert_eq!(
			map_error(&SessionError::Cancelled("access_denied".into())).code,
			OAuthErrorCode::UserCancelled
		);
		assert_eq!(
			map_error(&SessionError::NoSession).code,
			OAuthErrorCode::UnknownError
		);
	}
}
