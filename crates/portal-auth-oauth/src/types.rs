// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inputs and outputs of the sign-in flow.

use std::fmt;

use portal_auth_core::{Identity, OAuthError};
use serde::Serialize;
use url::Url;

/// Where the flow currently is. Observable through
/// [`OAuthOrchestrator::subscribe`](crate::OAuthOrchestrator::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
	Idle,
	Initiating,
	Returned,
	Verifying { attempt: u32 },
	Reconciling,
	Done,
	Failed,
}

impl FlowState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, FlowState::Done | FlowState::Failed)
	}
}

impl fmt::Display for FlowState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FlowState::Idle => f.write_str("idle"),
			FlowState::Initiating => f.write_str("initiating"),
			FlowState::Returned => f.write_str("returned"),
			FlowState::Verifying { attempt } => write!(f, "verifying (attempt {attempt})"),
			FlowState::Reconciling => f.write_str("reconciling"),
			FlowState::Done => f.write_str("done"),
			FlowState::Failed => f.write_str("failed"),
		}
	}
}

pub type SuccessHook = Box<dyn Fn(&Identity) + Send + Sync>;
pub type ErrorHook = Box<dyn Fn(&OAuthError) + Send + Sync>;

/// Options for [`OAuthOrchestrator::sign_in`](crate::OAuthOrchestrator::sign_in).
///
/// Unset URLs resolve against the current origin using the configured paths.
#[derive(Default)]
pub struct SignInConfig {
	pub success_url: Option<Url>,
	pub failure_url: Option<Url>,
	pub on_success: Option<SuccessHook>,
	pub on_error: Option<ErrorHook>,
}

impl SignInConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn success_url(mut self, url: Url) -> Self {
		self.success_url = Some(url);
		self
	}

	pub fn failure_url(mut self, url: Url) -> Self {
		self.failure_url = Some(url);
		self
	}

	pub fn on_success(mut self, hook: impl Fn(&Identity) + Send + Sync + 'static) -> Self {
		self.on_success = Some(Box::new(hook));
		self
	}

	pub fn on_error(mut self, hook: impl Fn(&OAuthError) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Box::new(hook));
		self
	}
}

impl fmt::Debug for SignInConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignInConfig")
			.field("success_url", &self.success_url)
			.field("failure_url", &self.failure_url)
			.field("on_success", &self.on_success.is_some())
			.field("on_error", &self.on_error.is_some())
			.finish()
	}
}

/// A verified sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackOutcome {
	pub identity: Identity,
	/// `Some(true)` for a first sign-in, `Some(false)` for a returning user,
	/// `None` if the user record could not be reconciled.
	pub record_created: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignInOutcome {
	/// Navigation was handed to the session service. The flow resumes on the
	/// next page load.
	Redirecting { success_url: Url, failure_url: Url },
	SignedIn(CallbackOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
	pub authenticated: bool,
	pub identity: Option<Identity>,
}

impl SessionStatus {
	pub fn signed_out() -> Self {
		Self {
			authenticated: false,
			identity: None,
		}
	}
}
