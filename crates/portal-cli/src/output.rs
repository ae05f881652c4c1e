// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human and JSON renderings of command results.

use chrono::Utc;
use portal_auth_core::{Identity, OAuthError, OAuthErrorCode, RedirectState};
use portal_auth_oauth::{SessionStatus, SignInOutcome};
use serde::Serialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy)]
pub struct Output {
	pub json: bool,
}

#[derive(Debug, Serialize)]
struct SignInReport<'a> {
	#[serde(flatten)]
	outcome: &'a SignInOutcome,
	#[serde(skip_serializing_if = "Option::is_none")]
	authorize_url: Option<&'a Url>,
}

/// The user-facing half of an [`OAuthError`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport<'a> {
	code: OAuthErrorCode,
	user_message: &'a str,
}

impl<'a> From<&'a OAuthError> for ErrorReport<'a> {
	fn from(err: &'a OAuthError) -> Self {
		Self {
			code: err.code,
			user_message: &err.user_message,
		}
	}
}

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
	#[serde(flatten)]
	status: &'a SessionStatus,
	display_name: Option<&'a str>,
}

impl Output {
	fn print_json<T: Serialize>(&self, value: &T) {
		match serde_json::to_string_pretty(value) {
			Ok(text) => println!("{text}"),
			Err(e) => eprintln!("failed to render output: {e}"),
		}
	}

	pub fn sign_in(&self, outcome: &SignInOutcome, authorize_url: Option<&Url>) {
		if self.json {
			return self.print_json(&SignInReport {
				outcome,
				authorize_url,
			});
		}
		match outcome {
			SignInOutcome::Redirecting { success_url, .. } => {
				if let Some(url) = authorize_url {
					println!("Open this URL in a browser to sign in with Google:\n\n  {url}\n");
				}
				println!("After signing in you will land on {success_url}.");
				println!("Pass that full URL to `portal callback --url <URL>` to finish.");
			}
			SignInOutcome::SignedIn(outcome) => {
				println!("Signed in as {}", describe(&outcome.identity));
				match outcome.record_created {
					Some(true) => println!("Welcome! Your profile has been created."),
					Some(false) => {}
					None => println!("Note: your profile could not be set up yet."),
				}
			}
		}
	}

	pub fn status(&self, status: &SessionStatus, display_name: Option<&str>) {
		if self.json {
			return self.print_json(&StatusReport { status, display_name });
		}
		match (&status.identity, display_name) {
			(Some(identity), Some(name)) => println!("Signed in as {name} <{}>", identity.email),
			(Some(identity), None) => println!("Signed in as {}", describe(identity)),
			(None, _) => println!("Not signed in"),
		}
	}

	pub fn pending(&self, pending: Option<&RedirectState>) {
		if self.json {
			return self.print_json(&pending);
		}
		match pending {
			Some(state) => {
				println!("Pending {} sign-in, started {}", state.provider.as_str(), format_age(state));
				if let Some(url) = &state.redirect_url {
					println!("Returns to {url}");
				}
			}
			None => println!("No sign-in in progress"),
		}
	}

	pub fn flag(&self, value: bool) {
		if self.json {
			self.print_json(&value);
		} else {
			println!("{value}");
		}
	}

	pub fn message(&self, text: &str) {
		if self.json {
			self.print_json(&serde_json::json!({ "message": text }));
		} else {
			println!("{text}");
		}
	}

	pub fn error(&self, err: &OAuthError) {
		debug!(code = %err.code, message = %err.message, "sign-in error detail");
		if self.json {
			self.print_json(&ErrorReport::from(err));
		} else {
			eprintln!("{}", err.user_message);
		}
	}
}

fn format_age(state: &RedirectState) -> String {
	let age = state.age_at(Utc::now());
	match age.num_seconds() {
		s if s < 60 => format!("{}s ago", s.max(0)),
		s if s < 3600 => format!("{}m ago", s / 60),
		s => format!("{}h ago", s / 3600),
	}
}

fn describe(identity: &Identity) -> String {
	match identity.non_empty_display_name() {
		Some(name) => format!("{name} <{}>", identity.email),
		None => identity.email.clone(),
	}
}
