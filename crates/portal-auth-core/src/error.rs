// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User-facing OAuth errors and the mapper that produces them.
//!
//! Every failure that leaves the sign-in flow is an [`OAuthError`]. It carries
//! a closed [`OAuthErrorCode`], an internal `message` for diagnostics, and a
//! `user_message` that is safe to show as-is. [`map_error`] turns any
//! `std::error::Error` into one; it is total and idempotent on values that are
//! already `OAuthError`s.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Codes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OAuthErrorCode {
	/// Starting the redirect to the provider failed.
	#[serde(rename = "oauth.session.creation_failed")]
	SessionCreationFailed,
	/// The verification loop ran out of attempts.
	#[serde(rename = "oauth.callback.timeout")]
	CallbackTimeout,
	/// The application user record could not be ensured. Non-fatal.
	#[serde(rename = "oauth.user_document.failed")]
	UserDocumentFailed,
	/// The callback URL lacked `userId` or `secret`.
	#[serde(rename = "oauth.callback.invalid")]
	InvalidCallback,
	#[serde(rename = "oauth.user_cancelled")]
	UserCancelled,
	#[serde(rename = "oauth.network_error")]
	NetworkError,
	#[serde(rename = "oauth.unknown_error")]
	UnknownError,
}

impl OAuthErrorCode {
	pub const ALL: [OAuthErrorCode; 7] = [
		OAuthErrorCode::SessionCreationFailed,
		OAuthErrorCode::CallbackTimeout,
		OAuthErrorCode::UserDocumentFailed,
		OAuthErrorCode::InvalidCallback,
		OAuthErrorCode::UserCancelled,
		OAuthErrorCode::NetworkError,
		OAuthErrorCode::UnknownError,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			OAuthErrorCode::SessionCreationFailed => "oauth.session.creation_failed",
			OAuthErrorCode::CallbackTimeout => "oauth.callback.timeout",
			OAuthErrorCode::UserDocumentFailed => "oauth.user_document.failed",
			OAuthErrorCode::InvalidCallback => "oauth.callback.invalid",
			OAuthErrorCode::UserCancelled => "oauth.user_cancelled",
			OAuthErrorCode::NetworkError => "oauth.network_error",
			OAuthErrorCode::UnknownError => "oauth.unknown_error",
		}
	}

	pub fn default_user_message(&self) -> &'static str {
		match self {
			OAuthErrorCode::SessionCreationFailed => "Failed to start sign-in. Please try again.",
			OAuthErrorCode::CallbackTimeout => "Authentication failed. Please try again.",
			OAuthErrorCode::UserDocumentFailed => {
				"We couldn't set up your profile. Please try again later."
			}
			OAuthErrorCode::InvalidCallback => "Invalid authentication response. Please try again.",
			OAuthErrorCode::UserCancelled => "Sign in was cancelled. Please try again.",
			OAuthErrorCode::NetworkError => {
				"Network error. Please check your connection and try again."
			}
			OAuthErrorCode::UnknownError => "An unexpected error occurred. Please try again.",
		}
	}
}

impl fmt::Display for OAuthErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// =============================================================================
// Error value
// =============================================================================

/// A classified sign-in failure. `Display` is for logs; show `user_message` to people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct OAuthError {
	pub code: OAuthErrorCode,
	/// Diagnostic detail. Never shown to end users.
	pub message: String,
	pub user_message: String,
}

impl OAuthError {
	/// Build an error with the code's default user message.
	pub fn new(code: OAuthErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			user_message: code.default_user_message().to_string(),
		}
	}

	pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
		self.user_message = user_message.into();
		self
	}

	/// Same diagnostic and user message under a different code.
	pub fn recode(mut self, code: OAuthErrorCode) -> Self {
		self.code = code;
		self
	}

	pub fn invalid_callback() -> Self {
		Self::new(
			OAuthErrorCode::InvalidCallback,
			"Missing userId or secret in callback",
		)
	}
}

// =============================================================================
// Mapping
// =============================================================================

/// Classify any error into an [`OAuthError`].
///
/// An `OAuthError` (at the top of the chain) is returned unchanged. Anything
/// else is classified by its display text.
pub fn map_error(err: &(dyn std::error::Error + 'static)) -> OAuthError {
	if let Some(mapped) = err.downcast_ref::<OAuthError>() {
		return mapped.clone();
	}
	map_message(&err.to_string())
}

/// Classify a bare message: `network`/`fetch` is a network error,
/// `cancelled`/`denied` is a user cancellation, anything else is unknown.
pub fn map_message(message: &str) -> OAuthError {
	let code = if message.contains("network") || message.contains("fetch") {
		OAuthErrorCode::NetworkError
	} else if message.contains("cancelled") || message.contains("denied") {
		OAuthErrorCode::UserCancelled
	} else {
		OAuthErrorCode::UnknownError
	};

	tracing::trace!(code = %code, "classified error message");
	OAuthError::new(code, message)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, thiserror::Error)]
	#[error("{0}")]
	struct RawError(String);

	fn raw(message: &str) -> RawError {
		RawError(message.to_string())
	}

	mod classification {
		use super::*;

		#[test]
		fn network_text_maps_to_network_error() {
			let err = map_error(&raw("network request failed: connection reset"));
			assert_eq!(err.code, OAuthErrorCode::NetworkError);
			assert_eq!(
				err.user_message,
				"Network error. Please check your connection and try again."
			);
		}

		#[test]
		fn fetch_text_maps_to_network_error() {
			assert_eq!(
				map_error(&raw("Failed to fetch")).code,
				OAuthErrorCode::NetworkError
			);
		}

		#[test]
		fn cancelled_text_maps_to_user_cancelled() {
			assert_eq!(
				map_error(&raw("sign-in cancelled by user")).code,
				OAuthErrorCode::UserCancelled
			);
		}

		#[test]
		fn denied_text_maps_to_user_cancelled() {
			assert_eq!(
				map_error(&raw("access_denied")).code,
				OAuthErrorCode::UserCancelled
			);
		}

		#[test]
		fn network_takes_priority_over_cancelled() {
			assert_eq!(
				map_message("network call cancelled").code,
				OAuthErrorCode::NetworkError
			);
		}

		#[test]
		fn matching_is_case_sensitive() {
			assert_eq!(map_message("NETWORK down").code, OAuthErrorCode::UnknownError);
		}

		#[test]
		fn unmatched_text_is_unknown_and_keeps_message() {
			let err = map_error(&raw("quota exceeded"));
			assert_eq!(err.code, OAuthErrorCode::UnknownError);
			assert_eq!(err.message, "quota exceeded");
			assert_eq!(
				err.user_message,
				"An unexpected error occurred. Please try again."
			);
		}
	}

	mod passthrough {
		use super::*;

		#[test]
		fn already_mapped_error_is_returned_unchanged() {
			let original = OAuthError::new(OAuthErrorCode::CallbackTimeout, "network gave up")
				.with_user_message("custom");
			assert_eq!(map_error(&original), original);
		}

		#[test]
		fn mapping_twice_is_stable() {
			let once = map_error(&raw("fetch failed"));
			let twice = map_error(&once);
			assert_eq!(once, twice);
		}
	}

	mod codes {
		use super::*;

		#[test]
		fn wire_strings_match_serde() {
			for code in OAuthErrorCode::ALL {
				let json = serde_json::to_string(&code).unwrap();
				assert_eq!(json, format!("\"{}\"", code.as_str()));
			}
		}

		#[test]
		fn every_code_has_a_user_message() {
			for code in OAuthErrorCode::ALL {
				assert!(!code.default_user_message().is_empty());
			}
		}

		#[test]
		fn error_serializes_with_user_message_field() {
			let err = OAuthError::invalid_callback();
			let json = serde_json::to_value(&err).unwrap();
			assert_eq!(json["code"], "oauth.callback.invalid");
			assert_eq!(json["message"], "Missing userId or secret in callback");
			assert_eq!(
				json["userMessage"],
				"Invalid authentication response. Please try again."
			);
		}

		#[test]
		fn recode_keeps_messages() {
			let err = map_message("fetch failed").recode(OAuthErrorCode::SessionCreationFailed);
			assert_eq!(err.code, OAuthErrorCode::SessionCreationFailed);
			assert_eq!(err.message, "fetch failed");
			assert_eq!(
				err.user_message,
				OAuthErrorCode::NetworkError.default_user_message()
			);
		}
	}
}
