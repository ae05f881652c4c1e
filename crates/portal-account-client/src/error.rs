// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use portal_auth_core::SessionError;
use portal_auth_state::StorageError;
use portal_user_records::RecordStoreError;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum AccountClientError {
	/// Transport failure: connect, timeout or a broken body.
	#[error("HTTP request failed: {0}")]
	HttpRequest(#[from] reqwest::Error),

	/// The service answered with a non-success status.
	#[error("account API error ({status}): {message}")]
	Api { status: u16, message: String },

	#[error("failed to parse response: {0}")]
	ParseError(String),

	#[error("invalid account endpoint: {0}")]
	InvalidEndpoint(String),

	#[error(transparent)]
	Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, AccountClientError>;

impl AccountClientError {
	pub fn status(&self) -> Option<u16> {
		match self {
			AccountClientError::Api { status, .. } => Some(*status),
			AccountClientError::HttpRequest(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}

	fn is_transport(&self) -> bool {
		match self {
			AccountClientError::HttpRequest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
			_ => false,
		}
	}
}

impl From<AccountClientError> for SessionError {
	fn from(err: AccountClientError) -> Self {
		if err.is_transport() {
			return SessionError::Network(err.to_string());
		}
		match err {
			AccountClientError::Api { status: 401, .. } => SessionError::NoSession,
			AccountClientError::Api { status, message } => SessionError::Service { status, message },
			other => SessionError::Backend(other.to_string()),
		}
	}
}

impl From<AccountClientError> for RecordStoreError {
	fn from(err: AccountClientError) -> Self {
		RecordStoreError::Backend(err.to_string())
	}
}

/// Error body returned by the account service.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
	pub message: String,
	#[serde(rename = "type", default)]
	pub kind: Option<String>,
}

/// Prefer the service's own message; fall back to the raw body.
pub(crate) fn api_error(status: u16, body: &str) -> AccountClientError {
	let message = match serde_json::from_str::<ApiErrorBody>(body) {
		Ok(parsed) => match parsed.kind {
			Some(kind) if !kind.is_empty() => format!("{} ({kind})", parsed.message),
			_ => parsed.message,
		},
		Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
		Err(_) => body.trim().to_string(),
	};
	AccountClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unauthorized_means_no_session() {
		let err = AccountClientError::Api {
			status: 401,
			message: "guests cannot access".into(),
		};
		assert_eq!(SessionError::from(err), SessionError::NoSession);
	}

	#[test]
	fn other_statuses_keep_their_code() {
		let err = api_error(503, r#"{"message":"maintenance","code":503,"type":"general_unavailable"}"#);
		assert_eq!(
			SessionError::from(err),
			SessionError::Service {
				status: 503,
				message: "maintenance (general_unavailable)".into()
			}
		);
	}

	#[test]
	fn unparseable_body_is_used_verbatim() {
		let err = api_error(500, "upstream exploded\n");
		assert_eq!(err.to_string(), "account API error (500): upstream exploded");
		assert_eq!(api_error(502, "").to_string(), "account API error (502): HTTP 502");
	}

	#[test]
	fn record_store_errors_are_backend_failures() {
		let err = RecordStoreError::from(AccountClientError::ParseError("bad json".into()));
		assert!(matches!(err, RecordStoreError::Backend(m) if m.contains("bad json")));
	}
}
