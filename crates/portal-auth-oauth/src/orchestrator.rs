// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The Google sign-in flow.
//!
//! A sign-in spans two page loads. The first saves a [`RedirectState`] and
//! hands the tab to the provider. The second arrives with `userId` and
//! `secret` in the query string, waits for the session to settle, verifies
//! the identity with bounded retries and makes sure a user record exists.
//! Nothing survives between the two except what the redirect-state store
//! persisted.

use std::sync::Arc;

use portal_auth_core::{
	is_callback, map_error, CallbackParams, Identity, Location, OAuthError, OAuthErrorCode, OAuthProvider,
	RedirectState, SessionError, SessionFacade,
};
use portal_auth_state::RedirectStateStore;
use portal_common_retry::retry;
use portal_user_records::UserRecordReconciler;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::settings::OAuthSettings;
use crate::types::{CallbackOutcome, FlowState, SessionStatus, SignInConfig, SignInOutcome};

pub struct OAuthOrchestrator {
	session: Arc<dyn SessionFacade>,
	location: Arc<dyn Location>,
	state_store: RedirectStateStore,
	reconciler: UserRecordReconciler,
	settings: OAuthSettings,
	flow: watch::Sender<FlowState>,
}

impl std::fmt::Debug for OAuthOrchestrator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OAuthOrchestrator")
			.field("session", &self.session)
			.field("location", &self.location)
			.field("state", &*self.flow.borrow())
			.field("settings", &self.settings)
			.finish()
	}
}

impl OAuthOrchestrator {
	pub fn new(
		session: Arc<dyn SessionFacade>,
		location: Arc<dyn Location>,
		state_store: RedirectStateStore,
		reconciler: UserRecordReconciler,
		settings: OAuthSettings,
	) -> Self {
		let state_store = state_store.with_ttl(settings.state_ttl);
		let (flow, _) = watch::channel(FlowState::Idle);
		Self {
			session,
			location,
			state_store,
			reconciler,
			settings,
			flow,
		}
	}

	pub fn settings(&self) -> &OAuthSettings {
		&self.settings
	}

	pub fn state(&self) -> FlowState {
		*self.flow.borrow()
	}

	/// Receives every state transition from now on.
	pub fn subscribe(&self) -> watch::Receiver<FlowState> {
		self.flow.subscribe()
	}

	fn transition(&self, next: FlowState) {
		let previous = self.flow.send_replace(next);
		debug!(from = %previous, to = %next, "oauth flow transition");
	}

	fn fail(&self, err: OAuthError) -> OAuthError {
		self.transition(FlowState::Failed);
		error!(code = %err.code, message = %err.message, "sign-in failed");
		err
	}

	/// True when the current page load is an OAuth callback.
	pub fn is_callback(&self) -> bool {
		is_callback(&self.location.current_url())
	}

	/// Continues a returning callback, or starts a new redirect.
	#[instrument(skip(self, config), name = "OAuthOrchestrator::sign_in")]
	pub async fn sign_in(&self, config: SignInConfig) -> Result<SignInOutcome, OAuthError> {
		let result = if self.is_callback() {
			debug!("callback detected, resuming sign-in");
			self.handle_callback().await.map(SignInOutcome::SignedIn)
		} else {
			self.initiate(&config).await
		};

		match &result {
			Ok(SignInOutcome::SignedIn(outcome)) => {
				if let Some(hook) = &config.on_success {
					hook(&outcome.identity);
				}
			}
			Ok(SignInOutcome::Redirecting { .. }) => {}
			Err(err) => {
				if let Some(hook) = &config.on_error {
					hook(err);
				}
			}
		}
		result
	}

	async fn initiate(&self, config: &SignInConfig) -> Result<SignInOutcome, OAuthError> {
		self.transition(FlowState::Initiating);

		let (success_url, failure_url) = self.redirect_urls(config).map_err(|e| {
			self.fail(map_error(&e).recode(OAuthErrorCode::SessionCreationFailed))
		})?;

		let state = RedirectState::new(OAuthProvider::Google, Some(success_url.to_string()));
		self.state_store.save(&state).await;

		info!(success_url = %success_url, failure_url = %failure_url, "sign-in initiated");

		if let Err(err) = self
			.session
			.start_oauth_redirect(OAuthProvider::Google, &success_url, &failure_url)
			.await
		{
			warn!(error = %err, "oauth redirect did not start");
			self.state_store.clear().await;
			return Err(self.fail(map_error(&err).recode(OAuthErrorCode::SessionCreationFailed)));
		}

		Ok(SignInOutcome::Redirecting {
			success_url,
			failure_url,
		})
	}

	fn redirect_urls(&self, config: &SignInConfig) -> Result<(Url, Url), url::ParseError> {
		let origin = self.location.origin();
		let success_url = match &config.success_url {
			Some(url) => url.clone(),
			None => self.settings.default_success_url(&origin)?,
		};
		let failure_url = match &config.failure_url {
			Some(url) => url.clone(),
			None => self.settings.default_failure_url(&origin)?,
		};
		Ok((success_url, failure_url))
	}

	/// Completes a sign-in on the page load that returns from the provider.
	///
	/// Waits the settle delay once, then retries the identity lookup with
	/// linear backoff. A user record that cannot be reconciled is logged and
	/// reported as `record_created: None`; it does not fail the sign-in.
	#[instrument(skip(self), name = "OAuthOrchestrator::handle_callback")]
	pub async fn handle_callback(&self) -> Result<CallbackOutcome, OAuthError> {
		self.transition(FlowState::Returned);

		let url = self.location.current_url();
		if CallbackParams::from_url(&url).is_none() {
			self.state_store.clear().await;
			return Err(self.fail(OAuthError::invalid_callback()));
		}

		match self.state_store.load().await {
			Some(pending) => debug!(
				provider = pending.provider.as_str(),
				redirect_url = pending.redirect_url.as_deref().unwrap_or(""),
				"resuming pending redirect"
			),
			None => debug!("no pending redirect state"),
		}

		tokio::time::sleep(self.settings.settle_delay).await;

		let this = self;
		let verified = retry(&self.settings.retry, move |attempt| {
			this.transition(FlowState::Verifying { attempt });
			this.verified_identity()
		})
		.await;

		let identity = match verified {
			Ok(identity) => identity,
			Err(last) => {
				self.state_store.clear().await;
				return Err(self.fail(self.exhausted(&last)));
			}
		};

		self.transition(FlowState::Reconciling);
		let record_created = match self.reconciler.ensure_user_record(&identity).await {
			Ok(reconciliation) => Some(reconciliation.created),
			Err(err) => {
				let mapped = err.to_oauth_error();
				warn!(code = %mapped.code, error = %err, "user record reconciliation failed");
				None
			}
		};

		self.state_store.clear().await;
		self.transition(FlowState::Done);
		info!(user_id = %identity.id, ?record_created, "sign-in completed");

		Ok(CallbackOutcome {
			identity,
			record_created,
		})
	}

	async fn verified_identity(&self) -> Result<Identity, SessionError> {
		let identity = self.session.current_identity().await?;
		if identity.email.trim().is_empty() {
			return Err(SessionError::InvalidIdentity(format!(
				"identity {} has no email",
				identity.id
			)));
		}
		Ok(identity)
	}

	/// Network and cancellation failures keep their code; anything else is a
	/// callback timeout.
	fn exhausted(&self, last: &SessionError) -> OAuthError {
		let mapped = map_error(last);
		match mapped.code {
			OAuthErrorCode::NetworkError | OAuthErrorCode::UserCancelled => mapped,
			_ => OAuthError::new(
				OAuthErrorCode::CallbackTimeout,
				format!("session not available after verification: {}", mapped.message),
			),
		}
	}

	/// Ends the session and forgets any pending redirect.
	#[instrument(skip(self), name = "OAuthOrchestrator::sign_out")]
	pub async fn sign_out(&self) -> Result<(), OAuthError> {
		let ended = self.session.end_session().await;
		self.state_store.clear().await;
		self.transition(FlowState::Idle);

		match ended {
			Ok(()) => {
				info!("signed out");
				Ok(())
			}
			Err(err) => {
				warn!(error = %err, "sign-out failed");
				Err(map_error(&err))
			}
		}
	}

	/// A single identity lookup. Any failure reads as signed out.
	#[instrument(skip(self), name = "OAuthOrchestrator::session_status")]
	pub async fn session_status(&self) -> SessionStatus {
		match self.session.current_identity().await {
			Ok(identity) => SessionStatus {
				authenticated: true,
				identity: Some(identity),
			},
			Err(SessionError::NoSession) => SessionStatus::signed_out(),
			Err(err) => {
				debug!(error = %err, "session lookup failed");
				SessionStatus::signed_out()
			}
		}
	}

	pub async fn pending_redirect(&self) -> Option<RedirectState> {
		self.state_store.load().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use portal_auth_state::{MemoryTabStorage, TabStorage, REDIRECT_STATE_KEY};
	use portal_auth_core::StaticLocation;
	use portal_user_records::{MemoryUserRecordStore, ProfileEvents, UserRecordStore};
	use std::collections::VecDeque;
	use std::sync::Mutex;
	use std::time::Duration;
	use tokio::time::Instant;

	const ORIGIN: &str = "https://app.example.com/";
	const CALLBACK: &str = "https://app.example.com/dashboard?userId=u1&secret=s3cr3t";

	/// Replays scripted identity results and records every call.
	#[derive(Debug, Default)]
	struct ScriptedSession {
		identities: Mutex<VecDeque<Result<Identity, SessionError>>>,
		identity_calls: Mutex<Vec<Instant>>,
		redirects: Mutex<Vec<(Url, Url)>>,
		redirect_error: Option<SessionError>,
		end_session_error: Option<SessionError>,
		ended: Mutex<u32>,
	}

	impl ScriptedSession {
		fn with_identities(results: Vec<Result<Identity, SessionError>>) -> Self {
			Self {
				identities: Mutex::new(results.into()),
				..Default::default()
			}
		}

		fn identity_calls(&self) -> Vec<Instant> {
			self.identity_calls.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl SessionFacade for ScriptedSession {
		async fn current_identity(&self) -> portal_auth_core::session::Result<Identity> {
			self.identity_calls.lock().unwrap().push(Instant::now());
			self.identities
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or(Err(SessionError::NoSession))
		}

		async fn start_oauth_redirect(
			&self,
			_provider: OAuthProvider,
			success_url: &Url,
			failure_url: &Url,
		) -> portal_auth_core::session::Result<()> {
			if let Some(err) = &self.redirect_error {
				return Err(err.clone());
			}
			self.redirects
				.lock()
				.unwrap()
				.push((success_url.clone(), failure_url.clone()));
			Ok(())
		}

		async fn end_session(&self) -> portal_auth_core::session::Result<()> {
			*self.ended.lock().unwrap() += 1;
			match &self.end_session_error {
				Some(err) => Err(err.clone()),
				None => Ok(()),
			}
		}
	}

	struct Harness {
		session: Arc<ScriptedSession>,
		storage: Arc<MemoryTabStorage>,
		records: Arc<MemoryUserRecordStore>,
		orchestrator: OAuthOrchestrator,
	}

	fn harness(session: ScriptedSession, url: &str) -> Harness {
		harness_with_records(session, url, Arc::new(MemoryUserRecordStore::new()))
	}

	fn harness_with_records(session: ScriptedSession, url: &str, records: Arc<MemoryUserRecordStore>) -> Harness {
		let session = Arc::new(session);
		let storage = Arc::new(MemoryTabStorage::new());
		let orchestrator = OAuthOrchestrator::new(
			session.clone(),
			Arc::new(StaticLocation::new(Url::parse(url).unwrap())),
			RedirectStateStore::new(storage.clone()),
			UserRecordReconciler::new(records.clone(), ProfileEvents::default()),
			OAuthSettings::default(),
		);
		Harness {
			session,
			storage,
			records,
			orchestrator,
		}
	}

	fn ann() -> Identity {
		Identity::new("u1", "ann@example.com", Some("Ann".into()))
	}

	async fn seed_state(storage: &MemoryTabStorage) {
		let state = RedirectState::new(OAuthProvider::Google, Some(format!("{ORIGIN}dashboard")));
		storage
			.set_item(REDIRECT_STATE_KEY, &serde_json::to_string(&state).unwrap())
			.await
			.unwrap();
	}

	mod initiation {
		use super::*;

		#[tokio::test]
		async fn fresh_load_is_not_a_callback() {
			let h = harness(ScriptedSession::default(), ORIGIN);
			assert!(!h.orchestrator.is_callback());
		}

		#[tokio::test]
		async fn saves_state_and_redirects_to_default_urls() {
			let h = harness(ScriptedSession::default(), "https://app.example.com/login?next=1");

			let outcome = h.orchestrator.sign_in(SignInConfig::new()).await.unwrap();

			let success = Url::parse("https://app.example.com/dashboard").unwrap();
			let failure = Url::parse("https://app.example.com/login").unwrap();
			assert_eq!(
				outcome,
				SignInOutcome::Redirecting {
					success_url: success.clone(),
					failure_url: failure.clone(),
				}
			);
			assert_eq!(*h.session.redirects.lock().unwrap(), vec![(success, failure)]);

			let raw = h.storage.get_item(REDIRECT_STATE_KEY).await.unwrap().unwrap();
			let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
			assert_eq!(json["provider"], "google");
			assert_eq!(json["redirectUrl"], "https://app.example.com/dashboard");
			assert!(json["timestamp"].is_i64());
			assert_eq!(h.orchestrator.state(), FlowState::Initiating);
		}

		#[tokio::test]
		async fn caller_urls_override_defaults() {
			let h = harness(ScriptedSession::default(), ORIGIN);
			let success = Url::parse("https://app.example.com/welcome").unwrap();
			let failure = Url::parse("https://app.example.com/oops").unwrap();

			h.orchestrator
				.sign_in(
					SignInConfig::new()
						.success_url(success.clone())
						.failure_url(failure.clone()),
				)
				.await
				.unwrap();

			assert_eq!(*h.session.redirects.lock().unwrap(), vec![(success.clone(), failure)]);
			let pending = h.orchestrator.pending_redirect().await.unwrap();
			assert_eq!(pending.redirect_url.as_deref(), Some(success.as_str()));
		}

		#[tokio::test]
		async fn redirect_failure_clears_state_and_reports_session_creation_failure() {
			let session = ScriptedSession {
				redirect_error: Some(SessionError::Network("connection refused".into())),
				..Default::default()
			};
			let h = harness(session, ORIGIN);
			let seen = Arc::new(Mutex::new(None));
			let seen_in_hook = seen.clone();

			let err = h
				.orchestrator
				.sign_in(SignInConfig::new().on_error(move |e| {
					*seen_in_hook.lock().unwrap() = Some(e.code);
				}))
				.await
				.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::SessionCreationFailed);
			assert!(err.message.contains("connection refused"));
			assert!(!err.user_message.is_empty());
			assert_eq!(*seen.lock().unwrap(), Some(OAuthErrorCode::SessionCreationFailed));
			assert!(h.storage.get_item(REDIRECT_STATE_KEY).await.unwrap().is_none());
			assert_eq!(h.orchestrator.state(), FlowState::Failed);
		}

		#[tokio::test]
		async fn second_sign_in_overwrites_state() {
			let h = harness(ScriptedSession::default(), ORIGIN);
			h.orchestrator
				.sign_in(SignInConfig::new().success_url(Url::parse("https://app.example.com/a").unwrap()))
				.await
				.unwrap();
			h.orchestrator
				.sign_in(SignInConfig::new().success_url(Url::parse("https://app.example.com/b").unwrap()))
				.await
				.unwrap();

			let pending = h.orchestrator.pending_redirect().await.unwrap();
			assert_eq!(pending.redirect_url.as_deref(), Some("https://app.example.com/b"));
		}
	}

	mod callback {
		use super::*;

		#[tokio::test(start_paused = true)]
		async fn first_attempt_succeeds_after_settle_delay() {
			let h = harness(ScriptedSession::with_identities(vec![Ok(ann())]), CALLBACK);
			seed_state(&h.storage).await;
			let started = Instant::now();

			let outcome = h.orchestrator.handle_callback().await.unwrap();

			assert_eq!(outcome.identity, ann());
			assert_eq!(outcome.record_created, Some(true));
			let calls = h.session.identity_calls();
			assert_eq!(calls.len(), 1);
			assert_eq!(calls[0] - started, Duration::from_millis(3000));
			assert_eq!(h.records.len().await, 1);
			assert!(h.storage.get_item(REDIRECT_STATE_KEY).await.unwrap().is_none());
			assert_eq!(h.orchestrator.state(), FlowState::Done);
		}

		#[tokio::test(start_paused = true)]
		async fn missing_secret_fails_without_querying_session() {
			let h = harness(
				ScriptedSession::with_identities(vec![Ok(ann())]),
				"https://app.example.com/dashboard?userId=u1",
			);
			seed_state(&h.storage).await;

			let err = h.orchestrator.handle_callback().await.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::InvalidCallback);
			assert_eq!(err.user_message, "Invalid authentication response. Please try again.");
			assert!(h.session.identity_calls().is_empty());
			assert!(h.storage.get_item(REDIRECT_STATE_KEY).await.unwrap().is_none());
		}

		#[tokio::test(start_paused = true)]
		async fn empty_parameter_values_are_invalid() {
			let h = harness(
				ScriptedSession::default(),
				"https://app.example.com/dashboard?userId=&secret=x",
			);
			let err = h.orchestrator.handle_callback().await.unwrap_err();
			assert_eq!(err.code, OAuthErrorCode::InvalidCallback);
			assert!(h.session.identity_calls().is_empty());
		}

		#[tokio::test(start_paused = true)]
		async fn exhaustion_makes_three_attempts_with_growing_delays() {
			let h = harness(ScriptedSession::default(), CALLBACK);
			seed_state(&h.storage).await;
			let started = Instant::now();

			let err = h.orchestrator.handle_callback().await.unwrap_err();

			let calls = h.session.identity_calls();
			assert_eq!(calls.len(), 3);
			assert_eq!(calls[0] - started, Duration::from_millis(3000));
			let first_gap = calls[1] - calls[0];
			let second_gap = calls[2] - calls[1];
			assert_eq!(first_gap, Duration::from_millis(1000));
			assert_eq!(second_gap, Duration::from_millis(2000));
			assert!(second_gap > first_gap);

			assert_eq!(err.code, OAuthErrorCode::CallbackTimeout);
			assert_eq!(err.user_message, "Authentication failed. Please try again.");
			assert_eq!(h.orchestrator.state(), FlowState::Failed);
			assert_eq!(h.records.len().await, 0);
			assert!(h.storage.get_item(REDIRECT_STATE_KEY).await.unwrap().is_none());
		}

		#[tokio::test(start_paused = true)]
		async fn exhaustion_keeps_network_classification() {
			let session = ScriptedSession::with_identities(vec![
				Err(SessionError::NoSession),
				Err(SessionError::NoSession),
				Err(SessionError::Network("connection reset".into())),
			]);
			let h = harness(session, CALLBACK);

			let err = h.orchestrator.handle_callback().await.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::NetworkError);
			assert_eq!(h.session.identity_calls().len(), 3);
		}

		#[tokio::test(start_paused = true)]
		async fn cancellation_is_retried_and_reported_last() {
			let cancelled = || Err(SessionError::Cancelled("access_denied".into()));
			let session = ScriptedSession::with_identities(vec![cancelled(), cancelled(), cancelled()]);
			let h = harness(session, CALLBACK);
			seed_state(&h.storage).await;

			let err = h.orchestrator.handle_callback().await.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::UserCancelled);
			assert_eq!(h.session.identity_calls().len(), 3);
			assert!(h.storage.get_item(REDIRECT_STATE_KEY).await.unwrap().is_none());
		}

		#[tokio::test(start_paused = true)]
		async fn cancellation_then_success_signs_in() {
			let session = ScriptedSession::with_identities(vec![
				Err(SessionError::Cancelled("access_denied".into())),
				Ok(ann()),
			]);
			let h = harness(session, CALLBACK);

			let outcome = h.orchestrator.handle_callback().await.unwrap();

			assert_eq!(outcome.identity.email, "ann@example.com");
			assert_eq!(h.session.identity_calls().len(), 2);
		}

		#[tokio::test(start_paused = true)]
		async fn identity_without_email_is_retried() {
			let session = ScriptedSession::with_identities(vec![
				Ok(Identity::new("u1", "", None)),
				Ok(ann()),
			]);
			let h = harness(session, CALLBACK);

			let outcome = h.orchestrator.handle_callback().await.unwrap();

			assert_eq!(outcome.identity.email, "ann@example.com");
			assert_eq!(h.session.identity_calls().len(), 2);
		}

		#[tokio::test(start_paused = true)]
		async fn succeeds_on_last_attempt() {
			let session = ScriptedSession::with_identities(vec![
				Err(SessionError::NoSession),
				Err(SessionError::NoSession),
				Ok(ann()),
			]);
			let h = harness(session, CALLBACK);

			let outcome = h.orchestrator.handle_callback().await.unwrap();
			assert_eq!(outcome.record_created, Some(true));
		}

		#[tokio::test(start_paused = true)]
		async fn returning_user_is_not_recreated() {
			let records = Arc::new(MemoryUserRecordStore::new());
			let first = harness_with_records(
				ScriptedSession::with_identities(vec![Ok(ann())]),
				CALLBACK,
				records.clone(),
			);
			let second = harness_with_records(
				ScriptedSession::with_identities(vec![Ok(ann())]),
				CALLBACK,
				records.clone(),
			);

			let a = first.orchestrator.handle_callback().await.unwrap();
			let b = second.orchestrator.handle_callback().await.unwrap();

			assert_eq!(a.record_created, Some(true));
			assert_eq!(b.record_created, Some(false));
			assert_eq!(records.len().await, 1);
		}

		#[tokio::test(start_paused = true)]
		async fn reconciliation_failure_does_not_fail_sign_in() {
			#[derive(Debug)]
			struct DownStore;

			#[async_trait]
			impl UserRecordStore for DownStore {
				async fn find_by_email(
					&self,
					_email: &str,
				) -> portal_user_records::Result<Option<portal_user_records::UserRecord>> {
					Err(portal_user_records::RecordStoreError::Backend("unavailable".into()))
				}

				async fn find_by_id(
					&self,
					_id: &portal_auth_core::UserId,
				) -> portal_user_records::Result<Option<portal_user_records::UserRecord>> {
					Ok(None)
				}

				async fn create(
					&self,
					_id: &portal_auth_core::UserId,
					_record: portal_user_records::NewUserRecord,
				) -> portal_user_records::Result<portal_user_records::UserRecord> {
					Err(portal_user_records::RecordStoreError::Backend("unavailable".into()))
				}

				async fn update(
					&self,
					_id: &portal_auth_core::UserId,
					_update: portal_user_records::ProfileUpdate,
				) -> portal_user_records::Result<portal_user_records::UserRecord> {
					Err(portal_user_records::RecordStoreError::Backend("unavailable".into()))
				}
			}

			let session = Arc::new(ScriptedSession::with_identities(vec![Ok(ann())]));
			let storage = Arc::new(MemoryTabStorage::new());
			seed_state(&storage).await;
			let orchestrator = OAuthOrchestrator::new(
				session,
				Arc::new(StaticLocation::new(Url::parse(CALLBACK).unwrap())),
				RedirectStateStore::new(storage.clone()),
				UserRecordReconciler::new(Arc::new(DownStore), ProfileEvents::default()),
				OAuthSettings::default(),
			);

			let outcome = orchestrator.handle_callback().await.unwrap();

			assert_eq!(outcome.identity, ann());
			assert_eq!(outcome.record_created, None);
			assert!(storage.get_item(REDIRECT_STATE_KEY).await.unwrap().is_none());
		}

		#[tokio::test(start_paused = true)]
		async fn wall_clock_ceiling_stops_early() {
			let session = Arc::new(ScriptedSession::default());
			let mut settings = OAuthSettings::default();
			settings.retry = settings.retry.with_max_elapsed(Some(Duration::from_millis(1500)));
			let orchestrator = OAuthOrchestrator::new(
				session.clone(),
				Arc::new(StaticLocation::new(Url::parse(CALLBACK).unwrap())),
				RedirectStateStore::new(Arc::new(MemoryTabStorage::new())),
				UserRecordReconciler::new(Arc::new(MemoryUserRecordStore::new()), ProfileEvents::default()),
				settings,
			);

			let err = orchestrator.handle_callback().await.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::CallbackTimeout);
			assert_eq!(session.identity_calls().len(), 2);
		}

		#[tokio::test(start_paused = true)]
		async fn transitions_are_observable() {
			let h = harness(ScriptedSession::with_identities(vec![Err(SessionError::NoSession), Ok(ann())]), CALLBACK);
			let mut rx = h.orchestrator.subscribe();
			let mut seen = Vec::new();

			let observer = async {
				while rx.changed().await.is_ok() {
					let state = *rx.borrow_and_update();
					seen.push(state);
					if state.is_terminal() {
						break;
					}
				}
			};
			let (result, ()) = tokio::join!(h.orchestrator.handle_callback(), observer);

			assert!(result.is_ok());
			assert_eq!(seen.first(), Some(&FlowState::Returned));
			assert!(seen.contains(&FlowState::Verifying { attempt: 1 }));
			assert_eq!(seen.last(), Some(&FlowState::Done));
		}
	}

	mod sign_in_entry {
		use super::*;

		#[tokio::test(start_paused = true)]
		async fn callback_load_takes_callback_path_and_fires_success_hook() {
			let h = harness(ScriptedSession::with_identities(vec![Ok(ann())]), CALLBACK);
			let seen = Arc::new(Mutex::new(None));
			let seen_in_hook = seen.clone();

			let outcome = h
				.orchestrator
				.sign_in(SignInConfig::new().on_success(move |identity| {
					*seen_in_hook.lock().unwrap() = Some(identity.email.clone());
				}))
				.await
				.unwrap();

			assert!(matches!(outcome, SignInOutcome::SignedIn(_)));
			assert!(h.session.redirects.lock().unwrap().is_empty());
			assert_eq!(seen.lock().unwrap().as_deref(), Some("ann@example.com"));
		}

		#[tokio::test(start_paused = true)]
		async fn callback_failure_fires_error_hook() {
			let h = harness(ScriptedSession::default(), CALLBACK);
			let calls = Arc::new(Mutex::new(0));
			let calls_in_hook = calls.clone();

			let err = h
				.orchestrator
				.sign_in(SignInConfig::new().on_error(move |_| {
					*calls_in_hook.lock().unwrap() += 1;
				}))
				.await
				.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::CallbackTimeout);
			assert_eq!(*calls.lock().unwrap(), 1);
		}
	}

	mod session {
		use super::*;

		#[tokio::test]
		async fn sign_out_ends_session_and_clears_state() {
			let h = harness(ScriptedSession::default(), ORIGIN);
			seed_state(&h.storage).await;

			h.orchestrator.sign_out().await.unwrap();

			assert_eq!(*h.session.ended.lock().unwrap(), 1);
			assert!(h.orchestrator.pending_redirect().await.is_none());
			assert_eq!(h.orchestrator.state(), FlowState::Idle);
		}

		#[tokio::test]
		async fn sign_out_failure_is_mapped() {
			let session = ScriptedSession {
				end_session_error: Some(SessionError::Network("offline".into())),
				..Default::default()
			};
			let h = harness(session, ORIGIN);
			seed_state(&h.storage).await;

			let err = h.orchestrator.sign_out().await.unwrap_err();

			assert_eq!(err.code, OAuthErrorCode::NetworkError);
			assert!(h.orchestrator.pending_redirect().await.is_none());
		}

		#[tokio::test]
		async fn status_reports_identity() {
			let h = harness(ScriptedSession::with_identities(vec![Ok(ann())]), ORIGIN);
			let status = h.orchestrator.session_status().await;
			assert!(status.authenticated);
			assert_eq!(status.identity, Some(ann()));
		}

		#[tokio::test]
		async fn status_is_single_shot() {
			let h = harness(
				ScriptedSession::with_identities(vec![Err(SessionError::Network("down".into())), Ok(ann())]),
				ORIGIN,
			);
			assert_eq!(h.orchestrator.session_status().await, SessionStatus::signed_out());
			assert_eq!(h.session.identity_calls().len(), 1);
		}
	}
}
