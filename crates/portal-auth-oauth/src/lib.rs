// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google sign-in orchestration.
//!
//! [`OAuthOrchestrator`] ties together the session service, the
//! redirect-state store and the user-record reconciler. UI code calls
//! [`OAuthOrchestrator::sign_in`] on every load of the sign-in page; the
//! orchestrator decides whether to start a redirect or finish a callback.
//!
//! ```text
//! Idle -> Initiating -> (redirect) -> Returned -> Verifying -> Reconciling -> Done
//!                                                                         \-> Failed
//! ```

pub mod orchestrator;
pub mod settings;
pub mod types;

pub use orchestrator::OAuthOrchestrator;
pub use settings::OAuthSettings;
pub use types::{CallbackOutcome, ErrorHook, FlowState, SessionStatus, SignInConfig, SignInOutcome, SuccessHook};
