// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the portal OAuth sign-in flow.
//!
//! - [`Identity`]: the verified principal, owned by the session service
//! - [`RedirectState`]: the marker that survives the redirect round-trip
//! - [`OAuthError`] and [`map_error`]: the closed error taxonomy
//! - [`is_callback`] and [`CallbackParams`]: callback detection
//! - [`SessionFacade`] and [`Location`]: collaborators the flow consumes

pub mod callback;
pub mod error;
pub mod identity;
pub mod redirect;
pub mod session;

pub use callback::{is_callback, CallbackParams, CallbackSecret, SECRET_PARAM, USER_ID_PARAM};
pub use error::{map_error, map_message, OAuthError, OAuthErrorCode};
pub use identity::{Identity, UserId};
pub use redirect::{OAuthProvider, RedirectState, REDIRECT_STATE_TTL_MINUTES};
pub use session::{Location, SessionError, SessionFacade, StaticLocation};
