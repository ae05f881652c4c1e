// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP implementations of the sign-in collaborators.
//!
//! [`HttpSessionFacade`] and [`HttpUserRecordStore`] share one
//! [`AccountClient`], which keeps the session secret in tab storage so a
//! later process picks up where the callback left off.

pub mod client;
pub mod error;
pub mod records;
pub mod secret;
pub mod session;

pub use client::{equal_query, user_agent, AccountClient, AccountResponse, DocumentList, SESSION_SECRET_KEY};
pub use error::{AccountClientError, Result};
pub use records::HttpUserRecordStore;
pub use secret::SessionSecret;
pub use session::{HttpSessionFacade, Navigator};
