// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod account;
mod logging;
mod oauth;
mod storage;

pub use account::{AccountConfig, AccountConfigLayer, DEFAULT_USERS_COLLECTION_ID};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use oauth::{
	OAuthConfig, OAuthConfigLayer, DEFAULT_FAILURE_PATH, DEFAULT_RETRY_ATTEMPTS,
	DEFAULT_RETRY_DELAY_MS, DEFAULT_SETTLE_DELAY_MS, DEFAULT_STATE_TTL_SECS, DEFAULT_SUCCESS_PATH,
};
pub use storage::{StorageConfig, StorageConfigLayer};
