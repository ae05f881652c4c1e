// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("tab storage I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("tab storage is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("tab storage unavailable: {0}")]
	Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
