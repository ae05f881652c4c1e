// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where tab-scoped state is persisted between process runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const TAB_STORAGE_FILE: &str = "tab-storage.json";

fn default_tab_storage_path() -> PathBuf {
	dirs::state_dir()
		.or_else(dirs::data_local_dir)
		.unwrap_or_else(std::env::temp_dir)
		.join("portal")
		.join(TAB_STORAGE_FILE)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfigLayer {
	pub tab_storage_path: Option<PathBuf>,
}

impl StorageConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.tab_storage_path.is_some() {
			self.tab_storage_path = other.tab_storage_path;
		}
	}

	pub fn finalize(self) -> StorageConfig {
		StorageConfig {
			tab_storage_path: self
				.tab_storage_path
				.unwrap_or_else(default_tab_storage_path),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
	pub tab_storage_path: PathBuf,
}

impl Default for StorageConfig {
	fn default() -> Self {
		StorageConfigLayer::default().finalize()
	}
}
