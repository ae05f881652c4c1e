// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tab-scoped key/value storage backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;

/// String key/value storage scoped to one browser tab (or one CLI profile).
#[async_trait]
pub trait TabStorage: Send + Sync + std::fmt::Debug {
	async fn get_item(&self, key: &str) -> Result<Option<String>>;

	/// Overwrites any existing value.
	async fn set_item(&self, key: &str, value: &str) -> Result<()>;

	/// Removing an absent key is not an error.
	async fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory storage. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryTabStorage {
	items: RwLock<HashMap<String, String>>,
}

impl MemoryTabStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl TabStorage for MemoryTabStorage {
	async fn get_item(&self, key: &str) -> Result<Option<String>> {
		Ok(self.items.read().await.get(key).cloned())
	}

	async fn set_item(&self, key: &str, value: &str) -> Result<()> {
		self.items
			.write()
			.await
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	async fn remove_item(&self, key: &str) -> Result<()> {
		self.items.write().await.remove(key);
		Ok(())
	}
}

/// Storage persisted as a single JSON object on disk.
///
/// Writes go to a temp file that is renamed into place, with 0600
/// permissions on Unix, so a crash never leaves a half-written file.
#[derive(Debug, Clone)]
pub struct FileTabStorage {
	path: PathBuf,
}

impl FileTabStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	async fn read_all(&self) -> Result<HashMap<String, String>> {
		if !fs::try_exists(&self.path).await? {
			return Ok(HashMap::new());
		}

		let contents = fs::read_to_string(&self.path).await?;
		if contents.trim().is_empty() {
			return Ok(HashMap::new());
		}
		Ok(serde_json::from_str(&contents)?)
	}

	async fn write_all(&self, items: &HashMap<String, String>) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}

		let contents = serde_json::to_string_pretty(items)?;

		let temp_path = self.path.with_extension("tmp");
		let mut file = fs::File::create(&temp_path).await?;
		file.write_all(contents.as_bytes()).await?;
		file.sync_all().await?;
		drop(file);

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let perms = std::fs::Permissions::from_mode(0o600);
			if let Err(e) = fs::set_permissions(&temp_path, perms).await {
				warn!(path = ?temp_path, error = %e, "failed to restrict tab storage permissions");
			}
		}

		fs::rename(&temp_path, &self.path).await?;
		debug!(path = ?self.path, keys = items.len(), "tab storage written");
		Ok(())
	}
}

#[async_trait]
impl TabStorage for FileTabStorage {
	async fn get_item(&self, key: &str) -> Result<Option<String>> {
		Ok(self.read_all().await?.remove(key))
	}

	async fn set_item(&self, key: &str, value: &str) -> Result<()> {
		let mut items = self.read_all().await?;
		items.insert(key.to_string(), value.to_string());
		self.write_all(&items).await
	}

	async fn remove_item(&self, key: &str) -> Result<()> {
		let mut items = self.read_all().await?;
		if items.remove(key).is_none() {
			return Ok(());
		}
		self.write_all(&items).await
	}
}
