//! Persistence of the two lists as independent JSON blobs in a key-value store.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ListKind, Lists};

pub const OPEN_KEY: &str = "openItems";
pub const CLOSED_KEY: &str = "closedItems";

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("failed to access {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to encode {key}: {source}")]
	Encode {
		key: &'static str,
		#[source]
		source: serde_json::Error,
	},
	#[error("invalid storage key {0:?}")]
	InvalidKey(String),
}

/// String blobs addressed by name.
pub trait KeyValueStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		(**self).get(key)
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
		(**self).set(key, value)
	}
}

/// Keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
		if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
			return Err(StorageError::InvalidKey(key.to_string()));
		}
		Ok(self.dir.join(format!("{key}.json")))
	}
}

impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let path = self.path_for(key)?;
		match fs::read_to_string(&path) {
			Ok(s) => Ok(Some(s)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(source) => Err(StorageError::Io { path, source }),
		}
	}

	/// Temp file, fsync, then rename so a crash never leaves half a list behind.
	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
		let path = self.path_for(key)?;
		fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io { path: self.dir.clone(), source })?;
		let tmp = path.with_extension("json.tmp");
		let io_err = |source: io::Error| StorageError::Io { path: tmp.clone(), source };
		let mut f = fs::File::create(&tmp).map_err(io_err)?;
		f.write_all(value.as_bytes()).map_err(io_err)?;
		f.sync_all().map_err(io_err)?;
		fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
	}
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	entries: HashMap<String, String>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.entries.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
		self.entries.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

pub fn default_items(list: ListKind) -> Vec<String> {
	let items: &[&str] = match list {
		ListKind::Open => &["SUBJECT: sample task 1", "SUBJECT: sample task 2", "SUBJECT2: sample task 3"],
		ListKind::Closed => &["SUBJECT: sample completed task 1", "SUBJECT2: sample completed task 2"],
	};
	items.iter().map(|s| s.to_string()).collect()
}

fn key_for(list: ListKind) -> &'static str {
	match list {
		ListKind::Open => OPEN_KEY,
		ListKind::Closed => CLOSED_KEY,
	}
}

/// Loads and saves [`Lists`] through any [`KeyValueStore`].
#[derive(Debug)]
pub struct Storage<S> {
	store: S,
}

impl<S: KeyValueStore> Storage<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// Never fails: each list falls back to its default on its own.
	pub fn load(&self) -> Lists {
		Lists::new(self.load_list(ListKind::Open), self.load_list(ListKind::Closed))
	}

	fn load_list(&self, list: ListKind) -> Vec<String> {
		let key = key_for(list);
		let raw = match self.store.get(key) {
			Ok(Some(raw)) => raw,
			Ok(None) => {
				debug!(key, "no stored list, using defaults");
				return default_items(list);
			}
			Err(e) => {
				warn!(key, error = %e, "cannot read stored list, using defaults");
				return default_items(list);
			}
		};
		match serde_json::from_str::<Vec<String>>(&raw) {
			Ok(items) => items,
			Err(e) => {
				warn!(key, error = %e, "stored list is malformed, using defaults");
				default_items(list)
			}
		}
	}

	pub fn save(&mut self, lists: &Lists) -> Result<(), StorageError> {
		for list in [ListKind::Open, ListKind::Closed] {
			let key = key_for(list);
			let encoded = serde_json::to_string(lists.get(list)).map_err(|source| StorageError::Encode { key, source })?;
			self.store.set(key, &encoded)?;
		}
		debug!(open = lists.open.len(), closed = lists.closed.len(), "saved lists");
		Ok(())
	}
}
