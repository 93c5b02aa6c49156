//! Runtime settings resolved from flags, environment and platform defaults.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use crate::storage::{FileStore, KeyValueStore, MemoryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
	Dir(PathBuf),
	/// Nothing survives the process.
	Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub location: StoreLocation,
	pub tick: Duration,
	pub color: bool,
}

impl Settings {
	pub fn resolve(data_dir: Option<PathBuf>, ephemeral: bool, no_color: bool, tick_ms: u64) -> Result<Self> {
		let location = if ephemeral {
			StoreLocation::Memory
		} else {
			let dir = match data_dir {
				Some(dir) => dir,
				None => default_data_dir()?,
			};
			fs::create_dir_all(&dir).with_context(|| format!("create data dir {}", dir.display()))?;
			StoreLocation::Dir(dir)
		};
		let settings = Self { location, tick: Duration::from_millis(tick_ms), color: color_enabled(no_color) };
		debug!(?settings, "resolved settings");
		Ok(settings)
	}

	pub fn open_store(&self) -> Box<dyn KeyValueStore> {
		match &self.location {
			StoreLocation::Dir(dir) => Box::new(FileStore::new(dir)),
			StoreLocation::Memory => Box::new(MemoryStore::new()),
		}
	}
}

pub fn default_data_dir() -> Result<PathBuf> {
	let proj = ProjectDirs::from("dev", "local", "todo_list").context("cannot resolve project dirs")?;
	Ok(proj.data_dir().to_path_buf())
}

fn color_enabled(no_color: bool) -> bool {
	!no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}
