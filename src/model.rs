//! The two task lists and every mutation allowed on them.
//!
//! Items have no identity beyond their position, so all operations address
//! an item by `(ListKind, index)`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
	Open,
	Closed,
}

impl ListKind {
	pub fn other(self) -> Self {
		match self {
			ListKind::Open => ListKind::Closed,
			ListKind::Closed => ListKind::Open,
		}
	}
}

impl fmt::Display for ListKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ListKind::Open => f.write_str("open"),
			ListKind::Closed => f.write_str("closed"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
	#[error("index {index} is out of range for the {list} list ({len} items)")]
	IndexOutOfRange { list: ListKind, index: usize, len: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lists {
	pub open: Vec<String>,
	pub closed: Vec<String>,
}

impl Lists {
	pub fn new(open: Vec<String>, closed: Vec<String>) -> Self {
		Self { open, closed }
	}

	pub fn get(&self, list: ListKind) -> &[String] {
		match list {
			ListKind::Open => &self.open,
			ListKind::Closed => &self.closed,
		}
	}

	fn get_mut(&mut self, list: ListKind) -> &mut Vec<String> {
		match list {
			ListKind::Open => &mut self.open,
			ListKind::Closed => &mut self.closed,
		}
	}

	pub fn item(&self, list: ListKind, index: usize) -> Option<&str> {
		self.get(list).get(index).map(String::as_str)
	}

	pub fn closed_count(&self) -> usize {
		self.closed.len()
	}

	pub fn total(&self) -> usize {
		self.open.len() + self.closed.len()
	}

	fn check(&self, list: ListKind, index: usize) -> Result<(), ListError> {
		let len = self.get(list).len();
		if index < len {
			Ok(())
		} else {
			Err(ListError::IndexOutOfRange { list, index, len })
		}
	}

	/// Moves the item at `index` out of `list` and appends it to the other list.
	pub fn toggle(&mut self, list: ListKind, index: usize) -> Result<(), ListError> {
		self.check(list, index)?;
		let item = self.get_mut(list).remove(index);
		self.get_mut(list.other()).push(item);
		Ok(())
	}

	/// Moves one item within `list`, keeping the relative order of the rest.
	///
	/// Returns `Ok(false)` when `from == to` since there is nothing to move.
	pub fn reorder(&mut self, list: ListKind, from: usize, to: usize) -> Result<bool, ListError> {
		self.check(list, from)?;
		self.check(list, to)?;
		if from == to {
			return Ok(false);
		}
		reorder_items(self.get_mut(list), from, to);
		Ok(true)
	}

	/// Prepends the trimmed text to the open list. Blank input is ignored.
	pub fn add(&mut self, text: &str) -> bool {
		let text = text.trim();
		if text.is_empty() {
			return false;
		}
		self.open.insert(0, text.to_string());
		true
	}

	pub fn clear_all(&mut self) {
		self.open.clear();
		self.closed.clear();
	}

	pub fn clear_completed(&mut self) {
		self.closed.clear();
	}
}

/// Shifts every element strictly between `from` and `to` one slot toward
/// `from`, then drops the moved element into `to`. Indices must be in range.
pub fn reorder_items<T: Clone>(items: &mut [T], from: usize, to: usize) {
	let moved = items[from].clone();
	if from < to {
		for i in from..to {
			items[i] = items[i + 1].clone();
		}
	} else {
		for i in (to + 1..=from).rev() {
			items[i] = items[i - 1].clone();
		}
	}
	items[to] = moved;
}
