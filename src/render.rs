//! Text rendering of both lists.

use std::fmt::Write as _;

use colored::Colorize;

use crate::drag::Markers;
use crate::model::{ListKind, Lists};

/// Splits `"SUBJECT: description"` on the first colon. Without a colon the
/// whole text is the subject.
pub fn split_subject(text: &str) -> (&str, &str) {
	match text.split_once(':') {
		Some((subject, description)) => (subject, description),
		None => (text, ""),
	}
}

pub fn heading(lists: &Lists) -> String {
	format!("todo list ({}/{})", lists.closed_count(), lists.total())
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
	color: bool,
}

impl Renderer {
	pub fn new(color: bool) -> Self {
		Self { color }
	}

	pub fn plain() -> Self {
		Self::new(false)
	}

	pub fn render(&self, lists: &Lists, markers: Markers) -> String {
		let mut out = String::new();
		let title = heading(lists);
		if self.color {
			let _ = writeln!(out, "{}", title.bold().underline());
		} else {
			let _ = writeln!(out, "{title}");
		}
		for list in [ListKind::Open, ListKind::Closed] {
			self.section(&mut out, lists, list, markers);
		}
		out
	}

	fn section(&self, out: &mut String, lists: &Lists, list: ListKind, markers: Markers) {
		let items = lists.get(list);
		let _ = writeln!(out, "\n{list} ({})", items.len());
		if items.is_empty() {
			let _ = writeln!(out, "    (empty)");
			return;
		}
		for (index, item) in items.iter().enumerate() {
			let marker = if markers.is_dragging(list, index) {
				'>'
			} else if markers.is_target(list, index) {
				'*'
			} else {
				' '
			};
			let check = if list == ListKind::Closed { "x" } else { " " };
			let _ = writeln!(out, "  {marker} {:>2}. [{check}] {}", index + 1, self.label(item, list));
		}
	}

	fn label(&self, text: &str, list: ListKind) -> String {
		if !self.color {
			return text.to_string();
		}
		let (subject, description) = split_subject(text);
		let label = if text.contains(':') {
			format!("{}{}", format!("{subject}:").bold(), description)
		} else {
			subject.bold().to_string()
		};
		match list {
			ListKind::Open => label,
			ListKind::Closed => label.dimmed().to_string(),
		}
	}
}
