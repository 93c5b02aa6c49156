//! Input dispatcher: every user action becomes a [`Msg`], and every list
//! mutation is followed by a save and a redraw, in that order.
//!
//! A caller handling one user input may dispatch several messages (a whole
//! drag gesture, say) and then call [`App::flush`] once; the view is redrawn
//! only if something visible changed.

use std::io::Write;

use tracing::{debug, warn};

use crate::drag::DragController;
use crate::model::{ListKind, Lists};
use crate::render::Renderer;
use crate::stopwatch::Stopwatch;
use crate::storage::{KeyValueStore, Storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchAction {
	Start,
	Stop,
	Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
	Add(String),
	Toggle { list: ListKind, index: usize },
	ClearCompleted,
	ClearAll,
	DragStart { list: ListKind, index: usize },
	DragOver { list: ListKind, index: usize },
	DragLeave { list: ListKind, index: usize },
	Drop { list: ListKind, index: usize },
	DragEnd,
	Stopwatch(StopwatchAction),
}

/// The messages of a complete drag of row `from` onto row `to` of `list`.
pub fn move_gesture(list: ListKind, from: usize, to: usize) -> [Msg; 4] {
	[
		Msg::DragStart { list, index: from },
		Msg::DragOver { list, index: to },
		Msg::Drop { list, index: to },
		Msg::DragEnd,
	]
}

/// What a dispatched message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// Lists changed; saved and redrawn.
	Changed,
	/// Only drag markers changed; redrawn.
	Redrawn,
	Ignored,
	Stopwatch,
}

pub struct App<S, W> {
	lists: Lists,
	storage: Storage<S>,
	drag: DragController,
	stopwatch: Stopwatch,
	renderer: Renderer,
	out: W,
	dirty: bool,
}

impl<S: KeyValueStore, W: Write> App<S, W> {
	pub fn new(storage: Storage<S>, stopwatch: Stopwatch, renderer: Renderer, out: W) -> Self {
		let lists = storage.load();
		debug!(open = lists.open.len(), closed = lists.closed.len(), "loaded lists");
		Self { lists, storage, drag: DragController::new(), stopwatch, renderer, out, dirty: false }
	}

	pub fn lists(&self) -> &Lists {
		&self.lists
	}

	pub fn stopwatch(&self) -> &Stopwatch {
		&self.stopwatch
	}

	pub fn dispatch(&mut self, msg: Msg) -> Outcome {
		debug!(?msg, "dispatch");
		let outcome = self.apply(msg);
		match outcome {
			Outcome::Changed => {
				self.persist();
				self.dirty = true;
			}
			Outcome::Redrawn => self.dirty = true,
			Outcome::Ignored | Outcome::Stopwatch => {}
		}
		outcome
	}

	fn apply(&mut self, msg: Msg) -> Outcome {
		match msg {
			Msg::Add(text) => {
				if self.lists.add(&text) {
					Outcome::Changed
				} else {
					debug!("blank item ignored");
					Outcome::Ignored
				}
			}
			Msg::Toggle { list, index } => match self.lists.toggle(list, index) {
				Ok(()) => Outcome::Changed,
				Err(e) => {
					warn!(error = %e, "toggle ignored");
					Outcome::Ignored
				}
			},
			Msg::ClearCompleted => {
				self.lists.clear_completed();
				Outcome::Changed
			}
			Msg::ClearAll => {
				self.lists.clear_all();
				Outcome::Changed
			}
			Msg::DragStart { list, index } => {
				if self.drag.drag_start(list, index, &self.lists) {
					Outcome::Redrawn
				} else {
					Outcome::Ignored
				}
			}
			Msg::DragOver { list, index } => {
				self.drag.drag_over(list, index);
				Outcome::Redrawn
			}
			Msg::DragLeave { list, index } => {
				self.drag.drag_leave(list, index);
				Outcome::Redrawn
			}
			Msg::Drop { list, index } => {
				let Some(plan) = self.drag.drop_on(list, index, &self.lists) else {
					return Outcome::Ignored;
				};
				match self.lists.reorder(plan.list, plan.from, plan.to) {
					Ok(true) => Outcome::Changed,
					Ok(false) => Outcome::Ignored,
					Err(e) => {
						warn!(error = %e, "reorder ignored");
						Outcome::Ignored
					}
				}
			}
			Msg::DragEnd => {
				let was_dragging = self.drag.is_dragging();
				self.drag.drag_end();
				if was_dragging {
					Outcome::Redrawn
				} else {
					Outcome::Ignored
				}
			}
			Msg::Stopwatch(action) => {
				match action {
					StopwatchAction::Start => self.stopwatch.start(),
					StopwatchAction::Stop => self.stopwatch.stop(),
					StopwatchAction::Reset => self.stopwatch.reset(),
				}
				Outcome::Stopwatch
			}
		}
	}

	/// Best effort: the in-memory lists stay authoritative when saving fails.
	fn persist(&mut self) {
		if let Err(e) = self.storage.save(&self.lists) {
			warn!(error = %e, "could not save lists");
		}
	}

	pub fn view(&self) -> String {
		self.renderer.render(&self.lists, self.drag.markers())
	}

	/// Redraws if anything dispatched since the last flush changed the view.
	pub fn flush(&mut self) {
		if self.dirty {
			self.render();
		}
	}

	pub fn render(&mut self) {
		self.dirty = false;
		let view = self.view();
		if let Err(e) = self.out.write_all(view.as_bytes()).and_then(|_| self.out.flush()) {
			warn!(error = %e, "could not write list view");
		}
	}
}

#[cfg(test)]
impl<S, W> App<S, W> {
	pub(crate) fn output(&self) -> &W {
		&self.out
	}
}
