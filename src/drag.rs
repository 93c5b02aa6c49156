//! Drag-and-drop gesture tracking for reordering within one list.
//!
//! A gesture is `drag_start` → any number of `drag_over`/`drag_leave` →
//! optional `drop_on` → `drag_end`. Only drops onto the list the gesture
//! started in produce a [`Reorder`].

use tracing::{debug, warn};

use crate::model::{ListKind, Lists};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
	#[default]
	Idle,
	Dragging {
		origin: ListKind,
		index: usize,
		/// Text of the dragged row when the gesture began.
		item: String,
		target: Option<usize>,
	},
}

/// A move the list model should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reorder {
	pub list: ListKind,
	pub from: usize,
	pub to: usize,
}

/// Rows the renderer should highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Markers {
	pub dragging: Option<(ListKind, usize)>,
	pub target: Option<(ListKind, usize)>,
}

impl Markers {
	pub fn is_dragging(&self, list: ListKind, index: usize) -> bool {
		self.dragging == Some((list, index))
	}

	pub fn is_target(&self, list: ListKind, index: usize) -> bool {
		self.target == Some((list, index))
	}
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
	state: DragState,
}

impl DragController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> &DragState {
		&self.state
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.state(), DragState::Dragging { .. })
	}

	/// Returns false if a gesture is already in flight or the row does not exist.
	pub fn drag_start(&mut self, list: ListKind, index: usize, lists: &Lists) -> bool {
		if self.is_dragging() {
			debug!(%list, index, "drag already in progress, ignoring start");
			return false;
		}
		let Some(item) = lists.item(list, index) else {
			warn!(%list, index, "drag started on a missing row");
			return false;
		};
		self.state = DragState::Dragging { origin: list, index, item: item.to_string(), target: None };
		true
	}

	pub fn drag_over(&mut self, list: ListKind, index: usize) {
		if let DragState::Dragging { origin, target, .. } = &mut self.state {
			if *origin == list {
				*target = Some(index);
			}
		}
	}

	pub fn drag_leave(&mut self, list: ListKind, index: usize) {
		if let DragState::Dragging { origin, target, .. } = &mut self.state {
			if *origin == list && *target == Some(index) {
				*target = None;
			}
		}
	}

	/// Finishes the gesture on a row. The controller is idle afterwards no
	/// matter what; `None` means nothing should move.
	pub fn drop_on(&mut self, list: ListKind, index: usize, lists: &Lists) -> Option<Reorder> {
		let DragState::Dragging { origin, index: from, item, .. } = std::mem::take(&mut self.state) else {
			debug!(%list, index, "drop without a drag in progress");
			return None;
		};
		if list != origin {
			debug!(%origin, %list, "cross-list drop ignored");
			return None;
		}
		if index == from {
			return None;
		}
		let len = lists.get(origin).len();
		if index >= len || lists.item(origin, from) != Some(item.as_str()) {
			warn!(%origin, from, to = index, len, "list changed during drag, drop ignored");
			return None;
		}
		Some(Reorder { list: origin, from, to: index })
	}

	pub fn drag_end(&mut self) {
		self.state = DragState::Idle;
	}

	pub fn markers(&self) -> Markers {
		match &self.state {
			DragState::Idle => Markers::default(),
			DragState::Dragging { origin, index, target, .. } => Markers {
				dragging: Some((*origin, *index)),
				target: target.map(|t| (*origin, t)),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Lists {
		Lists::new(
			vec!["A".into(), "B".into(), "C".into(), "D".into()],
			vec!["X".into(), "Y".into()],
		)
	}

	#[test]
	fn start_captures_origin() {
		let lists = sample();
		let mut dnd = DragController::new();
		assert!(dnd.drag_start(ListKind::Open, 2, &lists));
		assert_eq!(
			dnd.state(),
			&DragState::Dragging { origin: ListKind::Open, index: 2, item: "C".into(), target: None }
		);
	}

	#[test]
	fn second_start_is_ignored() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 0, &lists);
		assert!(!dnd.drag_start(ListKind::Closed, 1, &lists));
		assert_eq!(dnd.markers().dragging, Some((ListKind::Open, 0)));
	}

	#[test]
	fn start_on_missing_row_stays_idle() {
		let mut dnd = DragController::new();
		assert!(!dnd.drag_start(ListKind::Closed, 5, &sample()));
		assert_eq!(dnd.state(), &DragState::Idle);
	}

	#[test]
	fn drop_in_same_list_yields_reorder() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 0, &lists);
		dnd.drag_over(ListKind::Open, 2);
		assert_eq!(dnd.markers().target, Some((ListKind::Open, 2)));
		let plan = dnd.drop_on(ListKind::Open, 2, &lists);
		assert_eq!(plan, Some(Reorder { list: ListKind::Open, from: 0, to: 2 }));
		assert!(!dnd.is_dragging());
	}

	#[test]
	fn cross_list_hover_is_not_a_target() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 1, &lists);
		dnd.drag_over(ListKind::Closed, 0);
		assert_eq!(dnd.markers().target, None);
	}

	#[test]
	fn cross_list_drop_is_ignored_and_resets() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 1, &lists);
		assert_eq!(dnd.drop_on(ListKind::Closed, 0, &lists), None);
		assert_eq!(dnd.state(), &DragState::Idle);
	}

	#[test]
	fn drop_on_origin_row_does_nothing() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Closed, 1, &lists);
		assert_eq!(dnd.drop_on(ListKind::Closed, 1, &lists), None);
		assert!(!dnd.is_dragging());
	}

	#[test]
	fn drop_without_start_is_ignored() {
		let mut dnd = DragController::new();
		assert_eq!(dnd.drop_on(ListKind::Open, 1, &sample()), None);
	}

	#[test]
	fn drop_revalidates_after_list_changed() {
		let mut lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 3, &lists);
		lists.toggle(ListKind::Open, 0).unwrap();
		assert_eq!(dnd.drop_on(ListKind::Open, 1, &lists), None);

		let mut lists = sample();
		dnd.drag_start(ListKind::Open, 0, &lists);
		lists.reorder(ListKind::Open, 0, 1).unwrap();
		assert_eq!(dnd.drop_on(ListKind::Open, 2, &lists), None);
	}

	#[test]
	fn drop_target_out_of_range_is_ignored() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 0, &lists);
		assert_eq!(dnd.drop_on(ListKind::Open, 9, &lists), None);
	}

	#[test]
	fn leave_clears_only_matching_target() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 0, &lists);
		dnd.drag_over(ListKind::Open, 2);
		dnd.drag_leave(ListKind::Open, 1);
		assert_eq!(dnd.markers().target, Some((ListKind::Open, 2)));
		dnd.drag_leave(ListKind::Open, 2);
		assert_eq!(dnd.markers().target, None);
	}

	#[test]
	fn end_clears_markers_after_aborted_drag() {
		let lists = sample();
		let mut dnd = DragController::new();
		dnd.drag_start(ListKind::Open, 0, &lists);
		dnd.drag_over(ListKind::Open, 3);
		dnd.drag_end();
		assert_eq!(dnd.markers(), Markers::default());
		assert!(dnd.drag_start(ListKind::Closed, 0, &lists));
	}
}
