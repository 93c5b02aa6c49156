//! Interactive session: one command per line, the stopwatch in the prompt.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::app::{move_gesture, App, Msg, StopwatchAction};
use crate::model::ListKind;
use crate::stopwatch::format_elapsed;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListArg {
	Open,
	Closed,
}

impl From<ListArg> for ListKind {
	fn from(value: ListArg) -> Self {
		match value {
			ListArg::Open => ListKind::Open,
			ListArg::Closed => ListKind::Closed,
		}
	}
}

/// Parser for the 1-based row numbers shown in the list view.
pub fn row_id() -> RangedU64ValueParser<usize> {
	RangedU64ValueParser::<usize>::new().range(1..)
}

pub fn to_index(id: usize) -> usize {
	id.saturating_sub(1)
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
	#[command(subcommand)]
	cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show both lists
	#[command(alias = "ls")]
	List,
	/// Add a task to the top of the open list
	Add {
		#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
		text: Vec<String>,
	},
	/// Check an open task
	Done {
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Uncheck a closed task
	Undo {
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Drag row FROM onto row TO in one go
	Move {
		#[arg(value_parser = row_id())]
		from: usize,
		#[arg(value_parser = row_id())]
		to: usize,
		/// Reorder the closed list instead of the open one
		#[arg(long)]
		closed: bool,
	},
	/// Pick up a row
	Grab {
		list: ListArg,
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Hover the dragged row over another row
	Over {
		list: ListArg,
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Stop hovering a row
	Leave {
		list: ListArg,
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Drop the dragged row onto a row
	Drop {
		list: ListArg,
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Let go of the dragged row
	Release,
	/// Remove every closed task
	ClearCompleted,
	/// Remove every task
	ClearAll,
	/// Start the stopwatch
	Start,
	/// Stop the stopwatch
	Stop,
	/// Zero the stopwatch
	Reset,
	/// Print the stopwatch
	Time,
	/// Leave the session
	#[command(alias = "exit")]
	Quit,
}

enum Flow {
	Continue,
	Quit,
}

/// Reads commands from `input` until EOF or `quit`. List views go through
/// the app's own writer; prompts and replies go to `term`.
pub fn run<S, W, R, T>(app: &mut App<S, W>, input: R, mut term: T) -> Result<()>
where
	S: KeyValueStore,
	W: Write,
	R: BufRead,
	T: Write,
{
	app.render();
	let mut lines = input.lines();
	loop {
		write!(term, "[{}] todo> ", app.stopwatch().display())?;
		term.flush()?;
		let Some(line) = lines.next() else {
			writeln!(term)?;
			break;
		};
		let line = line.context("read command")?;
		let words: Vec<&str> = line.split_whitespace().collect();
		if words.is_empty() {
			continue;
		}
		match Line::try_parse_from(words) {
			Ok(parsed) => {
				debug!(cmd = ?parsed.cmd, "shell command");
				if let Flow::Quit = step(app, parsed.cmd, &mut term)? {
					break;
				}
			}
			Err(e) => write!(term, "{e}")?,
		}
		app.flush();
	}
	Ok(())
}

fn step<S: KeyValueStore, W: Write, T: Write>(app: &mut App<S, W>, cmd: Command, term: &mut T) -> Result<Flow> {
	let msgs: Vec<Msg> = match cmd {
		Command::List => {
			app.render();
			vec![]
		}
		Command::Add { text } => vec![Msg::Add(text.join(" "))],
		Command::Done { id } => vec![Msg::Toggle { list: ListKind::Open, index: to_index(id) }],
		Command::Undo { id } => vec![Msg::Toggle { list: ListKind::Closed, index: to_index(id) }],
		Command::Move { from, to, closed } => {
			let list = if closed { ListKind::Closed } else { ListKind::Open };
			move_gesture(list, to_index(from), to_index(to)).to_vec()
		}
		Command::Grab { list, id } => vec![Msg::DragStart { list: list.into(), index: to_index(id) }],
		Command::Over { list, id } => vec![Msg::DragOver { list: list.into(), index: to_index(id) }],
		Command::Leave { list, id } => vec![Msg::DragLeave { list: list.into(), index: to_index(id) }],
		Command::Drop { list, id } => vec![Msg::Drop { list: list.into(), index: to_index(id) }, Msg::DragEnd],
		Command::Release => vec![Msg::DragEnd],
		Command::ClearCompleted => vec![Msg::ClearCompleted],
		Command::ClearAll => vec![Msg::ClearAll],
		Command::Start => vec![Msg::Stopwatch(StopwatchAction::Start)],
		Command::Stop => vec![Msg::Stopwatch(StopwatchAction::Stop)],
		Command::Reset => vec![Msg::Stopwatch(StopwatchAction::Reset)],
		Command::Time => {
			writeln!(term, "{}", format_elapsed(app.stopwatch().elapsed()))?;
			vec![]
		}
		Command::Quit => return Ok(Flow::Quit),
	};
	for msg in msgs {
		app.dispatch(msg);
	}
	Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use std::time::Duration;

	use super::*;
	use crate::render::Renderer;
	use crate::stopwatch::tests::ManualClock;
	use crate::stopwatch::Stopwatch;
	use crate::storage::{MemoryStore, Storage};

	fn session(script: &str) -> (App<MemoryStore, Vec<u8>>, String) {
		let clock = ManualClock::new();
		let sw = Stopwatch::new(clock, Duration::from_millis(1));
		let mut store = MemoryStore::new();
		store.set("openItems", r#"["A","B","C","D"]"#).unwrap();
		store.set("closedItems", "[]").unwrap();
		let mut app = App::new(Storage::new(store), sw, Renderer::plain(), Vec::new());
		let mut term = Vec::new();
		run(&mut app, Cursor::new(script.to_string()), &mut term).unwrap();
		(app, String::from_utf8(term).unwrap())
	}

	#[test]
	fn add_and_done_use_one_based_rows() {
		let (app, _) = session("add  WORK:  write  report \ndone 2\n");
		assert_eq!(app.lists().open, vec!["WORK: write report", "B", "C", "D"]);
		assert_eq!(app.lists().closed, vec!["A"]);
	}

	#[test]
	fn undo_moves_back_to_open() {
		let (app, _) = session("done 1\nundo 1\n");
		assert_eq!(app.lists().open, vec!["B", "C", "D", "A"]);
		assert!(app.lists().closed.is_empty());
	}

	#[test]
	fn move_reorders_through_a_drag() {
		let (app, _) = session("move 1 3\n");
		assert_eq!(app.lists().open, vec!["B", "C", "A", "D"]);
	}

	#[test]
	fn step_by_step_drag() {
		let (app, _) = session("grab open 4\nover open 1\ndrop open 1\n");
		assert_eq!(app.lists().open, vec!["D", "A", "B", "C"]);
	}

	#[test]
	fn cross_list_drop_is_ignored() {
		let (app, _) = session("done 4\ngrab open 1\ndrop closed 1\n");
		assert_eq!(app.lists().open, vec!["A", "B", "C"]);
		assert_eq!(app.lists().closed, vec!["D"]);
	}

	#[test]
	fn released_drag_does_not_move() {
		let (app, _) = session("grab open 1\nover open 3\nrelease\ndrop open 3\n");
		assert_eq!(app.lists().open, vec!["A", "B", "C", "D"]);
	}

	#[test]
	fn out_of_range_row_is_harmless() {
		let (app, _) = session("done 9\nmove 1 9\n");
		assert_eq!(app.lists().open, vec!["A", "B", "C", "D"]);
	}

	#[test]
	fn bad_input_reports_and_continues() {
		let (app, term) = session("done zero\nfrobnicate\nadd ok\n");
		assert!(term.contains("error"));
		assert_eq!(app.lists().open[0], "ok");
	}

	#[test]
	fn row_zero_is_rejected() {
		let (app, term) = session("done 0\n");
		assert!(term.contains("error"));
		assert!(app.lists().closed.is_empty());
	}

	#[test]
	fn quit_stops_reading() {
		let (app, _) = session("clear-completed\nquit\nclear-all\n");
		assert_eq!(app.lists().total(), 4);
	}

	#[test]
	fn prompt_and_time_show_stopwatch() {
		let (app, term) = session("start\nstop\ntime\nreset\n");
		assert!(term.starts_with("[00:00:00.000] todo> "));
		assert!(term.contains("00:00:00.000\n"));
		assert!(!app.stopwatch().is_running());
	}

	#[test]
	fn every_change_is_drawn_once() {
		let (app, _) = session("add x\nmove 1 2\nstart\n");
		let views = String::from_utf8(app.output().clone()).unwrap();
		assert_eq!(views.matches("todo list (").count(), 3);
	}
}
