mod app;
mod config;
mod drag;
mod model;
mod render;
mod shell;
mod stopwatch;
mod storage;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::{move_gesture, App, Msg};
use crate::config::Settings;
use crate::model::ListKind;
use crate::render::Renderer;
use crate::shell::{row_id, to_index};
use crate::stopwatch::{Stopwatch, SystemClock, DEFAULT_TICK};
use crate::storage::{KeyValueStore, Storage};

#[derive(Parser)]
#[command(
	name = "todo",
	version,
	about = "Two-list todo CLI with a stopwatch",
	long_about = "A small terminal todo list: open tasks and closed tasks, kept as JSON in your data directory.\n\nFeatures:\n- Add tasks as \"SUBJECT: description\"; new tasks go on top\n- Check and uncheck tasks between the open and closed lists\n- Reorder a list by dragging a row onto another\n- Interactive shell with a stopwatch in the prompt",
	after_help = "Examples:\n  todo add \"WORK: draft project plan\"\n  todo done 2\n  todo undo 1\n  todo move 3 1\n  todo move --closed 2 1\n  todo clear-completed\n  todo list --json\n  todo shell"
)]
struct Cli {
	#[command(flatten)]
	opts: GlobalOpts,
	#[command(subcommand)]
	action: Option<Action>,
}

#[derive(Args)]
struct GlobalOpts {
	/// Directory holding the saved lists
	#[arg(long = "data-dir", env = "TODO_DATA_DIR", global = true)]
	data_dir: Option<PathBuf>,
	/// Keep lists in memory only
	#[arg(long, global = true)]
	ephemeral: bool,
	/// Disable colored output
	#[arg(long = "no-color", global = true)]
	no_color: bool,
	/// Stopwatch refresh interval in milliseconds
	#[arg(long = "tick-ms", env = "TODO_TICK_MS", default_value_t = DEFAULT_TICK.as_millis() as u64, global = true, value_parser = clap::value_parser!(u64).range(1..=1000))]
	tick_ms: u64,
	/// Log debug details to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Action {
	/// Show both lists (default)
	List {
		/// Print the lists as JSON
		#[arg(long)]
		json: bool,
	},
	/// Add a task to the top of the open list
	Add {
		/// Task text, e.g. "SUBJECT: description"
		#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
		text: Vec<String>,
	},
	/// Check an open task by ID (1-based row number)
	Done {
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Uncheck a closed task by ID (1-based row number)
	Undo {
		#[arg(value_parser = row_id())]
		id: usize,
	},
	/// Move row FROM to position TO within a list
	Move {
		#[arg(value_parser = row_id())]
		from: usize,
		#[arg(value_parser = row_id())]
		to: usize,
		/// Reorder the closed list instead of the open one
		#[arg(long)]
		closed: bool,
	},
	/// Remove every closed task
	ClearCompleted,
	/// Remove every task from both lists
	ClearAll,
	/// Interactive session with drag commands and the stopwatch
	Shell,
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.opts.verbose);
	let settings = Settings::resolve(cli.opts.data_dir, cli.opts.ephemeral, cli.opts.no_color, cli.opts.tick_ms)?;
	if !settings.color {
		colored::control::set_override(false);
	}
	let stopwatch = Stopwatch::new(Arc::new(SystemClock), settings.tick);
	let mut app = App::new(Storage::new(settings.open_store()), stopwatch, Renderer::new(settings.color), io::stdout());
	match cli.action.unwrap_or(Action::List { json: false }) {
		Action::List { json } => {
			if json {
				let text = serde_json::to_string_pretty(app.lists()).context("encode lists")?;
				writeln!(io::stdout(), "{}", text)?;
			} else {
				app.render();
			}
		}
		Action::Add { text } => run_once(&mut app, [Msg::Add(text.join(" "))]),
		Action::Done { id } => run_once(&mut app, [Msg::Toggle { list: ListKind::Open, index: to_index(id) }]),
		Action::Undo { id } => run_once(&mut app, [Msg::Toggle { list: ListKind::Closed, index: to_index(id) }]),
		Action::Move { from, to, closed } => {
			let list = if closed { ListKind::Closed } else { ListKind::Open };
			run_once(&mut app, move_gesture(list, to_index(from), to_index(to)))
		}
		Action::ClearCompleted => run_once(&mut app, [Msg::ClearCompleted]),
		Action::ClearAll => run_once(&mut app, [Msg::ClearAll]),
		Action::Shell => shell::run(&mut app, io::stdin().lock(), io::stdout())?,
	}
	Ok(())
}

fn init_logging(verbose: bool) {
	let default = if verbose { "todo=debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

/// Applies the messages of one command and prints the resulting lists once.
fn run_once<S: KeyValueStore, W: Write>(app: &mut App<S, W>, msgs: impl IntoIterator<Item = Msg>) {
	for msg in msgs {
		app.dispatch(msg);
	}
	app.render();
}
