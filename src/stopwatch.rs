//! Start/stop/reset stopwatch and its periodically refreshed display.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::NaiveTime;
use tracing::{debug, warn};

pub const DEFAULT_TICK: Duration = Duration::from_millis(29);
pub const ZERO_DISPLAY: &str = "00:00:00.000";

const MILLIS_PER_DAY: u128 = 24 * 60 * 60 * 1000;

pub trait Clock: Send + Sync {
	fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Formats as a time of day, so anything past 24 hours wraps back to 00.
pub fn format_elapsed(elapsed: Duration) -> String {
	let millis = elapsed.as_millis() % MILLIS_PER_DAY;
	let secs = (millis / 1000) as u32;
	let nanos = (millis % 1000) as u32 * 1_000_000;
	match NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos) {
		Some(t) => t.format("%H:%M:%S%.3f").to_string(),
		None => ZERO_DISPLAY.to_string(),
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Stopped,
	Running { started_at: Instant },
}

/// Latest formatted value, shared with the ticker thread.
#[derive(Debug, Clone)]
pub struct DisplayCell(Arc<Mutex<String>>);

impl DisplayCell {
	fn new() -> Self {
		Self(Arc::new(Mutex::new(ZERO_DISPLAY.to_string())))
	}

	pub fn get(&self) -> String {
		match self.0.lock() {
			Ok(s) => s.clone(),
			Err(poisoned) => poisoned.into_inner().clone(),
		}
	}

	fn set(&self, value: String) {
		match self.0.lock() {
			Ok(mut s) => *s = value,
			Err(poisoned) => *poisoned.into_inner() = value,
		}
	}
}

/// Background thread redrawing the display while the stopwatch runs.
/// Dropping or cancelling it stops the thread and waits for it.
struct Ticker {
	stop: Option<Sender<()>>,
	handle: Option<JoinHandle<()>>,
}

impl Ticker {
	fn spawn(clock: Arc<dyn Clock>, display: DisplayCell, banked: Duration, started_at: Instant, every: Duration) -> Self {
		let (tx, rx) = mpsc::channel::<()>();
		let spawned = thread::Builder::new().name("stopwatch-tick".into()).spawn(move || loop {
			match rx.recv_timeout(every) {
				Err(RecvTimeoutError::Timeout) => {
					let now = clock.now();
					display.set(format_elapsed(banked + now.saturating_duration_since(started_at)));
				}
				Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
			}
		});
		match spawned {
			Ok(handle) => Self { stop: Some(tx), handle: Some(handle) },
			Err(e) => {
				warn!(error = %e, "cannot spawn stopwatch ticker, display will only update on stop");
				Self { stop: None, handle: None }
			}
		}
	}

	fn cancel(&mut self) {
		if let Some(tx) = self.stop.take() {
			let _ = tx.send(());
		}
		if let Some(handle) = self.handle.take() {
			if handle.join().is_err() {
				warn!("stopwatch ticker panicked");
			}
		}
	}
}

impl Drop for Ticker {
	fn drop(&mut self) {
		self.cancel();
	}
}

pub struct Stopwatch {
	clock: Arc<dyn Clock>,
	phase: Phase,
	accumulated: Duration,
	tick: Duration,
	display: DisplayCell,
	ticker: Option<Ticker>,
}

impl Stopwatch {
	pub fn new(clock: Arc<dyn Clock>, tick: Duration) -> Self {
		Self { clock, phase: Phase::Stopped, accumulated: Duration::ZERO, tick, display: DisplayCell::new(), ticker: None }
	}

	pub fn is_running(&self) -> bool {
		matches!(self.phase, Phase::Running { .. })
	}

	pub fn elapsed(&self) -> Duration {
		match self.phase {
			Phase::Stopped => self.accumulated,
			Phase::Running { started_at } => self.accumulated + self.clock.now().saturating_duration_since(started_at),
		}
	}

	pub fn display(&self) -> String {
		self.display.get()
	}

	pub fn start(&mut self) {
		if self.is_running() {
			return;
		}
		let started_at = self.clock.now();
		self.phase = Phase::Running { started_at };
		self.ticker = Some(Ticker::spawn(self.clock.clone(), self.display.clone(), self.accumulated, started_at, self.tick));
		debug!(banked_ms = self.accumulated.as_millis() as u64, "stopwatch started");
	}

	pub fn stop(&mut self) {
		let Phase::Running { started_at } = self.phase else {
			return;
		};
		self.cancel_ticker();
		self.accumulated += self.clock.now().saturating_duration_since(started_at);
		self.phase = Phase::Stopped;
		self.display.set(format_elapsed(self.accumulated));
		debug!(elapsed_ms = self.accumulated.as_millis() as u64, "stopwatch stopped");
	}

	/// Back to zero from any state; a running segment is discarded, not banked.
	pub fn reset(&mut self) {
		self.cancel_ticker();
		self.phase = Phase::Stopped;
		self.accumulated = Duration::ZERO;
		self.display.set(ZERO_DISPLAY.to_string());
		debug!("stopwatch reset");
	}

	fn cancel_ticker(&mut self) {
		if let Some(mut ticker) = self.ticker.take() {
			ticker.cancel();
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	/// Clock that only moves when told to.
	#[derive(Debug)]
	pub(crate) struct ManualClock {
		base: Instant,
		offset: Mutex<Duration>,
	}

	impl ManualClock {
		pub(crate) fn new() -> Arc<Self> {
			Arc::new(Self { base: Instant::now(), offset: Mutex::new(Duration::ZERO) })
		}

		pub(crate) fn advance(&self, by: Duration) {
			*self.offset.lock().unwrap() += by;
		}
	}

	impl Clock for ManualClock {
		fn now(&self) -> Instant {
			self.base + *self.offset.lock().unwrap()
		}
	}

	fn ms(n: u64) -> Duration {
		Duration::from_millis(n)
	}

	fn watch(clock: &Arc<ManualClock>) -> Stopwatch {
		Stopwatch::new(clock.clone(), ms(1))
	}

	#[test]
	fn formats_zero_padded() {
		assert_eq!(format_elapsed(Duration::ZERO), "00:00:00.000");
		assert_eq!(format_elapsed(ms(1_500)), "00:00:01.500");
		assert_eq!(format_elapsed(ms(((3 * 60 + 4) * 60 + 5) * 1000 + 7)), "03:04:05.007");
	}

	#[test]
	fn formatting_wraps_after_a_day() {
		assert_eq!(format_elapsed(Duration::from_secs(24 * 3600)), "00:00:00.000");
		assert_eq!(format_elapsed(Duration::from_secs(25 * 3600 + 1)), "01:00:01.000");
	}

	#[test]
	fn start_stop_accumulates() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(1_500));
		sw.stop();
		assert_eq!(sw.accumulated, ms(1_500));
		assert_eq!(sw.display(), "00:00:01.500");
		assert!(!sw.is_running());
	}

	#[test]
	fn reset_zeroes_display_and_total() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(1_500));
		sw.stop();
		sw.reset();
		assert_eq!(sw.accumulated, Duration::ZERO);
		assert_eq!(sw.display(), ZERO_DISPLAY);
	}

	#[test]
	fn segments_add_up() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(200));
		sw.stop();
		clock.advance(ms(10_000));
		sw.start();
		clock.advance(ms(300));
		assert_eq!(sw.elapsed(), ms(500));
		assert_eq!(sw.accumulated, ms(200));
		sw.stop();
		assert_eq!(sw.accumulated, ms(500));
	}

	#[test]
	fn start_while_running_keeps_original_start() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(100));
		sw.start();
		clock.advance(ms(100));
		sw.stop();
		assert_eq!(sw.accumulated, ms(200));
	}

	#[test]
	fn stop_while_stopped_is_noop() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.stop();
		clock.advance(ms(100));
		sw.stop();
		assert_eq!(sw.accumulated, Duration::ZERO);
		assert_eq!(sw.display(), ZERO_DISPLAY);
	}

	#[test]
	fn reset_while_running_discards_segment() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(700));
		sw.reset();
		assert!(!sw.is_running());
		clock.advance(ms(700));
		assert_eq!(sw.elapsed(), Duration::ZERO);
		assert_eq!(sw.display(), ZERO_DISPLAY);
	}

	#[test]
	fn ticker_refreshes_display_while_running() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(2_250));
		let deadline = Instant::now() + Duration::from_secs(5);
		while sw.display() != "00:00:02.250" && Instant::now() < deadline {
			thread::sleep(ms(2));
		}
		assert_eq!(sw.display(), "00:00:02.250");
		sw.reset();
	}

	#[test]
	fn display_is_static_after_stop() {
		let clock = ManualClock::new();
		let mut sw = watch(&clock);
		sw.start();
		clock.advance(ms(40));
		sw.stop();
		assert!(sw.ticker.is_none());
		clock.advance(ms(5_000));
		thread::sleep(ms(20));
		assert_eq!(sw.display(), "00:00:00.040");
	}
}
