// SPDX-License-Identifier: Apache-2.0

//! [`Timeout`] bounds how long a blocking wait may run, either by a simple
//! duration or an absolute deadline. [`AsyncTimeout`] goes further: entering
//! one registers a callback with a single shared watchdog thread, which
//! fires it if [`exit`](AsyncTimeoutGuard::exit) hasn't cancelled it by the
//! deadline — the mechanism a real blocking I/O adapter would use to force
//! itself to unblock (e.g. by closing the underlying socket).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use parking_lot::{Condvar, Mutex, MutexGuard};
use once_cell::sync::Lazy;

/// How long to keep the watchdog thread alive with nothing scheduled
/// before letting it exit.
const WATCHDOG_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// A timeout expressed as a relative duration, an absolute deadline, or
/// both (whichever is reached first applies). The zero-duration,
/// no-deadline value — [`Timeout::NONE`] — means "never times out."
#[derive(Copy, Clone, Debug)]
pub struct Timeout {
	duration: Duration,
	deadline: Option<Instant>,
}

impl Timeout {
	/// The sentinel value meaning "no timeout": zero duration, no deadline.
	pub const NONE: Timeout = Timeout { duration: Duration::ZERO, deadline: None };

	/// Equivalent to [`Timeout::NONE`].
	pub fn new() -> Self { Self::NONE }

	/// The relative timeout duration. `Duration::ZERO` means unset.
	pub fn duration(&self) -> Duration { self.duration }

	/// Sets the relative timeout duration; `Duration::ZERO` clears it.
	pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
		self.duration = duration;
		self
	}

	/// The absolute deadline, if any.
	pub fn deadline(&self) -> Option<Instant> { self.deadline }

	/// Sets an absolute deadline.
	pub fn set_deadline(&mut self, deadline: Instant) -> &mut Self {
		self.deadline = Some(deadline);
		self
	}

	/// Clears the relative timeout duration.
	pub fn clear_duration(&mut self) -> &mut Self {
		self.duration = Duration::ZERO;
		self
	}

	/// Clears the absolute deadline.
	pub fn clear_deadline(&mut self) -> &mut Self {
		self.deadline = None;
		self
	}

	/// `true` if an absolute deadline is set.
	pub fn has_deadline(&self) -> bool { self.deadline.is_some() }

	/// The earliest point this timeout requires a wait to stop by,
	/// computed from `now` — the nearer of an explicit deadline and
	/// `now + duration`. `None` if neither is set (never times out).
	pub fn effective_deadline(&self, now: Instant) -> Option<Instant> {
		let from_duration = (!self.duration.is_zero()).then(|| now + self.duration);
		match (self.deadline, from_duration) {
			(Some(a), Some(b)) => Some(a.min(b)),
			(Some(a), None) => Some(a),
			(None, Some(b)) => Some(b),
			(None, None) => None,
		}
	}

	/// Errors with [`Error::SocketTimeout`](crate::Error::SocketTimeout) if
	/// this timeout's deadline has already passed.
	pub fn throw_if_reached(&self) -> crate::error::Result<()> {
		if let Some(deadline) = self.effective_deadline(Instant::now()) {
			if Instant::now() >= deadline {
				return Err(crate::error::Error::socket_timeout("timeout reached"))
			}
		}
		Ok(())
	}

	/// Waits on `condvar` until notified or this timeout's effective
	/// deadline passes, whichever comes first.
	pub fn wait_until_notified<T>(&self, condvar: &Condvar, guard: &mut MutexGuard<'_, T>) {
		match self.effective_deadline(Instant::now()) {
			None => condvar.wait(guard),
			Some(deadline) => {
				let now = Instant::now();
				if deadline > now {
					condvar.wait_for(guard, deadline - now);
				}
			}
		}
	}
}

impl Default for Timeout {
	fn default() -> Self { Self::NONE }
}

struct Entry {
	deadline: Instant,
	on_timeout: Box<dyn FnOnce() + Send>,
	fired: Arc<AtomicBool>,
}

struct Watchdog {
	entries: Vec<Entry>,
	running: bool,
}

static WATCHDOG: Lazy<Mutex<Watchdog>> = Lazy::new(|| Mutex::new(Watchdog { entries: Vec::new(), running: false }));
static WAKE: Condvar = Condvar::new();

fn schedule(deadline: Instant, on_timeout: Box<dyn FnOnce() + Send>, fired: Arc<AtomicBool>) {
	let mut dog = WATCHDOG.lock();
	dog.entries.push(Entry { deadline, on_timeout, fired });
	let needs_thread = !dog.running;
	if needs_thread { dog.running = true }
	drop(dog);
	if needs_thread {
		#[cfg(feature = "log")]
		log::debug!("spawning timeout watchdog thread");
		std::thread::spawn(watchdog_loop);
	}
	WAKE.notify_one();
}

fn watchdog_loop() {
	loop {
		let mut dog = WATCHDOG.lock();

		if dog.entries.is_empty() {
			let result = WAKE.wait_for(&mut dog, WATCHDOG_IDLE_TIMEOUT);
			if result.timed_out() && dog.entries.is_empty() {
				dog.running = false;
				#[cfg(feature = "log")]
				log::debug!("timeout watchdog idle, exiting");
				return
			}
			continue
		}

		dog.entries.sort_by_key(|e| e.deadline);
		let now = Instant::now();
		let next = dog.entries[0].deadline;
		if next > now {
			WAKE.wait_for(&mut dog, next - now);
			continue
		}

		let mut due = Vec::new();
		while let Some(front) = dog.entries.first() {
			if front.deadline > now { break }
			let entry = dog.entries.remove(0);
			if entry.fired.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok() {
				due.push(entry);
			}
		}
		drop(dog);

		for entry in due {
			#[cfg(feature = "log")]
			log::trace!("timeout deadline reached, firing callback");
			(entry.on_timeout)();
		}
	}
}

/// A [`Timeout`] that, once [`entered`](Self::enter), runs a callback on a
/// shared background thread if the deadline passes before the returned
/// guard is [exited](AsyncTimeoutGuard::exit). Real blocking I/O adapters
/// use this to force themselves to unblock (closing a socket, say) when a
/// single read or write runs long; this crate's own [`Pipe`](crate::Pipe)
/// uses the simpler [`Timeout::wait_until_notified`] instead, since it
/// already holds the monitor its blocking operations wait on.
#[derive(Copy, Clone, Debug, Default)]
pub struct AsyncTimeout {
	timeout: Timeout,
}

impl AsyncTimeout {
	pub fn new() -> Self { Self::default() }

	pub fn timeout(&self) -> Timeout { self.timeout }
	pub fn set_timeout(&mut self, timeout: Timeout) -> &mut Self {
		self.timeout = timeout;
		self
	}

	/// Registers `on_timeout` with the shared watchdog if this timeout has
	/// a deadline, returning a guard that must be
	/// [exited](AsyncTimeoutGuard::exit) once the timed operation
	/// completes, whether or not it actually needed the timeout.
	pub fn enter(&self, on_timeout: impl FnOnce() + Send + 'static) -> AsyncTimeoutGuard {
		let fired = Arc::new(AtomicBool::new(false));
		if let Some(deadline) = self.timeout.effective_deadline(Instant::now()) {
			schedule(deadline, Box::new(on_timeout), Arc::clone(&fired));
		}
		AsyncTimeoutGuard { fired }
	}
}

/// Returned by [`AsyncTimeout::enter`]; cancels the scheduled callback when
/// [exited](Self::exit).
#[must_use = "an entered AsyncTimeout must be exited, or its callback may fire spuriously late"]
pub struct AsyncTimeoutGuard {
	fired: Arc<AtomicBool>,
}

impl AsyncTimeoutGuard {
	/// Cancels the timeout if it hasn't fired yet. Returns `true` if it had
	/// already fired (the caller's blocking operation should treat this as
	/// a timeout), `false` if cancelled in time.
	pub fn exit(self) -> bool {
		self.fired.swap(true, Ordering::SeqCst)
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicBool, Ordering};
	use std::time::Duration;
	use super::{AsyncTimeout, Timeout};

	#[test]
	fn exit_before_deadline_cancels() {
		let mut timeout = AsyncTimeout::new();
		timeout.set_timeout(*Timeout::new().set_duration(Duration::from_secs(10)));
		let fired = Arc::new(AtomicBool::new(false));
		let fired_cb = Arc::clone(&fired);
		let guard = timeout.enter(move || fired_cb.store(true, Ordering::SeqCst));
		let timed_out = guard.exit();
		assert!(!timed_out);
		assert!(!fired.load(Ordering::SeqCst));
	}

	#[test]
	fn deadline_passing_fires_callback() {
		let mut timeout = AsyncTimeout::new();
		timeout.set_timeout(*Timeout::new().set_duration(Duration::from_millis(20)));
		let fired = Arc::new(AtomicBool::new(false));
		let fired_cb = Arc::clone(&fired);
		let guard = timeout.enter(move || fired_cb.store(true, Ordering::SeqCst));
		std::thread::sleep(Duration::from_millis(200));
		assert!(fired.load(Ordering::SeqCst), "watchdog should have fired by now");
		assert!(guard.exit(), "exit should observe the callback already ran");
	}

	#[test]
	fn timeout_none_never_reaches() {
		assert!(Timeout::NONE.throw_if_reached().is_ok());
	}
}
