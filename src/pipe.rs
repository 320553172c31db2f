// SPDX-License-Identifier: Apache-2.0

//! [`Pipe`] is an in-memory [`Source`]/[`Sink`] pair sharing a bounded
//! [`Buffer`]: bytes written to the [`PipeSink`] block once the buffer
//! fills, and reads from the [`PipeSource`] block once it's drained,
//! joined by one monitor so both sides observe closes and cancellation
//! immediately.

use std::sync::Arc;
use parking_lot::{Mutex, Condvar};
use crate::{Buffer, Timeout};
use crate::error::{Error, Result};
use crate::streams::{Sink, Source};

struct Shared {
	buffer: Buffer,
	sink_closed: bool,
	source_closed: bool,
	canceled: bool,
}

/// An in-memory pipe: bytes written to its [`sink`](Self::sink) become
/// readable from its [`source`](Self::source), with a bounded buffer
/// providing backpressure between producer and consumer.
pub struct Pipe {
	shared: Arc<Mutex<Shared>>,
	condvar: Arc<Condvar>,
	max_buffer_size: usize,
}

impl Pipe {
	/// Creates a pipe whose internal buffer holds at most
	/// `max_buffer_size` bytes before writes block.
	pub fn new(max_buffer_size: usize) -> Self {
		Self {
			shared: Arc::new(Mutex::new(Shared {
				buffer: Buffer::new(),
				sink_closed: false,
				source_closed: false,
				canceled: false,
			})),
			condvar: Arc::new(Condvar::new()),
			max_buffer_size,
		}
	}

	/// A handle to this pipe's write side.
	pub fn sink(&self) -> PipeSink {
		PipeSink {
			shared: Arc::clone(&self.shared),
			condvar: Arc::clone(&self.condvar),
			max_buffer_size: self.max_buffer_size,
			timeout: Timeout::new(),
		}
	}

	/// A handle to this pipe's read side.
	pub fn source(&self) -> PipeSource {
		PipeSource {
			shared: Arc::clone(&self.shared),
			condvar: Arc::clone(&self.condvar),
			timeout: Timeout::new(),
		}
	}

	/// Reads everything available from this pipe's source into `sink` until
	/// the write side closes, then closes both ends. A convenience for the
	/// common "drain a pipe into some destination" shape.
	pub fn fold(&self, mut sink: impl Sink) -> Result<u64> {
		let mut source = self.source();
		let mut total = 0u64;
		let mut scratch = Buffer::new();
		loop {
			let n = source.read(&mut scratch, 8192)?;
			if n == 0 { break }
			total += n as u64;
			sink.write_all(&mut scratch)?;
		}
		sink.close()?;
		Ok(total)
	}

	/// Cancels the pipe: any thread currently blocked in a read or write
	/// wakes with [`Error::IllegalState`], and every later read or write on
	/// either side fails the same way.
	pub fn cancel(&self) {
		let mut shared = self.shared.lock();
		shared.canceled = true;
		shared.buffer.clear();
		drop(shared);
		self.condvar.notify_all();
	}
}

/// The write half of a [`Pipe`].
pub struct PipeSink {
	shared: Arc<Mutex<Shared>>,
	condvar: Arc<Condvar>,
	max_buffer_size: usize,
	timeout: Timeout,
}

impl PipeSink {
	/// This handle's [`Timeout`], applied while blocked waiting for the
	/// pipe to drain.
	pub fn timeout(&mut self) -> &mut Timeout { &mut self.timeout }
}

impl Sink for PipeSink {
	fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<usize> {
		let mut remaining = byte_count;
		let mut written = 0;
		while remaining > 0 {
			let mut shared = self.shared.lock();
			if shared.canceled {
				return Err(Error::illegal_state("pipe was canceled"))
			}
			if shared.sink_closed {
				return Err(Error::illegal_state("sink is closed"))
			}
			if shared.source_closed {
				// No one left to read; drop what's left silently, as a
				// closed read end does for a real pipe.
				return Ok(written)
			}

			let available = self.max_buffer_size.saturating_sub(shared.buffer.len());
			if available == 0 {
				self.timeout.throw_if_reached()?;
				self.timeout.wait_until_notified(&self.condvar, &mut shared);
				continue
			}

			let n = available.min(remaining);
			let moved = source.write_into(&mut shared.buffer, n)?;
			written += moved;
			remaining -= moved;
			drop(shared);
			self.condvar.notify_all();
		}
		Ok(written)
	}

	fn close(&mut self) -> Result<()> {
		let mut shared = self.shared.lock();
		shared.sink_closed = true;
		drop(shared);
		self.condvar.notify_all();
		Ok(())
	}
}

impl Drop for PipeSink {
	fn drop(&mut self) { let _ = self.close(); }
}

/// The read half of a [`Pipe`].
pub struct PipeSource {
	shared: Arc<Mutex<Shared>>,
	condvar: Arc<Condvar>,
	timeout: Timeout,
}

impl PipeSource {
	/// This handle's [`Timeout`], applied while blocked waiting for data.
	pub fn timeout(&mut self) -> &mut Timeout { &mut self.timeout }
}

impl Source for PipeSource {
	fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
		loop {
			let mut shared = self.shared.lock();
			if shared.canceled {
				return Err(Error::illegal_state("pipe was canceled"))
			}
			if shared.source_closed {
				return Err(Error::illegal_state("source is closed"))
			}

			if !shared.buffer.is_empty() {
				let n = shared.buffer.write_into(sink, byte_count.min(shared.buffer.len()))?;
				drop(shared);
				self.condvar.notify_all();
				return Ok(n)
			}
			if shared.sink_closed {
				return Ok(0)
			}

			self.timeout.throw_if_reached()?;
			self.timeout.wait_until_notified(&self.condvar, &mut shared);
		}
	}

	fn close(&mut self) -> Result<()> {
		let mut shared = self.shared.lock();
		shared.source_closed = true;
		shared.buffer.clear();
		drop(shared);
		self.condvar.notify_all();
		Ok(())
	}
}

impl Drop for PipeSource {
	fn drop(&mut self) { let _ = self.close(); }
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use std::time::Duration;
	use crate::streams::{Sink, Source};
	use crate::Buffer;
	use super::Pipe;

	#[test]
	fn write_then_read_roundtrip() {
		let pipe = Pipe::new(1024);
		let mut sink = pipe.sink();
		let mut source = pipe.source();

		let mut input = Buffer::new();
		input.push_slice(b"hello pipe");
		sink.write_all(&mut input).unwrap();

		let mut out = Buffer::new();
		let n = source.read(&mut out, 1024).unwrap();
		assert_eq!(n, 10);
		assert_eq!(out.to_vec(), b"hello pipe");
	}

	#[test]
	fn closing_sink_drains_then_source_reads_zero() {
		let pipe = Pipe::new(1024);
		let mut sink = pipe.sink();
		let mut source = pipe.source();

		let mut input = Buffer::new();
		input.push_slice(b"last bytes");
		sink.write_all(&mut input).unwrap();
		sink.close().unwrap();

		let mut out = Buffer::new();
		assert_eq!(source.read(&mut out, 1024).unwrap(), 10);
		assert_eq!(source.read(&mut out, 1024).unwrap(), 0);
	}

	#[test]
	fn full_buffer_applies_backpressure() {
		let pipe = Pipe::new(4);
		let mut sink = pipe.sink();
		let mut source = pipe.source();

		let writer = std::thread::spawn(move || {
			let mut input = Buffer::new();
			input.push_slice(b"0123456789");
			sink.write_all(&mut input).unwrap();
			sink.close().unwrap();
		});

		std::thread::sleep(Duration::from_millis(50));

		let mut out = Buffer::new();
		let mut total = 0;
		loop {
			let n = source.read(&mut out, 4).unwrap();
			if n == 0 { break }
			total += n;
		}
		assert_eq!(total, 10);
		writer.join().unwrap();
	}

	#[test]
	fn cancel_wakes_and_errors_both_sides() {
		let pipe = Pipe::new(4);
		let mut source = pipe.source();
		pipe.cancel();
		assert!(source.read(&mut Buffer::new(), 4).is_err());
	}
}
