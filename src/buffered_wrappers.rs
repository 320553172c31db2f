// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [`BufferedSource`] and [`BufferedSink`] wrap a raw [`Source`]/[`Sink`]
//! with an internal [`Buffer`], so callers reach the ergonomic read/write
//! API on `Buffer` (integers, UTF-8, `select`, …) without managing the fill
//! loop themselves.

use crate::Buffer;
use crate::buffer::Options;
use crate::error::{Error, Result};
use crate::streams::{Sink, Source};

/// Wraps `source` in a [`BufferedSource`].
pub fn buffer_source<S: Source>(source: S) -> BufferedSource<S> {
	BufferedSource::new(source)
}

/// Wraps `sink` in a [`BufferedSink`].
pub fn buffer_sink<S: Sink>(sink: S) -> BufferedSink<S> {
	BufferedSink::new(sink)
}

/// A [`Source`] with an internal [`Buffer`] that's refilled from the
/// wrapped source on demand. All of `Buffer`'s read methods are reachable
/// through [`buf`](Self::buf)/[`buf_mut`](Self::buf_mut); [`request`] and
/// [`require`] are what actually pull more bytes in.
///
/// [`request`]: Self::request
/// [`require`]: Self::require
pub struct BufferedSource<S: Source> {
	buffer: Buffer,
	source: S,
	closed: bool,
}

impl<S: Source> BufferedSource<S> {
	fn new(source: S) -> Self {
		Self { buffer: Buffer::new(), source, closed: false }
	}

	/// A read-only view of the internal buffer.
	pub fn buf(&self) -> &Buffer { &self.buffer }
	/// A mutable view of the internal buffer, for direct reads.
	pub fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }

	/// `true` if this source has been closed.
	pub fn is_closed(&self) -> bool { self.closed }

	fn check_open(&self) -> Result<()> {
		if self.closed {
			Err(Error::illegal_state("source is closed"))
		} else {
			Ok(())
		}
	}

	/// Attempts to make at least `byte_count` bytes available in the
	/// buffer, pulling from the underlying source as needed. Returns
	/// `false` (rather than erroring) if the source is exhausted first.
	pub fn request(&mut self, byte_count: usize) -> Result<bool> {
		self.check_open()?;
		while self.buffer.len() < byte_count {
			let n = self.source.read(&mut self.buffer, 8192.max(byte_count - self.buffer.len()))?;
			if n == 0 { return Ok(false) }
		}
		Ok(true)
	}

	/// Like [`request`](Self::request), but errors with
	/// [`Error::EndOfInput`] instead of returning `false` if the source is
	/// exhausted before `byte_count` bytes are available.
	pub fn require(&mut self, byte_count: usize) -> Result<()> {
		if self.request(byte_count)? {
			Ok(())
		} else {
			Err(Error::end_of_input(byte_count - self.buffer.len()))
		}
	}

	/// `true` if the source has no more bytes to offer — i.e. `request(1)`
	/// would return `false`.
	pub fn exhausted(&mut self) -> Result<bool> {
		self.request(1).map(|has_more| !has_more)
	}

	/// Returns a [`Buffer`] sharing the source's already-buffered bytes,
	/// without consuming them — a peek. Reading from the peeked buffer does
	/// not advance this source.
	pub fn peek(&self) -> Buffer { self.buffer.clone() }

	/// Matches [`Options`] against the buffered bytes, pulling more from
	/// the source if none of the buffered candidates can be ruled out yet.
	pub fn select(&mut self, options: &Options) -> Result<Option<usize>> {
		loop {
			if let Some(index) = self.buffer.select(options) {
				return Ok(Some(index))
			}
			if !self.request(self.buffer.len() + 1)? {
				return Ok(self.buffer.select(options))
			}
		}
	}
}

impl<S: Source> Source for BufferedSource<S> {
	fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
		self.check_open()?;
		if self.buffer.is_empty() {
			let n = self.source.read(&mut self.buffer, byte_count.max(8192))?;
			if n == 0 { return Ok(0) }
		}
		self.buffer.write_into(sink, byte_count)
	}

	fn close(&mut self) -> Result<()> {
		if self.closed { return Ok(()) }
		self.closed = true;
		self.buffer.clear();
		self.source.close()
	}
}

impl<S: Source> Drop for BufferedSource<S> {
	fn drop(&mut self) { let _ = self.close(); }
}

/// A [`Sink`] with an internal [`Buffer`] that's flushed to the wrapped
/// sink either explicitly (via [`flush`](Self::flush)) or automatically
/// once it accumulates a full segment's worth of data.
pub struct BufferedSink<S: Sink> {
	buffer: Buffer,
	sink: S,
	closed: bool,
}

impl<S: Sink> BufferedSink<S> {
	fn new(sink: S) -> Self {
		Self { buffer: Buffer::new(), sink, closed: false }
	}

	/// A read-only view of the internal buffer.
	pub fn buf(&self) -> &Buffer { &self.buffer }
	/// A mutable view of the internal buffer, for direct writes.
	pub fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }

	/// `true` if this sink has been closed.
	pub fn is_closed(&self) -> bool { self.closed }

	fn check_open(&self) -> Result<()> {
		if self.closed {
			Err(Error::illegal_state("sink is closed"))
		} else {
			Ok(())
		}
	}

	/// Flushes every complete [`SEGMENT_SIZE`](crate::SEGMENT_SIZE) chunk of
	/// buffered data downstream, keeping only a final partial segment
	/// buffered. Called automatically after every write; exposed so large
	/// writers can flush mid-write without waiting for `flush`.
	pub fn emit_complete_segments(&mut self) -> Result<()> {
		let complete = self.buffer.len() / crate::SEGMENT_SIZE * crate::SEGMENT_SIZE;
		if complete > 0 {
			self.sink.write(&mut self.buffer, complete)?;
		}
		Ok(())
	}

	/// Writes every buffered byte downstream, without flushing the wrapped
	/// sink — callers that also want the downstream sink flushed should use
	/// [`flush`](Sink::flush) instead.
	pub fn emit(&mut self) -> Result<()> {
		self.sink.write_all(&mut self.buffer)?;
		Ok(())
	}
}

impl<S: Sink> Sink for BufferedSink<S> {
	fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<usize> {
		self.check_open()?;
		let n = source.write_into(&mut self.buffer, byte_count)?;
		self.emit_complete_segments()?;
		Ok(n)
	}

	fn flush(&mut self) -> Result<()> {
		self.check_open()?;
		self.emit()?;
		self.sink.flush()
	}

	fn close(&mut self) -> Result<()> {
		if self.closed { return Ok(()) }
		self.closed = true;
		let emit = self.emit();
		let close = self.sink.close();
		emit?;
		close
	}
}

impl<S: Sink> Drop for BufferedSink<S> {
	fn drop(&mut self) { let _ = self.close(); }
}
