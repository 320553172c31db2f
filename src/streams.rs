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

//! The minimal streaming traits: a [`Source`] moves bytes into a
//! [`Buffer`], a [`Sink`] moves bytes out of one. Both are deliberately
//! small — everything ergonomic (UTF-8 lines, integers, `select`) lives on
//! [`Buffer`] itself, reached through [`BufferedSource`](crate::BufferedSource)
//! and [`BufferedSink`](crate::BufferedSink).

pub mod void;

use crate::Buffer;
use crate::error::Result;

/// A producer of bytes. `read` appends up to `byte_count` bytes onto
/// `sink`, returning how many were actually appended (`0` signals
/// exhaustion, never an error).
pub trait Source {
	/// Reads up to `byte_count` bytes into `sink`, returning the number
	/// read. Returns `Ok(0)` on exhaustion rather than erroring.
	fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize>;

	/// Reads every remaining byte into `sink`, returning the total read.
	fn read_all(&mut self, sink: &mut Buffer) -> Result<usize> {
		let mut total = 0;
		loop {
			let n = self.read(sink, 8192)?;
			if n == 0 { break }
			total += n;
		}
		Ok(total)
	}

	/// Releases any resources held by this source. Idempotent: closing an
	/// already-closed source is a no-op, not an error.
	fn close(&mut self) -> Result<()> { Ok(()) }
}

/// A consumer of bytes. `write` removes up to `byte_count` bytes from
/// `source` and delivers them downstream.
pub trait Sink {
	/// Writes up to `byte_count` bytes from `source`, returning the number
	/// written.
	fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<usize>;

	/// Writes every byte currently in `source`.
	fn write_all(&mut self, source: &mut Buffer) -> Result<usize> {
		let mut total = 0;
		while !source.is_empty() {
			let remaining = source.len();
			let n = self.write(source, remaining)?;
			total += n;
			if n == 0 { break }
		}
		Ok(total)
	}

	/// Pushes any data buffered by this sink downstream.
	fn flush(&mut self) -> Result<()> { Ok(()) }

	/// Releases any resources held by this sink, flushing first. Idempotent.
	fn close(&mut self) -> Result<()> { self.flush() }
}
