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

use crate::Buffer;
use crate::error::Result;
use super::{Sink, Source};

/// Returns a [`Sink`] that writes to nowhere, discarding any data written to
/// it.
pub fn void_sink() -> VoidSink { VoidSink }

/// Returns a [`Source`] that reads from nowhere, producing no data.
pub fn void_source() -> VoidSource { VoidSource }

/// A [`Sink`] that writes to nowhere, discarding any data written to it.
#[derive(Copy, Clone, Debug, Default)]
pub struct VoidSink;

impl Sink for VoidSink {
	/// Discards up to `byte_count` bytes from `source`.
	fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<usize> {
		let n = byte_count.min(source.len());
		source.skip(n);
		Ok(n)
	}

	/// Discards every byte in `source`.
	fn write_all(&mut self, source: &mut Buffer) -> Result<usize> {
		let n = source.len();
		source.clear();
		Ok(n)
	}
}

/// A [`Source`] that reads from nowhere, producing no data.
#[derive(Copy, Clone, Debug, Default)]
pub struct VoidSource;

impl Source for VoidSource {
	/// Produces nothing, returning `0`.
	fn read(&mut self, _sink: &mut Buffer, _byte_count: usize) -> Result<usize> { Ok(0) }

	/// Produces nothing, returning `0`.
	fn read_all(&mut self, _sink: &mut Buffer) -> Result<usize> { Ok(0) }
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use crate::Buffer;
	use crate::streams::{Sink, Source};
	use super::{void_sink, void_source};

	#[test]
	fn void_sink_discards_everything() {
		let mut buf = Buffer::new();
		buf.push_slice(b"discard me");
		let mut sink = void_sink();
		let n = sink.write_all(&mut buf).unwrap();
		assert_eq!(n, 10);
		assert!(buf.is_empty());
	}

	#[test]
	fn void_source_produces_nothing() {
		let mut buf = Buffer::new();
		let mut source = void_source();
		assert_eq!(source.read(&mut buf, 100).unwrap(), 0);
		assert!(buf.is_empty());
	}
}
