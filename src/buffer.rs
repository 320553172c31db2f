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

//! [`Buffer`] is both a [`Source`](crate::Source) and a [`Sink`](crate::Sink):
//! a mutable byte queue backed by a [`SegmentRing`], read from the front and
//! written at the back. Reads and writes never relocate bytes that don't
//! need to move; moving bytes between two buffers relinks whole segments
//! where possible instead of copying them.

mod read;
mod write;
pub mod options;
pub mod cursor;

pub use options::Options;

use std::cmp::min;
use crate::error::{Error, Result};
use crate::segment::{Segment, SegmentRing, SHARE_MINIMUM};
use crate::byte_str::SegmentedByteString;

/// A growable queue of bytes, implemented as a ring of [`Segment`]s. Bytes
/// are appended at the back and consumed from the front; a `Buffer` is its
/// own [`Source`](crate::Source) and [`Sink`](crate::Sink), so two buffers
/// can exchange data without copying whole segments that move over intact.
#[derive(Default)]
pub struct Buffer {
	ring: SegmentRing,
}

impl Buffer {
	/// Creates an empty buffer.
	pub fn new() -> Self { Self::default() }

	/// The number of bytes currently buffered.
	pub fn len(&self) -> usize { self.ring.count() }

	/// `true` if the buffer holds no bytes.
	pub fn is_empty(&self) -> bool { self.ring.is_empty() }

	/// Discards all buffered bytes, returning their segments to the pool.
	pub fn clear(&mut self) { self.ring.clear() }

	/// Discards the first `byte_count` bytes (or all of them, if fewer are
	/// buffered).
	pub fn skip(&mut self, byte_count: usize) {
		let byte_count = min(byte_count, self.len());
		self.drain(byte_count, |_| {});
	}

	/// Returns the byte at logical offset `index` without consuming it.
	pub fn get(&self, index: usize) -> Option<u8> {
		if index >= self.len() { return None }
		let mut index = index;
		for seg in self.ring.iter() {
			if index < seg.len() {
				return Some(seg.data()[index])
			}
			index -= seg.len();
		}
		None
	}

	/// Copies every buffered byte into an owned `Vec<u8>` without consuming
	/// them. Mainly useful for tests and debug formatting; prefer
	/// [`snapshot`](Self::snapshot) to avoid the copy.
	pub fn to_vec(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.len());
		for seg in self.ring.iter() {
			out.extend_from_slice(&seg.data());
		}
		out
	}

	/// Takes an O(1) immutable snapshot of the buffer's current contents by
	/// sharing its segments rather than copying them.
	pub fn snapshot(&self) -> SegmentedByteString {
		SegmentedByteString::snapshot(&self.ring)
	}

	/// Returns the lowest offset at which `needle` occurs at or after
	/// `start`, or `None` if it doesn't occur.
	pub fn index_of(&self, needle: &[u8], start: usize) -> Option<usize> {
		if needle.is_empty() { return Some(min(start, self.len())) }

		let len = self.len();
		let mut offset = start;
		while offset + needle.len() <= len {
			if self.range_equals(offset, needle) {
				return Some(offset)
			}
			offset += 1;
		}
		None
	}

	/// Returns the lowest offset at or after `start` of any byte in `set`.
	pub fn index_of_element(&self, set: &[u8], start: usize) -> Option<usize> {
		let len = self.len();
		(start..len).find(|&offset| {
			let Some(byte) = self.get(offset) else { return false };
			set.contains(&byte)
		})
	}

	fn range_equals(&self, offset: usize, other: &[u8]) -> bool {
		if offset + other.len() > self.len() { return false }
		(0..other.len()).all(|i| self.get(offset + i) == Some(other[i]))
	}

	/// Ensures there's an owned, writable segment at the tail, creating one
	/// if the current tail is full, shared, or absent.
	fn writable_tail(&mut self) -> &mut Segment {
		let need_fresh = self.ring.back().is_none_or(|seg| seg.write_capacity() == 0);
		if need_fresh {
			self.ring.push_back(Segment::fresh());
		}
		self.ring.back_mut().expect("just ensured a tail segment")
	}

	/// Runs `f` over up to `max` buffered bytes from the front, consuming
	/// whatever `f` reports it used, until `max` bytes have been consumed or
	/// the buffer is exhausted. Returns the number of bytes consumed.
	fn drain(&mut self, max: usize, mut f: impl FnMut(&[u8])) -> usize {
		let mut remaining = min(max, self.len());
		let mut consumed = 0;
		while remaining > 0 {
			self.ring.recycle_front_if_empty();
			let Some(front) = self.ring.front_mut() else { break };
			let take = min(remaining, front.len());
			f(&front.data()[..take]);
			front.consume(take);
			self.ring.note_consumed(take);
			remaining -= take;
			consumed += take;
		}
		self.ring.recycle_front_if_empty();
		consumed
	}

	/// Appends `bytes` to the tail, splitting the write across as many fresh
	/// segments as needed.
	pub(crate) fn push_slice(&mut self, mut bytes: &[u8]) {
		while !bytes.is_empty() {
			let tail = self.writable_tail();
			let n = tail.push_slice(bytes);
			self.ring.note_appended(n);
			bytes = &bytes[n..];
		}
	}

	/// Moves `byte_count` bytes from the front of `self` onto the back of
	/// `dst`. Whole segments are relinked; a segment that must be split is
	/// shared (if large enough) or copied into a fresh one.
	pub fn write_into(&mut self, dst: &mut Buffer, byte_count: usize) -> Result<usize> {
		let byte_count = min(byte_count, self.len());
		self.ring.move_into(&mut dst.ring, byte_count);
		Ok(byte_count)
	}

	/// Moves every buffered byte from `self` onto the back of `dst`.
	pub fn write_all_into(&mut self, dst: &mut Buffer) -> Result<usize> {
		self.write_into(dst, self.len())
	}
}

impl Clone for Buffer {
	/// Produces a second buffer with the same logical content as this one,
	/// sharing segments rather than copying their bytes.
	fn clone(&self) -> Self {
		let mut ring = SegmentRing::new();
		for seg in self.ring.iter() {
			if seg.is_empty() { continue }
			ring.push_back(seg.share(seg.len()));
		}
		Self { ring }
	}
}

impl std::fmt::Debug for Buffer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Buffer").field("len", &self.len()).finish()
	}
}

impl crate::streams::Source for Buffer {
	fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
		self.write_into(sink, byte_count)
	}

	fn close(&mut self) -> Result<()> {
		self.clear();
		Ok(())
	}
}

impl crate::streams::Sink for Buffer {
	fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<usize> {
		source.write_into(self, byte_count)
	}

	fn flush(&mut self) -> Result<()> { Ok(()) }

	fn close(&mut self) -> Result<()> {
		self.clear();
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use super::Buffer;

	#[test]
	fn push_and_drain_roundtrip() {
		let mut buf = Buffer::new();
		buf.push_slice(b"hello world");
		assert_eq!(buf.len(), 11);
		assert_eq!(buf.to_vec(), b"hello world");
	}

	#[test]
	fn write_into_moves_bytes() {
		let mut a = Buffer::new();
		let mut b = Buffer::new();
		a.push_slice(b"0123456789");
		let moved = a.write_into(&mut b, 4).unwrap();
		assert_eq!(moved, 4);
		assert_eq!(a.to_vec(), b"456789");
		assert_eq!(b.to_vec(), b"0123");
	}

	#[test]
	fn write_all_into_drains_source() {
		let mut a = Buffer::new();
		let mut b = Buffer::new();
		a.push_slice(b"abc");
		a.write_all_into(&mut b).unwrap();
		assert!(a.is_empty());
		assert_eq!(b.to_vec(), b"abc");
	}

	#[test]
	fn index_of_finds_needle_across_segments() {
		let mut buf = Buffer::new();
		for _ in 0..4096 {
			buf.push_slice(b"x");
		}
		buf.push_slice(b"needle");
		assert_eq!(buf.index_of(b"needle", 0), Some(4096));
		assert_eq!(buf.index_of(b"absent", 0), None);
	}

	#[test]
	fn clone_is_independent_view() {
		let mut a = Buffer::new();
		a.push_slice(b"shared");
		let b = a.clone();
		a.push_slice(b"-more");
		assert_eq!(b.to_vec(), b"shared");
		assert_eq!(a.to_vec(), b"shared-more");
	}

	#[test]
	fn large_write_shares_instead_of_copying() {
		let mut a = Buffer::new();
		let mut b = Buffer::new();
		a.push_slice(&vec![7u8; super::SHARE_MINIMUM + 10]);
		a.write_into(&mut b, super::SHARE_MINIMUM + 5).unwrap();
		assert_eq!(b.len(), super::SHARE_MINIMUM + 5);
	}
}
