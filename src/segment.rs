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

//! Segments are fixed-capacity byte ranges with position/limit indices and
//! owner/shared flags; they are the unit of memory management in a
//! [`Buffer`](crate::Buffer). [`SegmentRing`] arranges them in the order a
//! buffer reads and writes them.

mod memory;

use std::cmp::min;
use std::collections::VecDeque;
use memory::Memory;

pub use crate::SEGMENT_SIZE;

/// Segments at or above this readable length are shared (COW) rather than
/// copied when split off a buffer.
pub const SHARE_MINIMUM: usize = 1024;

/// A fixed-capacity range of bytes: `[pos, limit)` is readable, `[limit,
/// SEGMENT_SIZE)` is writable capacity that only the owner may use.
///
/// Every underlying array has exactly one *owner* segment, which may append
/// bytes past `limit`; other segments may hold *shares* of the same array,
/// read-only views bounded by their own `pos`/`limit`. A segment knows
/// whether its array [`is_shared`](Self::is_shared) (derived from the
/// backing [`Memory`]'s reference count) and whether it personally
/// [`is_owner`](Self::is_owner).
pub struct Segment {
	mem: Memory,
	pos: usize,
	limit: usize,
	owner: bool,
}

impl Segment {
	fn new(mem: Memory, pos: usize, limit: usize, owner: bool) -> Self {
		debug_assert!(pos <= limit && limit <= SEGMENT_SIZE);
		Self { mem, pos, limit, owner }
	}

	/// A fresh, empty, owned segment backed by a newly allocated array.
	pub(crate) fn fresh() -> Self { Self::new(Memory::fresh(), 0, 0, true) }

	/// The start of the readable range.
	pub fn pos(&self) -> usize { self.pos }
	/// The end of the readable range.
	pub fn limit(&self) -> usize { self.limit }
	/// The number of readable bytes.
	pub fn len(&self) -> usize { self.limit - self.pos }
	/// `true` if there are no readable bytes.
	pub fn is_empty(&self) -> bool { self.pos == self.limit }
	/// The number of bytes that can still be appended. Always `0` for a
	/// non-owner (shared, read-only) segment.
	pub fn write_capacity(&self) -> usize {
		if self.owner { SEGMENT_SIZE - self.limit } else { 0 }
	}
	/// `true` if this segment may append bytes past `limit`.
	pub fn is_owner(&self) -> bool { self.owner }
	/// `true` if the underlying array is referenced by more than one
	/// segment or [`ByteString`](crate::ByteString).
	pub fn is_shared(&self) -> bool { self.mem.is_shared() }

	/// A slice of the readable bytes.
	pub fn data(&self) -> impl std::ops::Deref<Target = [u8]> + '_ {
		std::cell::Ref::map(self.mem.read(), |arr| &arr[self.pos..self.limit])
	}

	/// A mutable slice of the readable bytes, forking the backing array
	/// first if it's shared so in-place edits never leak into another
	/// segment's view. Used by [`UnsafeCursor`](crate::UnsafeCursor) for
	/// direct segment access.
	pub fn data_mut(&mut self) -> impl std::ops::DerefMut<Target = [u8]> + '_ {
		self.mem.fork_in_place();
		let (pos, limit) = (self.pos, self.limit);
		std::cell::RefMut::map(self.mem.write(), move |arr| &mut arr[pos..limit])
	}

	/// A copy of the readable bytes as an owned vector. Convenience for
	/// call sites that can't hold the borrow returned by [`Self::data`].
	pub fn to_vec(&self) -> Vec<u8> { self.data().to_vec() }

	/// Returns a share of this segment's array, covering at most
	/// `byte_count` bytes from the current `pos`. Marks this array as
	/// shared; the owner retains append rights.
	pub fn share(&self, byte_count: usize) -> Self {
		let limit = min(self.pos + byte_count, self.limit);
		Self::new(self.mem.share(), self.pos, limit, false)
	}

	/// Appends as many bytes of `bytes` as fit in the remaining write
	/// capacity, returning the number written. No-op (returns `0`) for a
	/// non-owner segment.
	pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
		let n = min(self.write_capacity(), bytes.len());
		if n > 0 {
			self.mem.write()[self.limit..self.limit + n].copy_from_slice(&bytes[..n]);
			self.limit += n;
		}
		n
	}

	/// Pops one byte from the front of the readable range.
	pub fn pop(&mut self) -> Option<u8> {
		if self.is_empty() { return None }
		let byte = self.mem.read()[self.pos];
		self.pos += 1;
		Some(byte)
	}

	/// Consumes `n` bytes from the front of the readable range (caps at
	/// the available length).
	pub fn consume(&mut self, n: usize) -> usize {
		let n = min(n, self.len());
		self.pos += n;
		n
	}

	/// Reduces the readable range to `new_len` bytes, discarding the tail.
	/// Used by [`UnsafeCursor::resize_buffer`](crate::UnsafeCursor::resize_buffer)
	/// to shrink a buffer without popping whole segments unnecessarily.
	pub fn truncate(&mut self, new_len: usize) {
		debug_assert!(new_len <= self.len());
		self.limit = self.pos + new_len;
	}

	/// Copies `byte_count` bytes into a destination owner segment, shifting
	/// the destination first if its free space isn't contiguous. Returns
	/// the number of bytes moved.
	pub fn write_to(&mut self, dst: &mut Segment, byte_count: usize) -> usize {
		debug_assert!(dst.owner);
		let n = min(byte_count, self.len());
		let n = min(n, dst.write_capacity());
		if n == 0 { return 0 }
		let data = self.data()[..n].to_vec();
		let written = dst.push_slice(&data);
		self.consume(written);
		written
	}

	/// Shifts this segment's readable range to start at offset `0` within
	/// its array, forking first if the array is shared with another
	/// segment. Used before an owner compacts or reuses trailing free
	/// space that's only reachable by moving the window back to the
	/// start.
	pub fn shift(&mut self) {
		if self.pos == 0 { return }
		self.mem.fork_in_place();
		let len = self.len();
		{
			let mut arr = self.mem.write();
			arr.copy_within(self.pos..self.limit, 0);
		}
		self.limit = len;
		self.pos = 0;
	}

	/// Attempts to merge `self` (expected to be the current tail) into
	/// `prev` (its predecessor), provided both are writable owners and the
	/// combined content fits in one segment. Returns `true` if merged, in
	/// which case `self` is now empty and should be recycled.
	pub fn compact_into(&mut self, prev: &mut Segment) -> bool {
		if !self.owner || !prev.owner { return false }
		if prev.is_shared() { return false }
		if prev.write_capacity() < self.len() { return false }
		let data = self.data().to_vec();
		prev.push_slice(&data);
		self.consume(data.len());
		true
	}

	/// Returns this segment's backing array to the process-wide pool, if
	/// this was the sole handle to it. If the array is still shared by
	/// other live segments or [`ByteString`](crate::ByteString)s, this
	/// handle is simply dropped instead — it can't be recycled until the
	/// last reference goes away.
	pub fn recycle(self) {
		self.mem.recycle();
	}
}

/// An ordered sequence of [`Segment`]s, with laden segments at the front and
/// at most one partially-written (or empty) segment at the back. Backed by
/// a `VecDeque` rather than an intrusive linked list: push-back, pop-front,
/// and bulk splice from another ring are all O(1) amortized in segment
/// count, which is what the spec's circular-list recommendation is actually
/// after (see DESIGN.md).
#[derive(Default)]
pub struct SegmentRing {
	ring: VecDeque<Segment>,
	count: usize,
}

impl SegmentRing {
	pub fn new() -> Self { Self::default() }

	/// Total readable bytes across all segments.
	pub fn count(&self) -> usize { self.count }
	/// `true` if there are no readable bytes.
	pub fn is_empty(&self) -> bool { self.count == 0 }
	/// The number of segments currently held (readable and spare).
	pub fn segment_count(&self) -> usize { self.ring.len() }

	pub fn iter(&self) -> impl Iterator<Item = &Segment> { self.ring.iter() }
	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Segment> { self.ring.iter_mut() }

	pub fn front(&self) -> Option<&Segment> { self.ring.front() }
	pub fn front_mut(&mut self) -> Option<&mut Segment> { self.ring.front_mut() }
	pub fn back(&self) -> Option<&Segment> { self.ring.back() }
	pub fn back_mut(&mut self) -> Option<&mut Segment> { self.ring.back_mut() }

	/// Indexed access, used by [`UnsafeCursor`](crate::UnsafeCursor) to walk
	/// segments by position rather than just from either end.
	pub fn get(&self, index: usize) -> Option<&Segment> { self.ring.get(index) }
	pub fn get_mut(&mut self, index: usize) -> Option<&mut Segment> { self.ring.get_mut(index) }

	pub fn push_back(&mut self, seg: Segment) {
		self.count += seg.len();
		self.ring.push_back(seg);
	}

	pub fn push_front(&mut self, seg: Segment) {
		self.count += seg.len();
		self.ring.push_front(seg);
	}

	pub fn pop_front(&mut self) -> Option<Segment> {
		let seg = self.ring.pop_front()?;
		self.count -= seg.len();
		Some(seg)
	}

	pub fn pop_back(&mut self) -> Option<Segment> {
		let seg = self.ring.pop_back()?;
		self.count -= seg.len();
		Some(seg)
	}

	/// Accounts for `n` bytes appended directly to the tail segment via
	/// [`back_mut`](Self::back_mut), bypassing [`push_back`](Self::push_back).
	pub fn note_appended(&mut self, n: usize) { self.count += n; }

	/// Accounts for `n` bytes consumed directly from the front segment via
	/// [`front_mut`](Self::front_mut), bypassing [`pop_front`](Self::pop_front).
	pub fn note_consumed(&mut self, n: usize) { self.count -= n; }

	/// Drops the front segment and returns its array to the pool if it's
	/// empty. Called after reads to keep exhausted segments from lingering.
	pub fn recycle_front_if_empty(&mut self) {
		while self.ring.front().is_some_and(Segment::is_empty) {
			if let Some(seg) = self.pop_front() {
				seg.recycle();
			}
		}
	}

	/// Drops every segment, returning each one's backing array to the pool.
	pub fn clear(&mut self) {
		self.count = 0;
		for seg in self.ring.drain(..) {
			seg.recycle();
		}
	}

	/// Moves `count` bytes from the front of `self` onto the back of
	/// `dst`, implementing the heart of `Buffer::write`: §4.2's algorithm.
	/// Never copies more than necessary — whole segments are relinked
	/// when possible, and only the remainder is split or memcopied.
	pub fn move_into(&mut self, dst: &mut SegmentRing, mut count: usize) {
		while count > 0 {
			let Some(head_len) = self.ring.front().map(Segment::len) else { break };
			if head_len == 0 {
				self.pop_front();
				continue
			}

			if count < head_len {
				// Prefer an in-place copy into dst's writable tail when it
				// has room; otherwise split the head so the first half is
				// exactly `count` bytes (sharing if large enough).
				let fits_tail = dst.ring.back().map_or(false, |tail| {
					tail.is_owner() && !tail.is_shared() && tail.write_capacity() >= count
				});

				if fits_tail {
					let head = self.ring.front_mut().unwrap();
					let data = head.data()[..count].to_vec();
					let tail = dst.ring.back_mut().unwrap();
					let written = tail.push_slice(&data);
					dst.count += written;
					head.consume(written);
					self.count -= written;
					count -= written;
				} else {
					let head = self.ring.front_mut().unwrap();
					let prefix = if count >= SHARE_MINIMUM {
						let share = head.share(count);
						head.consume(count);
						share
					} else {
						let mut fresh = Segment::fresh();
						let written = head.write_to(&mut fresh, count);
						debug_assert_eq!(written, count);
						fresh
					};
					self.count -= count;
					dst.push_back(prefix);
					count = 0;
				}
			} else {
				// Move the whole head segment over, then try to compact
				// the new tail into its predecessor.
				let head = self.pop_front().unwrap();
				count -= head.len();
				dst.push_back(head);
				dst.try_compact_tail();
			}
		}
	}

	/// If the tail and its predecessor are both writable and their
	/// combined content fits in one segment, merges them.
	pub fn try_compact_tail(&mut self) {
		if self.ring.len() < 2 { return }
		let len = self.ring.len();
		let (prev, rest) = self.ring.make_contiguous()[len - 2..].split_at_mut(1);
		let tail = &mut rest[0];
		if tail.compact_into(&mut prev[0]) {
			self.pop_back();
		}
	}
}
