// SPDX-License-Identifier: Apache-2.0

//! The segmented variant of [`ByteString`]: an immutable snapshot of a
//! [`Buffer`](crate::Buffer) that shares its segments rather than copying
//! them. See §4.3 of the design notes for the directory-based layout.

use std::cell::OnceCell;
use simdutf8::compat::from_utf8;
use crate::error::OffsetUtf8Error;
use crate::Segment;
use crate::segment::SegmentRing;
use super::ByteString;

/// A snapshot of a [`Buffer`](crate::Buffer)'s segments, taken in O(1) by
/// sharing the underlying arrays instead of copying them. Marking the
/// source segments shared guarantees the buffer can't mutate bytes this
/// snapshot has already observed: any further write either lands in a fresh
/// segment or forks a private copy first.
///
/// Lookups binary-search a directory of cumulative end offsets (the first
/// half of okio's two-array directory; the second half, each segment's
/// `pos`, is folded in here since [`Segment`] already tracks its own `pos`).
pub struct SegmentedByteString {
	segments: Vec<Segment>,
	/// `ends[i]` is the logical offset one past the last byte contributed
	/// by `segments[i]`. Monotonically increasing; `ends.last() == size`.
	ends: Vec<usize>,
	size: usize,
	utf8: OnceCell<String>,
}

impl SegmentedByteString {
	pub(crate) fn snapshot(ring: &SegmentRing) -> Self {
		let mut segments = Vec::with_capacity(ring.segment_count());
		let mut ends = Vec::with_capacity(ring.segment_count());
		let mut size = 0;
		for seg in ring.iter() {
			if seg.is_empty() { continue }
			size += seg.len();
			ends.push(size);
			segments.push(seg.share(seg.len()));
		}
		Self { segments, ends, size, utf8: OnceCell::new() }
	}

	/// The number of bytes in the snapshot.
	pub fn len(&self) -> usize { self.size }
	/// `true` if the snapshot is empty.
	pub fn is_empty(&self) -> bool { self.size == 0 }

	/// Binary-searches the directory for the segment containing logical
	/// offset `index`, returning `(segment index, offset within it)`.
	fn locate(&self, index: usize) -> (usize, usize) {
		let seg_idx = self.ends.partition_point(|&end| end <= index);
		let start = if seg_idx == 0 { 0 } else { self.ends[seg_idx - 1] };
		(seg_idx, index - start)
	}

	/// Returns the byte at `index`, or `None` if out of range.
	pub fn get(&self, index: usize) -> Option<u8> {
		if index >= self.size { return None }
		let (seg_idx, offset) = self.locate(index);
		Some(self.segments[seg_idx].data()[offset])
	}

	/// `true` if the `other.len()` bytes starting at `offset` equal `other`.
	pub fn range_equals(&self, offset: usize, other: &[u8]) -> bool {
		if offset.checked_add(other.len()).is_none_or(|end| end > self.size) {
			return false
		}
		(0..other.len()).all(|i| self.get(offset + i) == Some(other[i]))
	}

	/// Linearizes the snapshot into a single contiguous owned byte string.
	pub fn to_byte_string(&self) -> ByteString {
		let mut out = Vec::with_capacity(self.size);
		for seg in &self.segments {
			out.extend_from_slice(&seg.data());
		}
		out.into()
	}

	/// Decodes the snapshot as UTF-8, caching the (necessarily copied,
	/// since the bytes aren't contiguous) result on first access.
	pub fn utf8(&self) -> Result<&str, OffsetUtf8Error> {
		if let Some(cached) = self.utf8.get() {
			return Ok(cached)
		}
		let linear = self.to_byte_string();
		let decoded = from_utf8(linear.as_slice())
			.map_err(|err| OffsetUtf8Error::new(err, 0))?
			.to_owned();
		Ok(self.utf8.get_or_init(|| decoded))
	}

	/// Encodes the snapshot into a lowercase hex string.
	pub fn hex_lower(&self) -> String { self.to_byte_string().hex_lower() }
	/// Encodes the snapshot into an uppercase hex string.
	pub fn hex_upper(&self) -> String { self.to_byte_string().hex_upper() }
	/// Encodes the snapshot into a Base64 string.
	pub fn base64(&self) -> String { self.to_byte_string().base64() }
	/// Encodes the snapshot into a Base64 URL string.
	pub fn base64_url(&self) -> String { self.to_byte_string().base64_url() }

	#[cfg(feature = "hash")]
	pub fn hash(&self, mut digest: impl digest::Digest) -> ByteString {
		for seg in &self.segments {
			digest.update(&*seg.data());
		}
		digest.finalize().as_slice().into()
	}

	#[cfg(feature = "hash")]
	pub fn md5(&self) -> ByteString { self.hash(md5::Md5::default()) }
	#[cfg(feature = "hash")]
	pub fn sha1(&self) -> ByteString { self.hash(sha1::Sha1::default()) }
	#[cfg(feature = "hash")]
	pub fn sha256(&self) -> ByteString { self.hash(sha2::Sha256::default()) }
	#[cfg(feature = "hash")]
	pub fn sha512(&self) -> ByteString { self.hash(sha2::Sha512::default()) }
}

impl Clone for SegmentedByteString {
	fn clone(&self) -> Self {
		Self {
			segments: self.segments.iter().map(|seg| seg.share(seg.len())).collect(),
			ends: self.ends.clone(),
			size: self.size,
			utf8: self.utf8.clone(),
		}
	}
}

impl PartialEq for SegmentedByteString {
	fn eq(&self, other: &Self) -> bool {
		self.size == other.size && self.range_equals_segmented(other)
	}
}

impl SegmentedByteString {
	fn range_equals_segmented(&self, other: &Self) -> bool {
		(0..self.size).all(|i| self.get(i) == other.get(i))
	}
}

impl Eq for SegmentedByteString { }

impl PartialEq<ByteString> for SegmentedByteString {
	fn eq(&self, other: &ByteString) -> bool {
		self.size == other.len() && self.range_equals(0, other.as_slice())
	}
}

impl PartialEq<SegmentedByteString> for ByteString {
	fn eq(&self, other: &SegmentedByteString) -> bool { other == self }
}

impl std::fmt::Debug for SegmentedByteString {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SegmentedByteString")
			.field("size", &self.size)
			.field("segments", &self.segments.len())
			.finish()
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use crate::Buffer;

	#[test]
	fn snapshot_shares_and_is_stable() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello").unwrap();
		let snap = buf.snapshot();
		buf.write_utf8("world").unwrap();

		assert_eq!(snap.utf8().unwrap(), "hello");
		assert_eq!(buf.snapshot().utf8().unwrap(), "helloworld");
	}

	#[test]
	fn get_and_range_equals() {
		let mut buf = Buffer::new();
		buf.write_from_slice(b"abcdef");
		let snap = buf.snapshot();
		assert_eq!(snap.get(0), Some(b'a'));
		assert_eq!(snap.get(5), Some(b'f'));
		assert_eq!(snap.get(6), None);
		assert!(snap.range_equals(2, b"cd"));
		assert!(!snap.range_equals(2, b"ce"));
	}
}
