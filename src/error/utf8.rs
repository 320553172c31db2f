// SPDX-License-Identifier: Apache-2.0

use simdutf8::compat;
use thiserror::Error;

/// A UTF-8 decode error located at a byte offset into a (possibly segmented)
/// source. Carries the inner `simdutf8` error plus the offset of the
/// fragment it occurred in, so the offset reported to callers is relative to
/// the whole decode, not just the current segment.
#[derive(Copy, Clone, Debug, Error)]
#[error("{} utf-8 byte sequence from index {}", if self.error_len().is_some() { "invalid" } else { "incomplete" }, self.valid_up_to())]
pub struct OffsetUtf8Error {
	inner: compat::Utf8Error,
	offset: usize,
}

impl OffsetUtf8Error {
	pub(crate) fn new(inner: compat::Utf8Error, offset: usize) -> Self {
		Self { inner, offset }
	}

	pub fn into_inner(self) -> compat::Utf8Error { self.inner }

	/// The index, relative to the start of the whole decode, up to which the
	/// bytes were valid UTF-8.
	pub fn valid_up_to(&self) -> usize { self.offset + self.inner.valid_up_to() }

	/// The length of the invalid byte sequence, or `None` if the error is
	/// just an incomplete trailing sequence (more bytes were needed).
	pub fn error_len(&self) -> Option<usize> { self.inner.error_len() }
}
