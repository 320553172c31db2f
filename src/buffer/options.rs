// SPDX-License-Identifier: Apache-2.0

//! [`Options`] is a fixed set of candidate byte strings that
//! [`Buffer::select`](super::Buffer::select) matches against the front of a
//! buffer in a single pass, letting a parser pick among several expected
//! tokens without probing them one at a time.

use crate::error::{Error, Result};
use crate::ByteString;

/// A set of candidate byte strings to match against the start of a buffer.
/// Constructed once and reused across many [`select`](super::Buffer::select)
/// calls, the way a parser's keyword table would be.
#[derive(Clone, Debug)]
pub struct Options {
	candidates: Vec<ByteString>,
}

impl Options {
	/// Builds a new option set from `candidates`, in priority order: when
	/// more than one candidate matches, the longest match wins, and ties
	/// between equal-length matches are broken by whichever was listed
	/// first.
	pub fn new(candidates: Vec<ByteString>) -> Result<Self> {
		if candidates.is_empty() {
			return Err(Error::illegal_argument("Options requires at least one candidate"))
		}
		Ok(Self { candidates })
	}

	/// The number of candidates.
	pub fn len(&self) -> usize { self.candidates.len() }

	/// `true` if there are no candidates. Only reachable via
	/// [`Default`](Options::new)-bypassing construction; [`new`](Self::new)
	/// rejects an empty set.
	pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

	pub(crate) fn candidates(&self) -> &[ByteString] { &self.candidates }
}

impl super::Buffer {
	/// Matches [`Options`]'s candidates against the front of the buffer. On
	/// a match, consumes the matched bytes and returns its index in
	/// `options`; on no match, consumes nothing and returns `None`.
	pub fn select(&mut self, options: &Options) -> Option<usize> {
		let mut best: Option<(usize, usize)> = None; // (candidate index, length)
		for (index, candidate) in options.candidates().iter().enumerate() {
			let bytes = candidate.as_slice();
			if bytes.len() > self.len() { continue }
			if !self.range_equals(0, bytes) { continue }
			match best {
				Some((_, best_len)) if best_len >= bytes.len() => {}
				_ => best = Some((index, bytes.len())),
			}
		}

		if let Some((index, len)) = best {
			self.skip(len);
			Some(index)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use crate::{Buffer, ByteString};
	use super::Options;

	fn opts(words: &[&str]) -> Options {
		Options::new(words.iter().map(|w| ByteString::from(w.as_bytes())).collect()).unwrap()
	}

	#[test]
	fn select_picks_longest_match() {
		let options = opts(&["a", "ab", "abc"]);
		let mut buf = Buffer::new();
		buf.write_utf8("abcd").unwrap();
		assert_eq!(buf.select(&options), Some(2));
		assert_eq!(buf.to_vec(), b"d");
	}

	#[test]
	fn select_returns_none_on_no_match() {
		let options = opts(&["foo", "bar"]);
		let mut buf = Buffer::new();
		buf.write_utf8("baz").unwrap();
		assert_eq!(buf.select(&options), None);
		assert_eq!(buf.len(), 3, "buffer should be untouched on no match");
	}

	#[test]
	fn empty_options_is_rejected() {
		assert!(Options::new(Vec::new()).is_err());
	}
}
