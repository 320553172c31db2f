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

//! Byte, integer, UTF-8, and text-number read primitives on [`Buffer`].

use simdutf8::compat::from_utf8;
use crate::Buffer;
use crate::error::{Error, Result};
use crate::error::OffsetUtf8Error;
use crate::ByteString;

macro_rules! gen_int_reads {
	($($s_name:ident$s_le_name:ident$s_ty:ident$u_name:ident$u_le_name:ident$u_ty:ident),+ $(,)?) => {
		$(
		#[doc = concat!("Reads a big-endian `", stringify!($s_ty), "`.")]
		pub fn $s_name(&mut self) -> Result<$s_ty> {
			self.$u_name().map(|n| n as $s_ty)
		}

		#[doc = concat!("Reads a little-endian `", stringify!($s_ty), "`.")]
		pub fn $s_le_name(&mut self) -> Result<$s_ty> {
			self.$u_le_name().map(|n| n as $s_ty)
		}

		#[doc = concat!("Reads a big-endian `", stringify!($u_ty), "`.")]
		pub fn $u_name(&mut self) -> Result<$u_ty> {
			let mut bytes = [0u8; std::mem::size_of::<$u_ty>()];
			self.read_into_slice_exact(&mut bytes)?;
			Ok($u_ty::from_be_bytes(bytes))
		}

		#[doc = concat!("Reads a little-endian `", stringify!($u_ty), "`.")]
		pub fn $u_le_name(&mut self) -> Result<$u_ty> {
			let mut bytes = [0u8; std::mem::size_of::<$u_ty>()];
			self.read_into_slice_exact(&mut bytes)?;
			Ok($u_ty::from_le_bytes(bytes))
		}
		)+
	};
}

impl Buffer {
	/// Errors with [`Error::EndOfInput`] if fewer than `byte_count` bytes are
	/// buffered.
	pub fn require(&self, byte_count: usize) -> Result<()> {
		let available = self.len();
		if available < byte_count {
			Err(Error::end_of_input(byte_count - available))
		} else {
			Ok(())
		}
	}

	/// Reads a single byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		self.require(1)?;
		let mut byte = 0u8;
		self.drain(1, |data| byte = data[0]);
		Ok(byte)
	}

	/// Reads a single signed byte.
	pub fn read_i8(&mut self) -> Result<i8> {
		self.read_u8().map(|n| n as i8)
	}

	gen_int_reads! {
		read_i16 read_i16_le i16 read_u16 read_u16_le u16,
		read_i32 read_i32_le i32 read_u32 read_u32_le u32,
		read_i64 read_i64_le i64 read_u64 read_u64_le u64,
	}

	/// Reads exactly `dst.len()` bytes, erroring with
	/// [`Error::EndOfInput`] if fewer are buffered.
	pub fn read_into_slice_exact(&mut self, dst: &mut [u8]) -> Result<()> {
		self.require(dst.len())?;
		let mut offset = 0;
		self.drain(dst.len(), |data| {
			dst[offset..offset + data.len()].copy_from_slice(data);
			offset += data.len();
		});
		Ok(())
	}

	/// Reads up to `dst.len()` bytes, returning the number actually read
	/// (which is less than `dst.len()` only if the buffer was exhausted).
	pub fn read_into_slice(&mut self, dst: &mut [u8]) -> usize {
		let mut offset = 0;
		let n = self.drain(dst.len(), |data| {
			dst[offset..offset + data.len()].copy_from_slice(data);
			offset += data.len();
		});
		n
	}

	/// Reads exactly `byte_count` bytes into a new [`ByteString`], erroring
	/// with [`Error::EndOfInput`] if fewer are buffered.
	pub fn read_byte_str(&mut self, byte_count: usize) -> Result<ByteString> {
		self.require(byte_count)?;
		let mut dst = ByteString::with_capacity(byte_count);
		self.drain(byte_count, |data| dst.extend_from_slice(data));
		Ok(dst)
	}

	/// Decodes exactly `byte_count` bytes as UTF-8, erroring with
	/// [`Error::InvalidUtf8`] on malformed input or [`Error::EndOfInput`] if
	/// fewer bytes are buffered. A sequence that's valid but incomplete at
	/// the requested boundary is reported as end-of-input rather than
	/// consumed partially.
	pub fn read_utf8(&mut self, byte_count: usize) -> Result<String> {
		self.require(byte_count)?;
		let bytes = self.peek_bytes(byte_count);
		match from_utf8(&bytes) {
			Ok(text) => {
				let text = text.to_owned();
				self.skip(byte_count);
				Ok(text)
			}
			Err(err) => Err(Error::InvalidUtf8(OffsetUtf8Error::new(err, 0))),
		}
	}

	/// Decodes every buffered byte as UTF-8, consuming the buffer.
	pub fn read_all_utf8(&mut self) -> Result<String> {
		self.read_utf8(self.len())
	}

	fn peek_bytes(&self, byte_count: usize) -> Vec<u8> {
		let mut out = Vec::with_capacity(byte_count);
		let mut remaining = byte_count;
		for seg in self.ring.iter() {
			if remaining == 0 { break }
			let take = remaining.min(seg.len());
			out.extend_from_slice(&seg.data()[..take]);
			remaining -= take;
		}
		out
	}

	/// Reads a line terminated by `\n` or `\r\n`, not including the
	/// terminator. If the buffer is exhausted without finding a terminator,
	/// the remainder is returned as the last line (`Ok(Some(..))`), and a
	/// subsequent call on the now-empty buffer returns `Ok(None)`.
	pub fn read_utf8_line(&mut self) -> Result<Option<String>> {
		if self.is_empty() { return Ok(None) }

		match self.index_of(b"\n", 0) {
			Some(mut newline) => {
				let mut term_len = 1;
				if newline > 0 && self.get(newline - 1) == Some(b'\r') {
					newline -= 1;
					term_len += 1;
				}
				let line = self.read_utf8(newline)?;
				self.skip(term_len);
				Ok(Some(line))
			}
			None => self.read_all_utf8().map(Some),
		}
	}

	/// Like [`read_utf8_line`](Self::read_utf8_line), but errors with
	/// [`Error::EndOfInput`] instead of returning a partial final line when
	/// no terminator is found.
	pub fn read_utf8_line_strict(&mut self) -> Result<String> {
		match self.index_of(b"\n", 0) {
			Some(mut newline) => {
				let mut term_len = 1;
				if newline > 0 && self.get(newline - 1) == Some(b'\r') {
					newline -= 1;
					term_len += 1;
				}
				let line = self.read_utf8(newline)?;
				self.skip(term_len);
				Ok(line)
			}
			None => Err(Error::end_of_input(1)),
		}
	}

	/// Reads a run of optionally `-`-prefixed decimal digits and parses it
	/// as an `i64`, erroring with [`Error::NumberFormat`] on a non-digit
	/// character or overflow.
	pub fn read_decimal_long(&mut self) -> Result<i64> {
		let end = self.decimal_run_end();
		self.parse_and_skip(end, 10, true)
	}

	/// Reads a run of hexadecimal digits and parses it as a `u64`, erroring
	/// with [`Error::NumberFormat`] on a non-digit character or overflow.
	pub fn read_hex_long(&mut self) -> Result<u64> {
		let end = self.hex_run_end();
		let bytes = self.peek_bytes(end);
		let text = std::str::from_utf8(&bytes).expect("hex digit runs are ASCII");
		let value = u64::from_str_radix(text, 16)
			.map_err(|e| Error::number_format(format!("{text:?}: {e}")))?;
		self.skip(end);
		Ok(value)
	}

	/// Decodes a single UTF-8 code point, consuming 1 to 4 bytes.
	/// [`Error::EndOfInput`] is raised only if fewer bytes are buffered than
	/// the leading byte requires; a structurally complete but invalid
	/// sequence (overlong encoding, an encoded surrogate, a code point past
	/// `U+10FFFF`, or a bad continuation byte) decodes as the replacement
	/// character U+FFFD instead of erroring, consuming only the malformed
	/// prefix so the next call resynchronizes on the following byte.
	pub fn read_utf8_code_point(&mut self) -> Result<char> {
		self.require(1)?;
		let lead = self.get(0).unwrap();

		let (len, mut value) = if lead & 0x80 == 0 {
			self.skip(1);
			return Ok(lead as char)
		} else if lead & 0xE0 == 0xC0 {
			(2, (lead & 0x1F) as u32)
		} else if lead & 0xF0 == 0xE0 {
			(3, (lead & 0x0F) as u32)
		} else if lead & 0xF8 == 0xF0 {
			(4, (lead & 0x07) as u32)
		} else {
			// Stray continuation byte or an out-of-range lead byte (0xF8..=0xFF).
			self.skip(1);
			return Ok('\u{FFFD}')
		};

		self.require(len)?;

		let mut consumed = 1;
		for i in 1..len {
			let byte = self.get(i).unwrap();
			if byte & 0xC0 != 0x80 {
				self.skip(consumed);
				return Ok('\u{FFFD}')
			}
			value = (value << 6) | (byte & 0x3F) as u32;
			consumed += 1;
		}
		self.skip(len);

		let min_value = match len { 2 => 0x80, 3 => 0x800, _ => 0x10000 };
		if value < min_value || (0xD800..=0xDFFF).contains(&value) || value > 0x10FFFF {
			return Ok('\u{FFFD}')
		}

		Ok(char::from_u32(value).unwrap_or('\u{FFFD}'))
	}

	/// Length of the leading run of optionally `-`-prefixed ASCII decimal
	/// digits. Stops at the first byte that isn't `0`-`9` (or `-` at
	/// offset 0), so a hex letter immediately following a decimal run
	/// (`"12ab"`) doesn't get swallowed into it.
	fn decimal_run_end(&self) -> usize {
		let mut end = 0;
		let len = self.len();
		while end < len {
			let Some(byte) = self.get(end) else { break };
			let ok = byte.is_ascii_digit() || (end == 0 && byte == b'-');
			if !ok { break }
			end += 1;
		}
		end
	}

	/// Length of the leading run of ASCII hex digits.
	fn hex_run_end(&self) -> usize {
		let mut end = 0;
		let len = self.len();
		while end < len {
			let Some(byte) = self.get(end) else { break };
			if !byte.is_ascii_hexdigit() { break }
			end += 1;
		}
		end
	}

	/// Parses the first `end` buffered bytes as a decimal/hex run without
	/// consuming them, then skips past them only on success — an overflow
	/// or malformed run is left untouched in the buffer.
	fn parse_and_skip(&mut self, end: usize, radix: u32, signed: bool) -> Result<i64> {
		let bytes = self.peek_bytes(end);
		let text = std::str::from_utf8(&bytes).expect("digit runs are ASCII");
		let value = if signed {
			text.parse::<i64>().map_err(|e| Error::number_format(format!("{text:?}: {e}")))?
		} else {
			i64::from_str_radix(text, radix).map_err(|e| Error::number_format(format!("{text:?}: {e}")))?
		};
		self.skip(end);
		Ok(value)
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use crate::Buffer;

	#[test]
	fn read_integers_big_and_little_endian() {
		let mut buf = Buffer::new();
		buf.write_u32(0x01020304);
		assert_eq!(buf.read_u32().unwrap(), 0x01020304);

		buf.write_u32_le(0x01020304);
		assert_eq!(buf.read_u32_le().unwrap(), 0x01020304);
	}

	#[test]
	fn require_reports_deficit() {
		let buf = Buffer::new();
		let err = buf.require(4).unwrap_err();
		assert!(err.is_end_of_input());
	}

	#[test]
	fn read_utf8_line_handles_crlf_and_lf_and_partial_tail() {
		let mut buf = Buffer::new();
		buf.write_utf8("one\r\ntwo\nthree").unwrap();
		assert_eq!(buf.read_utf8_line().unwrap().as_deref(), Some("one"));
		assert_eq!(buf.read_utf8_line().unwrap().as_deref(), Some("two"));
		assert_eq!(buf.read_utf8_line().unwrap().as_deref(), Some("three"));
		assert_eq!(buf.read_utf8_line().unwrap(), None);
	}

	#[test]
	fn read_utf8_line_strict_errors_without_terminator() {
		let mut buf = Buffer::new();
		buf.write_utf8("no newline here").unwrap();
		assert!(buf.read_utf8_line_strict().is_err());
	}

	#[test]
	fn read_decimal_long_overflow_is_number_format_error() {
		let mut buf = Buffer::new();
		buf.write_utf8("9223372036854775808").unwrap();
		let before = buf.len();
		let err = buf.read_decimal_long().unwrap_err();
		assert!(matches!(err, crate::Error::NumberFormat(_)));
		assert_eq!(buf.len(), before, "a failed parse must not consume the buffer");
	}

	#[test]
	fn read_decimal_long_stops_before_trailing_hex_letters() {
		let mut buf = Buffer::new();
		buf.write_utf8("255abc").unwrap();
		assert_eq!(buf.read_decimal_long().unwrap(), 255);
		assert_eq!(buf.to_vec(), b"abc");
	}

	#[test]
	fn read_hex_long_roundtrip() {
		let mut buf = Buffer::new();
		buf.write_hex_long(0xDEADBEEF);
		assert_eq!(buf.read_hex_long().unwrap(), 0xDEADBEEF);
	}

	#[test]
	fn read_utf8_code_point_overlong_is_replacement_char() {
		let mut buf = Buffer::new();
		buf.push_slice(&[0xC0, 0x80]);
		let c = buf.read_utf8_code_point().unwrap();
		assert_eq!(c, '\u{FFFD}');
		assert!(buf.is_empty(), "both bytes of the overlong sequence should be consumed");
	}

	#[test]
	fn read_utf8_code_point_valid_ascii_and_multibyte() {
		let mut buf = Buffer::new();
		buf.write_utf8("aé").unwrap();
		assert_eq!(buf.read_utf8_code_point().unwrap(), 'a');
		assert_eq!(buf.read_utf8_code_point().unwrap(), 'é');
		assert!(buf.is_empty());
	}
}
