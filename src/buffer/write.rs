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

//! Byte, integer, and UTF-8 write primitives on [`Buffer`].

use crate::Buffer;
use crate::error::Result;

macro_rules! gen_int_writes {
	($($name:ident$le_name:ident$ty:ident),+ $(,)?) => {
		$(
		#[doc = concat!("Appends a big-endian `", stringify!($ty), "`.")]
		pub fn $name(&mut self, value: $ty) {
			self.push_slice(&value.to_be_bytes());
		}

		#[doc = concat!("Appends a little-endian `", stringify!($ty), "`.")]
		pub fn $le_name(&mut self, value: $ty) {
			self.push_slice(&value.to_le_bytes());
		}
		)+
	};
}

impl Buffer {
	/// Appends a single byte.
	pub fn write_u8(&mut self, value: u8) {
		self.push_slice(&[value]);
	}

	/// Appends a single signed byte.
	pub fn write_i8(&mut self, value: i8) {
		self.write_u8(value as u8);
	}

	gen_int_writes! {
		write_i16 write_i16_le i16,
		write_u16 write_u16_le u16,
		write_i32 write_i32_le i32,
		write_u32 write_u32_le u32,
		write_i64 write_i64_le i64,
		write_u64 write_u64_le u64,
	}

	/// Appends every byte of `value`.
	pub fn write_from_slice(&mut self, value: &[u8]) {
		self.push_slice(value);
	}

	/// Appends `value` encoded as UTF-8. Equivalent to
	/// `write_from_slice(value.as_bytes())`, since a Rust `str` is already
	/// guaranteed-valid UTF-8 — there's no surrogate or malformed-sequence
	/// case to handle here, unlike [`write_utf8_code_point`](Self::write_utf8_code_point).
	pub fn write_utf8(&mut self, value: &str) -> Result<usize> {
		self.push_slice(value.as_bytes());
		Ok(value.len())
	}

	/// Appends a slice of `value` bounded by `range`, encoded as UTF-8.
	pub fn write_utf8_range(&mut self, value: &str, range: std::ops::Range<usize>) -> Result<usize> {
		let len = range.len();
		self.push_slice(value[range].as_bytes());
		Ok(len)
	}

	/// Appends a single Unicode code point as UTF-8. A lone surrogate (which
	/// can't occur in a well-formed `char` but can arise from raw `u32`
	/// call sites) is replaced with `?`, matching the encoder's behavior for
	/// unpaired surrogate halves.
	pub fn write_utf8_code_point(&mut self, code_point: u32) {
		match char::from_u32(code_point) {
			Some(c) => {
				let mut buf = [0u8; 4];
				self.push_slice(c.encode_utf8(&mut buf).as_bytes());
			}
			None => self.push_slice(b"?"),
		}
	}

	/// Appends the decimal text representation of `value`.
	pub fn write_decimal_long(&mut self, value: i64) {
		let mut buf = itoa_buf();
		self.push_slice(format_decimal(value, &mut buf));
	}

	/// Appends the lowercase hexadecimal text representation of `value`,
	/// without a leading `0x` and without leading zeroes (except for `0`
	/// itself, which is written as `"0"`).
	pub fn write_hex_long(&mut self, value: u64) {
		let mut buf = itoa_buf();
		self.push_slice(format_hex(value, &mut buf));
	}
}

fn itoa_buf() -> [u8; 20] { [0u8; 20] }

fn format_decimal(value: i64, buf: &mut [u8; 20]) -> &[u8] {
	use std::io::Write;
	let mut cursor = &mut buf[..];
	write!(cursor, "{value}").expect("20 bytes is enough for any i64");
	let remaining = cursor.len();
	&buf[..buf.len() - remaining]
}

fn format_hex(value: u64, buf: &mut [u8; 20]) -> &[u8] {
	use std::io::Write;
	let mut cursor = &mut buf[..];
	write!(cursor, "{value:x}").expect("16 hex digits is enough for any u64");
	let remaining = cursor.len();
	&buf[..buf.len() - remaining]
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use crate::Buffer;

	#[test]
	fn write_integers_big_and_little_endian() {
		let mut buf = Buffer::new();
		buf.write_u32(0x01020304);
		buf.write_u32_le(0x01020304);
		assert_eq!(buf.to_vec(), [1, 2, 3, 4, 4, 3, 2, 1]);
	}

	#[test]
	fn write_utf8_code_point_lone_surrogate_is_question_mark() {
		let mut buf = Buffer::new();
		buf.write_utf8_code_point(0xD800);
		assert_eq!(buf.to_vec(), b"?");
	}

	#[test]
	fn write_utf8_code_point_valid() {
		let mut buf = Buffer::new();
		buf.write_utf8_code_point('€' as u32);
		assert_eq!(buf.to_vec(), "€".as_bytes());
	}

	#[test]
	fn write_decimal_and_hex_long() {
		let mut buf = Buffer::new();
		buf.write_decimal_long(-42);
		buf.write_hex_long(255);
		assert_eq!(buf.to_vec(), b"-42ff");
	}
}
