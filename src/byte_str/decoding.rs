// SPDX-License-Identifier: Apache-2.0

use base64::prelude::{BASE64_STANDARD_NO_PAD, BASE64_URL_SAFE_NO_PAD};
use super::ByteString;

impl ByteString {
	/// Decodes base64-encoded bytes, appending the result to this byte string.
	pub fn decode_base64<T: AsRef<[u8]>>(&mut self, input: T) -> Result<(), base64::DecodeError> {
		self.decode_base64_with(input, &BASE64_STANDARD_NO_PAD)
	}

	/// Decodes URL-safe base64-encoded bytes, appending the result to this
	/// byte string.
	pub fn decode_base64_url<T: AsRef<[u8]>>(&mut self, input: T) -> Result<(), base64::DecodeError> {
		self.decode_base64_with(input, &BASE64_URL_SAFE_NO_PAD)
	}

	/// Decodes base64-encoded bytes with a custom `decoder`, appending the
	/// result to this byte string.
	pub fn decode_base64_with<T: AsRef<[u8]>>(&mut self, input: T, decoder: &impl base64::Engine) -> Result<(), base64::DecodeError> {
		decoder.decode_vec(input, &mut self.data)
	}

	/// Decodes hex bytes, appending the result to this byte string. Accepts
	/// a mix of uppercase and lowercase digits.
	pub fn decode_hex<T: AsRef<[u8]>>(&mut self, input: T) -> Result<(), base16ct::Error> {
		self.extend_from_slice(Self::from_hex(input)?.as_slice());
		Ok(())
	}

	/// Decodes base64-encoded bytes into a new byte string.
	pub fn from_base64<T: AsRef<[u8]>>(input: T) -> Result<Self, base64::DecodeError> {
		Self::from_base64_with(input, &BASE64_STANDARD_NO_PAD)
	}

	/// Decodes URL-safe base64-encoded bytes into a new byte string.
	pub fn from_base64_url<T: AsRef<[u8]>>(input: T) -> Result<Self, base64::DecodeError> {
		Self::from_base64_with(input, &BASE64_URL_SAFE_NO_PAD)
	}

	/// Decodes base64-encoded bytes into a new byte string with a custom
	/// `decoder`.
	pub fn from_base64_with<T: AsRef<[u8]>>(input: T, decoder: &impl base64::Engine) -> Result<Self, base64::DecodeError> {
		decoder.decode(input).map(Into::into)
	}

	/// Decodes hex bytes into a new byte string. Accepts a mix of uppercase
	/// and lowercase digits.
	pub fn from_hex<T: AsRef<[u8]>>(input: T) -> Result<Self, base16ct::Error> {
		base16ct::mixed::decode_vec(input).map(Into::into)
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;
	use quickcheck_macros::quickcheck;
	use crate::ByteString;

	#[quickcheck]
	fn hex_round_trips(data: Vec<u8>) {
		let bs = ByteString::from(data.as_slice());
		assert_eq!(ByteString::from_hex(bs.hex_lower()).unwrap(), bs);
		assert_eq!(ByteString::from_hex(bs.hex_upper()).unwrap(), bs);
	}

	#[quickcheck]
	fn base64_round_trips(data: Vec<u8>) {
		let bs = ByteString::from(data.as_slice());
		assert_eq!(ByteString::from_base64(bs.base64()).unwrap(), bs);
		assert_eq!(ByteString::from_base64_url(bs.base64_url()).unwrap(), bs);
	}

	#[test]
	fn decode_hex_appends_to_existing_contents() {
		let mut bs = ByteString::from(b"ab".as_slice());
		bs.decode_hex("6364").unwrap();
		assert_eq!(bs.as_slice(), b"abcd");
	}

	#[test]
	fn from_hex_rejects_malformed_input() {
		assert!(ByteString::from_hex("xy").is_err());
	}
}
