// SPDX-License-Identifier: Apache-2.0

#![cfg(feature = "hash")]

use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use seg_io::Buffer;

#[quickcheck]
fn buffer_snapshot_hash_matches_byte_string(data: Vec<u8>) {
	let mut buf = Buffer::new();
	buf.write_from_slice(&data);
	let snapshot = buf.snapshot();
	let flat = snapshot.to_byte_string();

	assert_eq!(snapshot.md5(), flat.md5());
	assert_eq!(snapshot.sha1(), flat.sha1());
	assert_eq!(snapshot.sha256(), flat.sha256());
	assert_eq!(snapshot.sha512(), flat.sha512());
}

#[quickcheck]
fn hmac_matches_across_key_reuse(data: Vec<u8>, key: Vec<u8>) {
	let key = seg_io::ByteString::from(key.as_slice());
	let a = seg_io::ByteString::from(data.as_slice());
	let b = seg_io::ByteString::from(data.as_slice());
	assert_eq!(a.hmac_sha256(&key), b.hmac_sha256(&key));
}
