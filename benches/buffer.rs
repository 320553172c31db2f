// SPDX-License-Identifier: Apache-2.0

use std::mem;
use criterion::{BatchSize, Bencher, black_box, Criterion, criterion_group, criterion_main};
use seg_io::{Buffer, SEGMENT_SIZE};

/// Deterministic filler data spanning several segments, without relying on a
/// test-data corpus the teacher's benches had but this workspace doesn't.
fn sample_data() -> Vec<u8> {
	(0..SEGMENT_SIZE * 4).map(|i| (i % 251) as u8).collect()
}

fn write_slice(c: &mut Criterion) {
	let data = sample_data();
	c.bench_function("write_slice", |b| b.iter(|| {
		let mut buf = Buffer::new();
		buf.write_from_slice(&data);
		buf
	}));
}

fn write_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_numbers");
	let mut buffer = Buffer::new();

	macro_rules! gen {
		($($fn:ident $ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b| b.iter(|| {
				for _ in 0..SEGMENT_SIZE / mem::size_of::<$ty>() {
					black_box(buffer.$fn($ty::MAX));
				}
				buffer.clear();
			}));
			)+
		};
	}

	gen!(
		write_u16 u16,
		write_u16_le u16,
		write_u32 u32,
		write_u32_le u32,
		write_u64 u64,
		write_u64_le u64
	);
	group.finish();
}

#[inline(always)]
fn read_loop<R>(b: &mut Bencher, buf: &Buffer, read: impl FnMut(&mut Buffer) -> R) {
	b.iter_batched_ref(|| buffer_clone(buf), read, BatchSize::SmallInput);
}

/// `Buffer` doesn't derive `Clone` (segments are a moving ring, not meant to
/// be duplicated casually); round-tripping through a snapshot gives each
/// iteration its own buffer without reaching for internals.
fn buffer_clone(buf: &Buffer) -> Buffer {
	let mut clone = Buffer::new();
	clone.write_from_slice(&buf.to_vec());
	clone
}

fn read_slice(c: &mut Criterion) {
	let data = sample_data();
	let mut buffer = Buffer::new();
	buffer.write_from_slice(&data);
	let mut target = vec![0u8; data.len()];
	c.bench_function("read_slice", |b|
		read_loop(b, &buffer, |buf| buf.read_into_slice_exact(&mut target))
	);
}

fn read_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("read_numbers");
	let mut buffer = Buffer::new();
	for _ in 0..SEGMENT_SIZE / 8 {
		buffer.write_u64(u64::MAX);
	}

	macro_rules! gen {
		($($fn:ident $ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b|
				read_loop(b, &buffer, |buf|
					for _ in 0..SEGMENT_SIZE / mem::size_of::<$ty>() {
						let _ = black_box(buf.$fn());
					}
				)
			);
			)+
		};
	}

	gen!(
		read_u16 u16,
		read_u16_le u16,
		read_u32 u32,
		read_u32_le u32,
		read_u64 u64,
		read_u64_le u64
	);
	group.finish();
}

fn skip(c: &mut Criterion) {
	let mut group = c.benchmark_group("skip");
	let data = sample_data();
	let mut buffer = Buffer::new();
	buffer.write_from_slice(&data);

	group.bench_function("skip all", |b|
		read_loop(b, &buffer, |buf| buf.skip(data.len()))
	);
	group.bench_function("skip one segment", |b|
		read_loop(b, &buffer, |buf| buf.skip(SEGMENT_SIZE))
	);
	group.bench_function("skip partial", |b|
		read_loop(b, &buffer, |buf| buf.skip(4096))
	);
	group.finish();
}

fn find(c: &mut Criterion) {
	let mut group = c.benchmark_group("find");
	let data = sample_data();
	let mut buffer = Buffer::new();
	buffer.write_from_slice(&data);

	group.bench_function("index_of byte", |b| b.iter(|| buffer.index_of(&[b'\0'], 0)));
	group.bench_function("index_of short needle", |b| b.iter(|| buffer.index_of(b"\x05\x06\x07", 0)));
	group.bench_function("index_of_element set", |b| b.iter(|| buffer.index_of_element(b"\x01\x02\x03", 0)));
	group.finish();
}

#[cfg(feature = "hash")]
fn hash(c: &mut Criterion) {
	let data = sample_data();
	let mut buffer = Buffer::new();
	buffer.write_from_slice(&data);
	let snapshot = buffer.snapshot();
	c.bench_function("sha256", |b| b.iter(|| black_box(snapshot.sha256())));
}

criterion_group!(write, write_slice, write_numbers);
#[cfg(feature = "hash")]
criterion_group!(read, read_slice, read_numbers, skip, find, hash);
#[cfg(not(feature = "hash"))]
criterion_group!(read, read_slice, read_numbers, skip, find);
criterion_main!(write, read);
