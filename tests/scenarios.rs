// SPDX-License-Identifier: Apache-2.0

//! The concrete end-to-end scenarios: one test per scenario, named after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use pretty_assertions::assert_eq;
use seg_io::streams::{Sink, Source};
use seg_io::{AsyncTimeout, Buffer, Pipe, Timeout};

#[test]
fn hex_even() {
	let mut buf = Buffer::new();
	let bytes: Vec<u8> = (0..=255).collect();
	buf.write_from_slice(&bytes);
	let hex = buf.snapshot().hex_lower();
	assert_eq!(hex.len(), 512);
	assert_eq!(&hex[..6], "000102");
	assert_eq!(&hex[hex.len() - 2..], "ff");
}

#[test]
fn utf8_malformed() {
	let mut buf = Buffer::new();
	buf.write_from_slice(&[0xC0, 0x80]);
	let c = buf.read_utf8_code_point().unwrap();
	assert_eq!(c, '\u{FFFD}');
	assert!(buf.is_empty());
}

#[test]
fn big_decimal_overflow() {
	let mut buf = Buffer::new();
	buf.write_utf8("9223372036854775808").unwrap();
	let before = buf.to_vec();
	let err = buf.read_decimal_long().unwrap_err();
	assert!(matches!(err, seg_io::Error::NumberFormat(_)));
	assert_eq!(buf.to_vec(), before);
}

#[test]
fn pipe_backpressure() {
	let pipe = Pipe::new(8);
	let mut sink = pipe.sink();
	let mut source = pipe.source();

	let producer = std::thread::spawn(move || {
		let mut data = Buffer::new();
		data.write_from_slice(&(0u8..20).collect::<Vec<_>>());
		sink.write_all(&mut data).unwrap();
		sink.close().unwrap();
	});

	let mut received = Vec::new();
	loop {
		let mut chunk = Buffer::new();
		let n = source.read(&mut chunk, 1).unwrap();
		if n == 0 { break }
		received.push(chunk.to_vec()[0]);
		std::thread::sleep(Duration::from_millis(10));
	}

	producer.join().unwrap();
	assert_eq!(received, (0u8..20).collect::<Vec<_>>());
}

#[test]
fn async_timeout_interrupts_slow_read() {
	struct Sleepy {
		closed: Arc<AtomicBool>,
	}

	impl Source for Sleepy {
		fn read(&mut self, _sink: &mut Buffer, _byte_count: usize) -> seg_io::Result<usize> {
			let deadline = Instant::now() + Duration::from_secs(1);
			while Instant::now() < deadline {
				if self.closed.load(Ordering::SeqCst) {
					return Err(seg_io::Error::interrupted("read", None))
				}
				std::thread::sleep(Duration::from_millis(5));
			}
			Ok(0)
		}
	}

	let closed = Arc::new(AtomicBool::new(false));
	let mut source = Sleepy { closed: Arc::clone(&closed) };

	let mut timeout = AsyncTimeout::new();
	timeout.set_timeout(*Timeout::new().set_duration(Duration::from_millis(100)));

	let closed_for_timeout = Arc::clone(&closed);
	let guard = timeout.enter(move || closed_for_timeout.store(true, Ordering::SeqCst));

	let start = Instant::now();
	let result = source.read(&mut Buffer::new(), 1);
	let elapsed = start.elapsed();
	guard.exit();

	assert!(result.is_err(), "read should have been interrupted by the timeout");
	assert!(elapsed < Duration::from_millis(300), "took {elapsed:?}, expected ~120ms");
}

#[test]
fn snapshot_cow() {
	let mut buf = Buffer::new();
	buf.write_utf8("hello").unwrap();
	let snapshot = buf.snapshot();
	buf.write_utf8("world").unwrap();

	assert_eq!(snapshot.to_byte_string().as_slice(), b"hello");
	assert_eq!(buf.to_vec(), b"helloworld");
}
