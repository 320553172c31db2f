// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use seg_io::streams::{Sink, Source};
use seg_io::streams::void::void_sink;
use seg_io::{Buffer, Pipe, buffer_sink, buffer_source};

struct VecSource {
	data: Vec<u8>,
	pos: usize,
}

impl Source for VecSource {
	fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> seg_io::Result<usize> {
		let remaining = &self.data[self.pos..];
		if remaining.is_empty() { return Ok(0) }
		let n = byte_count.min(remaining.len());
		sink.write_from_slice(&remaining[..n]);
		self.pos += n;
		Ok(n)
	}
}

#[test]
fn buffered_source_requires_and_reads_lines() {
	let mut source = buffer_source(VecSource { data: b"alpha\nbeta\n".to_vec(), pos: 0 });
	source.require(5).unwrap();
	assert_eq!(source.buf_mut().read_utf8_line().unwrap().as_deref(), Some("alpha"));
	assert_eq!(source.buf_mut().read_utf8_line().unwrap().as_deref(), Some("beta"));
	assert_eq!(source.buf_mut().read_utf8_line().unwrap(), None);
}

#[test]
fn buffered_sink_emits_complete_segments_only() {
	let mut sink = buffer_sink(void_sink());
	let big = vec![0xAAu8; seg_io::SEGMENT_SIZE * 2 + 5];
	let mut src = Buffer::new();
	src.write_from_slice(&big);
	sink.write(&mut src, big.len()).unwrap();
	assert_eq!(sink.buf().len(), 5, "only the partial tail segment should remain buffered");
}

#[test]
fn pipe_fold_drains_into_a_sink() {
	use std::sync::{Arc, Mutex};

	struct Collector(Arc<Mutex<Vec<u8>>>);
	impl Sink for Collector {
		fn write(&mut self, source: &mut Buffer, byte_count: usize) -> seg_io::Result<usize> {
			let n = byte_count.min(source.len());
			self.0.lock().unwrap().extend_from_slice(&source.to_vec()[..n]);
			source.skip(n);
			Ok(n)
		}
	}

	let pipe = Pipe::new(1024);
	let mut sink = pipe.sink();
	let producer = std::thread::spawn(move || {
		let mut data = Buffer::new();
		data.write_from_slice(b"folded through a pipe");
		sink.write_all(&mut data).unwrap();
		sink.close().unwrap();
	});

	let collected = Arc::new(Mutex::new(Vec::new()));
	let n = pipe.fold(Collector(Arc::clone(&collected))).unwrap();
	producer.join().unwrap();

	assert_eq!(n, 22);
	assert_eq!(*collected.lock().unwrap(), b"folded through a pipe");
}
