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

//! ## How it works
//!
//! Data is written to and read from reusable bits of memory called *segments*.
//! When a segment is consumed, it's returned to a process-wide *pool*; to write
//! data, segments are claimed from that pool, falling back to a fresh
//! allocation when it's empty. The default pool is thread-local (a `RefCell`
//! per thread); with the `shared-pool` feature it's a single process-wide
//! cache behind a `parking_lot::Mutex` instead, trading a lock per claim for
//! memory reuse across threads.
//!
//! ### Segments
//!
//! Segments are fixed-capacity chunks of memory arranged in a ring. Memory
//! within a segment can be owned or shared between segments, avoiding memcopy
//! where possible: shared memory is copy-on-write, readable from many
//! segments but copied on the first write. Small reads under a threshold
//! (1024B by default) are copied rather than shared, trading a little memory
//! traffic for avoiding the allocation and refcounting overhead of a share.
//!
//! The ring behaves as a continuous byte deque: bytes are read from the front
//! and written to the back, claiming fresh segments from the pool as it
//! fills. As segments are emptied their backing arrays are returned to the
//! pool, and adjacent partially-filled segments are compacted into one where
//! it's cheap to do so.
//!
//! ### Everything else
//!
//! [`ByteString`] and [`ByteStr`] are immutable byte strings, flat and
//! borrowed-segmented respectively; [`SegmentedByteString`] is their owned,
//! Buffer-independent, shared-segment counterpart, produced by
//! [`Buffer::snapshot`]. [`streams`] defines the minimal [`Source`] and
//! [`Sink`] traits, their buffered wrappers, and a `void` pair of no-op
//! endpoints. [`Timeout`] and [`AsyncTimeout`] bound how long a blocking
//! operation may run; [`Pipe`] is a bounded in-memory channel between a
//! `Sink` and a `Source`.

mod buffer;
mod buffered_wrappers;
mod error;
pub mod streams;
mod segment;
pub mod pool;
mod byte_str;
mod timeout;
mod pipe;

/// The fixed capacity, in bytes, of every segment's backing array.
pub const SEGMENT_SIZE: usize = 8192;

pub use error::{Error, Result, OffsetUtf8Error};
pub use buffer::{Buffer, Options};
pub use buffer::cursor::UnsafeCursor;
pub use segment::Segment;
pub use byte_str::{ByteStr, ByteString, SegmentedByteString};
pub use streams::{Source, Sink};
pub use buffered_wrappers::{BufferedSource, BufferedSink, buffer_source, buffer_sink};
pub use timeout::{Timeout, AsyncTimeout};
pub use pipe::Pipe;
