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

//! The error taxonomy used throughout the crate. Every fallible operation on
//! [`Segment`](crate::Segment), [`Buffer`](crate::Buffer), [`ByteString`](crate::ByteString),
//! streams, and [`Pipe`](crate::Pipe) returns one of these variants.

use std::io;
use thiserror::Error;

pub mod utf8;
pub use utf8::OffsetUtf8Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

/// The crate's unified error type. Each variant corresponds to one entry in
/// the error taxonomy: source exhaustion, underlying-resource failure,
/// cancellation, malformed numeric text, and API misuse.
#[derive(Debug, Error)]
pub enum Error {
	/// The source was exhausted before the required byte count was read.
	#[error("end of input: needed {needed} more byte(s)")]
	EndOfInput { needed: usize },

	/// The underlying file, socket, or pipe reported a failure.
	#[error("io failure during {operation}")]
	Io {
		operation: &'static str,
		#[source]
		source: io::Error,
	},

	/// A blocking operation was interrupted, either by thread interruption
	/// or by an [`AsyncTimeout`](crate::AsyncTimeout) deadline firing.
	#[error("interrupted during {operation}")]
	InterruptedIo {
		operation: &'static str,
		#[source]
		source: Option<io::Error>,
	},

	/// Specialization of [`InterruptedIo`](Self::InterruptedIo) for
	/// socket-backed streams.
	#[error("socket timed out during {operation}")]
	SocketTimeout { operation: &'static str },

	/// A decimal or hexadecimal integer parse failed, either on a malformed
	/// digit or on overflow.
	#[error("malformed number: {0}")]
	NumberFormat(String),

	/// The byte sequence was not valid UTF-8.
	#[error("invalid utf-8 at byte {0}")]
	InvalidUtf8(
		#[source]
		#[from]
		OffsetUtf8Error,
	),

	/// An operation was attempted on a closed stream, an unbalanced
	/// `enter`/`exit` pair, or a detached [`UnsafeCursor`](crate::buffer::UnsafeCursor).
	#[error("illegal state: {0}")]
	IllegalState(&'static str),

	/// An out-of-range offset/count, or an invalid/duplicate/empty
	/// [`Options`](crate::buffer::Options) alternative.
	#[error("illegal argument: {0}")]
	IllegalArgument(String),
}

impl Error {
	pub fn end_of_input(needed: usize) -> Self { Self::EndOfInput { needed } }

	pub fn io(operation: &'static str, source: io::Error) -> Self {
		Self::Io { operation, source }
	}

	pub fn interrupted(operation: &'static str, source: Option<io::Error>) -> Self {
		Self::InterruptedIo { operation, source }
	}

	pub fn socket_timeout(operation: &'static str) -> Self {
		Self::SocketTimeout { operation }
	}

	pub fn number_format(message: impl Into<String>) -> Self {
		Self::NumberFormat(message.into())
	}

	pub fn illegal_state(message: &'static str) -> Self { Self::IllegalState(message) }

	pub fn illegal_argument(message: impl Into<String>) -> Self {
		Self::IllegalArgument(message.into())
	}

	/// Returns `true` if this error represents an end-of-stream condition,
	/// as opposed to a hard failure.
	pub fn is_end_of_input(&self) -> bool { matches!(self, Self::EndOfInput { .. }) }
}

impl From<io::Error> for Error {
	fn from(value: io::Error) -> Self {
		if value.kind() == io::ErrorKind::UnexpectedEof {
			Self::end_of_input(0)
		} else {
			Self::io("stream operation", value)
		}
	}
}

/// Converts this error back into a [`std::io::Error`], used at the boundary
/// where a stream adapter must satisfy `std::io::{Read, Write}`.
impl From<Error> for io::Error {
	fn from(value: Error) -> Self {
		match value {
			Error::EndOfInput { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, value.to_string()),
			Error::Io { ref source, .. } => io::Error::new(source.kind(), value.to_string()),
			Error::InterruptedIo { .. } | Error::SocketTimeout { .. } =>
				io::Error::new(io::ErrorKind::TimedOut, value.to_string()),
			_ => io::Error::other(value.to_string()),
		}
	}
}
