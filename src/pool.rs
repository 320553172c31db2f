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

//! The process-wide segment pool. Every [`Segment`](crate::Segment) array is
//! claimed from here and, once its last reference is dropped, returned here
//! for reuse. Pooling exists to avoid repeated zero-filled allocation under
//! load; correctness never depends on a pool hit; a pool that always
//! allocates is behaviorally equivalent, only slower.
//!
//! Two strategies are available, mirroring the teacher's own `shared-pool`
//! feature split:
//!
//! - the default is a thread-local cache (`LocalPool`): no locking, but
//!   segments claimed on one thread are only ever recycled back to that
//!   thread's cache;
//! - with the `shared-pool` feature, a single process-wide cache
//!   (`SharedPool`) is used instead, guarded by a `parking_lot::Mutex`. This
//!   lets threads that create and drop buffers in different places share
//!   recycled memory, at the cost of a lock per claim/recycle.
//!
//! Either way the cache is bounded to roughly `64 KiB` per CPU; entries
//! beyond the cap are simply dropped rather than retained.

use std::cell::RefCell;
use parking_lot::Mutex;
use once_cell::sync::Lazy;
use crate::SEGMENT_SIZE;

type Array = Box<[u8; SEGMENT_SIZE]>;

/// Upper bound, in segments, on how much memory a single cache bucket may
/// retain. `64 KiB` worth of segments at the canonical segment size.
const BUCKET_CAP: usize = (64 * 1024) / SEGMENT_SIZE + 1;

fn fresh_array() -> Array { Box::new([0; SEGMENT_SIZE]) }

thread_local! {
	static LOCAL: RefCell<Vec<Array>> = const { RefCell::new(Vec::new()) };
}

static SHARED: Lazy<Mutex<Vec<Array>>> = Lazy::new(|| Mutex::new(Vec::new()));

#[cfg(not(feature = "shared-pool"))]
pub(crate) fn take() -> Array {
	LOCAL.with(|cache| cache.borrow_mut().pop()).unwrap_or_else(fresh_array)
}

#[cfg(not(feature = "shared-pool"))]
pub(crate) fn recycle(array: Array) {
	LOCAL.with(|cache| {
		let mut cache = cache.borrow_mut();
		if cache.len() < BUCKET_CAP {
			cache.push(array);
		}
	});
}

#[cfg(feature = "shared-pool")]
pub(crate) fn take() -> Array {
	SHARED.lock().pop().unwrap_or_else(fresh_array)
}

#[cfg(feature = "shared-pool")]
pub(crate) fn recycle(array: Array) {
	let cap = BUCKET_CAP * num_cpus::get();
	let mut guard = SHARED.lock();
	if guard.len() < cap {
		guard.push(array);
	}
}

/// The number of segment-sized arrays currently retained by this thread's
/// (or, with `shared-pool`, the process's) cache. Exposed for tests and
/// diagnostics only; not part of the stable contract.
#[cfg(test)]
pub(crate) fn cached_len() -> usize {
	#[cfg(not(feature = "shared-pool"))]
	{ LOCAL.with(|cache| cache.borrow().len()) }
	#[cfg(feature = "shared-pool")]
	{ SHARED.lock().len() }
}
