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

//! The raw, sharable backing array for a [`Segment`](super::Segment). A
//! [`Memory`] is a reference-counted, fixed-capacity byte array; cloning it
//! (via [`Memory::share`]) is O(1) and produces a second handle to the same
//! bytes. Mutation is copy-on-write: [`Memory::fork_in_place`] must be called
//! before any in-place rewrite of already-written bytes once more than one
//! handle exists.
//!
//! Arrays are not allocated directly; they're claimed from and returned to
//! the process-wide [`pool`](crate::pool), which is what lets a Buffer that
//! churns through many segments avoid repeated allocation.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use crate::pool;
use crate::SEGMENT_SIZE;

/// A fixed-capacity byte array, reference-counted so segments and
/// [`SegmentedByteString`](crate::byte_str::SegmentedByteString)s can share
/// the same bytes instead of copying them.
#[derive(Clone)]
pub(crate) struct Memory {
	array: Rc<RefCell<Box<[u8; SEGMENT_SIZE]>>>,
}

impl Memory {
	/// Claims an array from the pool (or allocates one if the pool is
	/// empty).
	pub fn fresh() -> Self {
		Self { array: Rc::new(RefCell::new(pool::take())) }
	}

	/// Returns `true` if more than one [`Segment`](super::Segment) or
	/// [`ByteString`](crate::ByteString) currently references this array.
	pub fn is_shared(&self) -> bool { Rc::strong_count(&self.array) > 1 }

	/// Returns a second handle to the same array. The caller is responsible
	/// for treating the result as read-only unless it becomes the sole
	/// owner again.
	pub fn share(&self) -> Self { Self { array: Rc::clone(&self.array) } }

	pub fn read(&self) -> Ref<'_, [u8; SEGMENT_SIZE]> { self.array.borrow() }

	/// Borrows the array mutably. Callers must ensure they only touch the
	/// byte range they own (e.g. `[limit..)` when appending) unless they've
	/// just forked via [`Self::fork_in_place`].
	pub fn write(&self) -> RefMut<'_, [u8; SEGMENT_SIZE]> { self.array.borrow_mut() }

	/// If shared, replaces this handle's array with a private copy of its
	/// current contents, returning `true` if a copy was made.
	pub fn fork_in_place(&mut self) -> bool {
		if self.is_shared() {
			let copy = Box::new(*self.array.borrow());
			self.array = Rc::new(RefCell::new(copy));
			true
		} else {
			false
		}
	}

	/// If this is the sole handle to its array, returns it to the pool for
	/// reuse and returns `true`. Otherwise this handle is simply dropped
	/// (some other segment or byte string still owns the array) and `false`
	/// is returned.
	pub fn recycle(self) -> bool {
		match Rc::try_unwrap(self.array) {
			Ok(cell) => {
				pool::recycle(cell.into_inner());
				true
			}
			Err(_) => false,
		}
	}
}
