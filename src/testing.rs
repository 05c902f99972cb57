use std::{
  alloc::{self, Layout},
  cell::{Cell, RefCell},
  collections::HashMap,
  ptr::NonNull,
};

use crate::{
  allocator::Allocator,
  error::{AllocError, Result},
};

const ALIGN: usize = 16;

/// Parent allocator for tests.
///
/// Serves zeroed memory from `std::alloc`, remembers every live block, and
/// panics on a pointer it does not own (double free included).
#[derive(Default)]
pub struct CountingAllocator {
  live: RefCell<HashMap<usize, (NonNull<u8>, Layout)>>,
  sizes: RefCell<Vec<usize>>,
  allocations: Cell<usize>,
  deallocations: Cell<usize>,
  fail_after: Cell<Option<usize>>,
}

impl CountingAllocator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every allocation after the next `n` fail with `OutOfMemory`.
  pub fn fail_after(
    &self,
    n: usize,
  ) {
    self.fail_after.set(Some(self.allocations.get() + n));
  }

  pub fn allocations(&self) -> usize {
    self.allocations.get()
  }

  pub fn deallocations(&self) -> usize {
    self.deallocations.get()
  }

  pub fn live_blocks(&self) -> usize {
    self.live.borrow().len()
  }

  /// Sizes of all successful `allocate` calls, in order.
  pub fn requested_sizes(&self) -> Vec<usize> {
    self.sizes.borrow().clone()
  }

  fn layout(size: usize) -> Layout {
    Layout::from_size_align(size.max(1), ALIGN).unwrap()
  }
}

impl Allocator for CountingAllocator {
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    if self.fail_after.get().is_some_and(|limit| self.allocations.get() >= limit) {
      return Err(AllocError::OutOfMemory { requested: size });
    }

    let layout = Self::layout(size);
    let ptr = NonNull::new(unsafe { alloc::alloc_zeroed(layout) }).ok_or(AllocError::OutOfMemory { requested: size })?;

    self.live.borrow_mut().insert(ptr.as_ptr().addr(), (ptr, layout));
    self.sizes.borrow_mut().push(size);
    self.allocations.set(self.allocations.get() + 1);

    Ok(ptr)
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
  ) {
    let (_, layout) = self
      .live
      .borrow_mut()
      .remove(&ptr.as_ptr().addr())
      .expect("deallocate of a block this allocator does not own");

    unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
    self.deallocations.set(self.deallocations.get() + 1);
  }

  unsafe fn resize(
    &self,
    ptr: NonNull<u8>,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    let (_, layout) = *self
      .live
      .borrow()
      .get(&ptr.as_ptr().addr())
      .expect("resize of a block this allocator does not own");

    let address = unsafe { alloc::realloc(ptr.as_ptr(), layout, new_size.max(1)) };
    let moved = NonNull::new(address).ok_or(AllocError::OutOfMemory { requested: new_size })?;

    let mut live = self.live.borrow_mut();
    live.remove(&ptr.as_ptr().addr());
    live.insert(moved.as_ptr().addr(), (moved, Self::layout(new_size)));

    Ok(moved)
  }
}

impl Drop for CountingAllocator {
  fn drop(&mut self) {
    for (_, (ptr, layout)) in self.live.get_mut().drain() {
      unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_resize_moves_live_block() {
    let parent = CountingAllocator::new();
    let ptr = parent.allocate(8).unwrap();

    unsafe {
      ptr.as_ptr().write_bytes(0x5A, 8);

      let grown = parent.resize(ptr, 4096).unwrap();

      assert!((0..8).all(|i| grown.as_ptr().add(i).read() == 0x5A));
      assert_eq!(1, parent.live_blocks());

      parent.deallocate(grown);
    }

    assert_eq!(0, parent.live_blocks());
    assert_eq!(1, parent.allocations());
    assert_eq!(1, parent.deallocations());
  }

  #[test]
  fn test_fail_after_counts_from_now() {
    let parent = CountingAllocator::new();
    let first = parent.allocate(4).unwrap();

    parent.fail_after(1);

    let second = parent.allocate(4).unwrap();
    assert_eq!(Err(AllocError::OutOfMemory { requested: 4 }), parent.allocate(4));
    assert_eq!(vec![4, 4], parent.requested_sizes());

    unsafe {
      parent.deallocate(first);
      parent.deallocate(second);
    }
  }

  #[test]
  #[should_panic(expected = "does not own")]
  fn test_double_free_panics() {
    let parent = CountingAllocator::new();
    let ptr = parent.allocate(4).unwrap();

    unsafe {
      parent.deallocate(ptr);
      parent.deallocate(ptr);
    }
  }
}
