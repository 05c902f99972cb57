use std::ptr::NonNull;

use libc::c_void;

use crate::{
  allocator::Allocator,
  error::{AllocError, Result},
};

/// Allocator backed by the host C heap (`malloc`, `free`, `realloc`).
///
/// Zero-sized requests are rounded up to one byte so every returned pointer is
/// unique and can be handed back to `free`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

/// The process-wide default parent allocator.
pub static SYSTEM: SystemAllocator = SystemAllocator;

impl Allocator for SystemAllocator {
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let address = unsafe { libc::malloc(size.max(1)) };

    NonNull::new(address.cast::<u8>()).ok_or(AllocError::OutOfMemory { requested: size })
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
  ) {
    unsafe { libc::free(ptr.as_ptr().cast::<c_void>()) }
  }

  unsafe fn resize(
    &self,
    ptr: NonNull<u8>,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    let address = unsafe { libc::realloc(ptr.as_ptr().cast::<c_void>(), new_size.max(1)) };

    NonNull::new(address.cast::<u8>()).ok_or(AllocError::OutOfMemory { requested: new_size })
  }
}
