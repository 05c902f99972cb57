use std::ptr::NonNull;

use crate::error::Result;

/// The allocator capability every allocator in this crate implements.
///
/// All three operations take `&self` so one allocator can serve as the parent
/// of several others at once. Implementations that keep state use interior
/// mutability and are therefore single-threaded unless they say otherwise.
pub trait Allocator {
  /// Returns a block of at least `size` usable bytes.
  ///
  /// The content of the block is unspecified. A `size` of zero yields a valid
  /// pointer that must not be read or written.
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>>;

  /// Gives a block back to the allocator.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by `allocate` or `resize` on this same
  /// instance and must not have been deallocated already.
  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
  );

  /// Returns a block of at least `new_size` bytes holding the first
  /// `min(old_size, new_size)` bytes of `ptr`. The result may alias `ptr`.
  ///
  /// On success `ptr` must be considered invalid unless it is equal to the
  /// returned pointer. On failure `ptr` is untouched.
  ///
  /// # Safety
  ///
  /// Same contract as [`Allocator::deallocate`].
  unsafe fn resize(
    &self,
    ptr: NonNull<u8>,
    new_size: usize,
  ) -> Result<NonNull<u8>>;

  /// The allocator this one draws its memory from, if any.
  fn parent(&self) -> Option<&dyn Allocator> {
    None
  }
}
