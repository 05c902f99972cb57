use std::{alloc::Layout, cell::Cell, marker::PhantomData, ptr, ptr::NonNull};

use crate::{
  allocator::Allocator,
  error::{AllocError, Result},
  region::Region,
};

#[cfg(feature = "system")]
use crate::system::SYSTEM;

/// Minimum region size used by [`Arena::default`].
pub const DEFAULT_MIN_REGION_SIZE: usize = 4096;

/// Position of the most recent allocation inside the tail region.
#[derive(Debug, Clone, Copy)]
struct Last {
  offset: usize,
  size: usize,
}

/// Region-chained bump allocator.
///
/// Requests are served by bumping a cursor in the newest region. When it runs
/// out of room a new region of `max(size, min_region_size)` bytes is obtained
/// from the parent and appended to the chain. The space left at the end of
/// the old region is never revisited.
///
/// [`Allocator::deallocate`] on an arena does nothing. Memory comes back only
/// when the whole arena is torn down, either by [`Arena::deinit`] or on drop,
/// and every region is then returned to the parent in a single call.
///
/// The arena keeps its state in `Cell`s and is neither `Send` nor `Sync`.
/// The parent is borrowed for `'p` and must not be torn down while the arena
/// is alive.
pub struct Arena<'p> {
  parent: &'p dyn Allocator,
  min_region_size: usize,
  root: Cell<Option<NonNull<Region>>>,
  tail: Cell<Option<NonNull<Region>>>,
  last: Cell<Option<Last>>,
  chain_len: Cell<usize>,
  torn_down: Cell<bool>,
}

impl<'p> Arena<'p> {
  /// Creates an empty arena that obtains its regions from `parent`.
  ///
  /// No memory is requested until the first allocation. A `min_region_size`
  /// of zero sizes every region exactly to the request that created it.
  pub fn with_parent(
    parent: &'p dyn Allocator,
    min_region_size: usize,
  ) -> Self {
    Self {
      parent,
      min_region_size,
      root: Cell::new(None),
      tail: Cell::new(None),
      last: Cell::new(None),
      chain_len: Cell::new(0),
      torn_down: Cell::new(false),
    }
  }

  /// Creates an empty arena, falling back to [`SYSTEM`] when `parent` is `None`.
  #[cfg(feature = "system")]
  pub fn init(
    parent: Option<&'p dyn Allocator>,
    min_region_size: usize,
  ) -> Self {
    Self::with_parent(parent.unwrap_or(&SYSTEM), min_region_size)
  }

  /// Creates an empty arena backed by [`SYSTEM`].
  #[cfg(feature = "system")]
  pub fn new(min_region_size: usize) -> Self {
    Self::with_parent(&SYSTEM, min_region_size)
  }

  pub fn min_region_size(&self) -> usize {
    self.min_region_size
  }

  pub fn is_torn_down(&self) -> bool {
    self.torn_down.get()
  }

  pub fn region_count(&self) -> usize {
    self.chain_len.get()
  }

  /// Total bytes obtained from the parent.
  pub fn capacity(&self) -> usize {
    self.regions().map(|region| region.capacity).sum()
  }

  /// Bytes below each region's cursor, alignment padding included.
  pub fn used(&self) -> usize {
    self.regions().map(|region| region.cursor).sum()
  }

  /// Allocates a block satisfying `layout`'s size and alignment.
  ///
  /// A zero-sized layout yields a dangling pointer whose address is the
  /// alignment; [`Allocator::resize`] accepts it like any other block.
  pub fn allocate_layout(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>> {
    self.ensure_live()?;

    if layout.size() == 0 {
      // SAFETY: alignments are never zero.
      return Ok(unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) });
    }

    self.bump(layout.size(), layout.align())
  }

  /// Returns every region to the parent and leaves the arena unusable.
  ///
  /// Calling it again, or dropping the arena afterwards, releases nothing twice.
  pub fn deinit(&mut self) {
    let mut next = self.root.take();
    let mut regions = 0usize;
    let mut bytes = 0usize;

    self.tail.set(None);
    self.last.set(None);
    self.chain_len.set(0);
    self.torn_down.set(true);

    while let Some(region) = next {
      // SAFETY: every link was produced by `Box::leak` in `push_region` and is
      // reachable from `root` exactly once.
      let region = unsafe { Box::from_raw(region.as_ptr()) };
      next = region.next;
      regions += 1;
      bytes += region.capacity;

      unsafe { self.parent.deallocate(region.base) };
    }

    if regions > 0 {
      tracing::debug!(regions, bytes, "arena released regions");
    }
  }

  fn ensure_live(&self) -> Result<()> {
    if self.torn_down.get() {
      return Err(AllocError::Deinitialized);
    }

    Ok(())
  }

  fn bump(
    &self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>> {
    if let Some(tail) = self.tail.get() {
      // SAFETY: regions are only reachable through this arena and no other
      // reference to them is alive here.
      let region = unsafe { &mut *tail.as_ptr() };

      if let Some(offset) = region.bump(size, align) {
        self.last.set(Some(Last { offset, size }));
        return Ok(unsafe { region.at(offset) });
      }
    }

    // Worst case padding for `align` is `align - 1` bytes.
    let required = size
      .checked_add(align - 1)
      .ok_or(AllocError::OutOfMemory { requested: size })?;

    let tail = self.push_region(required)?;
    let region = unsafe { &mut *tail.as_ptr() };

    match region.bump(size, align) {
      Some(offset) => {
        self.last.set(Some(Last { offset, size }));
        Ok(unsafe { region.at(offset) })
      }
      None => Err(AllocError::OutOfMemory { requested: size }),
    }
  }

  /// Obtains a region of at least `size` bytes and links it as the new tail.
  ///
  /// On failure the chain is left as it was.
  fn push_region(
    &self,
    size: usize,
  ) -> Result<NonNull<Region>> {
    let capacity = size.max(self.min_region_size);

    let base = self.parent.allocate(capacity).inspect_err(|err| {
      tracing::debug!(capacity, error = %err, "arena parent refused a region");
    })?;

    let region = NonNull::from(Box::leak(Box::new(Region::new(base, capacity))));

    match self.tail.get() {
      Some(tail) => unsafe { (*tail.as_ptr()).next = Some(region) },
      None => self.root.set(Some(region)),
    }

    self.tail.set(Some(region));
    self.last.set(None);
    self.chain_len.set(self.chain_len.get() + 1);

    tracing::trace!(capacity, regions = self.chain_len.get(), "arena region created");

    Ok(region)
  }

  /// Copies the first `len` bytes of `ptr` into a fresh block of `new_size`.
  unsafe fn relocate(
    &self,
    ptr: NonNull<u8>,
    len: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    let moved = self.allocate(new_size)?;

    // SAFETY: `moved` lies past every cursor that covered `ptr`, so the spans
    // are disjoint, and `len` never exceeds either of them.
    unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), moved.as_ptr(), len) };

    Ok(moved)
  }

  /// Length of the block starting at `ptr`, padding up to the next block included.
  fn block_len(
    &self,
    ptr: NonNull<u8>,
  ) -> Option<usize> {
    self.regions().find_map(|region| region.block(ptr).map(|(_, len)| len))
  }

  fn regions(&self) -> Regions<'_> {
    Regions {
      next: self.root.get(),
      _region: PhantomData,
    }
  }
}

#[cfg(feature = "system")]
impl Default for Arena<'static> {
  fn default() -> Self {
    Self::new(DEFAULT_MIN_REGION_SIZE)
  }
}

impl Allocator for Arena<'_> {
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    self.ensure_live()?;

    if size == 0 {
      return Ok(NonNull::dangling());
    }

    self.bump(size, 1)
  }

  /// Does nothing: a bump allocator cannot reuse individual blocks. The
  /// memory is reclaimed together with the rest of the arena.
  unsafe fn deallocate(
    &self,
    _ptr: NonNull<u8>,
  ) {
  }

  /// Grows or shrinks the most recent allocation in place when the tail
  /// region has room for it. Any other block is copied to a fresh allocation
  /// and its old span becomes dead space until teardown. The copy reads only
  /// the block itself, up to where the next block starts.
  unsafe fn resize(
    &self,
    ptr: NonNull<u8>,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    self.ensure_live()?;

    if let (Some(tail), Some(last)) = (self.tail.get(), self.last.get()) {
      let region = unsafe { &mut *tail.as_ptr() };

      if region.block(ptr).map(|(offset, _)| offset) == Some(last.offset) {
        if region.capacity - last.offset >= new_size {
          // The cursor never moves backwards, a shrink only forgets the size.
          region.cursor = region.cursor.max(last.offset + new_size);
          self.last.set(Some(Last {
            offset: last.offset,
            size: new_size,
          }));

          return Ok(ptr);
        }

        return unsafe { self.relocate(ptr, last.size.min(new_size), new_size) };
      }
    }

    if let Some(len) = self.block_len(ptr) {
      return unsafe { self.relocate(ptr, len.min(new_size), new_size) };
    }

    // Zero-sized blocks carry their alignment as address and own no bytes.
    if ptr.as_ptr().addr().is_power_of_two() {
      return self.allocate(new_size);
    }

    Err(AllocError::ForeignPointer(ptr.as_ptr().addr()))
  }

  fn parent(&self) -> Option<&dyn Allocator> {
    Some(self.parent)
  }
}

impl Drop for Arena<'_> {
  fn drop(&mut self) {
    self.deinit();
  }
}

/// Walks the chain from `root` to the tail.
struct Regions<'a> {
  next: Option<NonNull<Region>>,
  _region: PhantomData<&'a Region>,
}

impl<'a> Iterator for Regions<'a> {
  type Item = &'a Region;

  fn next(&mut self) -> Option<Self::Item> {
    let region = unsafe { self.next?.as_ref() };
    self.next = region.next;
    Some(region)
  }
}
