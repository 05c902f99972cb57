use std::ptr::NonNull;

use crate::align_to;

/// One backing buffer of an arena plus its bump cursor.
///
/// Regions form a singly linked chain owned by the arena. The record itself
/// lives on the Rust heap; only `base..base + capacity` comes from the parent.
/// `starts` holds the offset of every block handed out, in ascending order,
/// so a block ends where the next one starts or at the cursor.
pub struct Region {
  pub next: Option<NonNull<Region>>,
  pub base: NonNull<u8>,
  pub capacity: usize,
  pub cursor: usize,
  starts: Vec<usize>,
}

impl Region {
  pub fn new(
    base: NonNull<u8>,
    capacity: usize,
  ) -> Self {
    Self {
      next: None,
      base,
      capacity,
      cursor: 0,
      starts: Vec::new(),
    }
  }

  /// Bytes still available after the cursor.
  pub fn remaining(&self) -> usize {
    self.capacity - self.cursor
  }

  /// Reserves `size` bytes at the next `align` boundary and returns their
  /// offset from `base`, or `None` when they do not fit.
  pub fn bump(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<usize> {
    let address = self.base.as_ptr().addr() + self.cursor;
    let padding = align_to!(address, align) - address;

    if self.remaining() < padding || self.remaining() - padding < size {
      return None;
    }

    let offset = self.cursor + padding;
    self.cursor = offset + size;
    self.starts.push(offset);

    Some(offset)
  }

  /// Offset and length of the block starting exactly at `ptr`.
  ///
  /// The length runs to the next block's start, or to the cursor for the
  /// newest block.
  pub fn block(
    &self,
    ptr: NonNull<u8>,
  ) -> Option<(usize, usize)> {
    let base = self.base.as_ptr().addr();
    let address = ptr.as_ptr().addr();

    if address < base || address - base >= self.cursor {
      return None;
    }

    let offset = address - base;
    let index = self.starts.binary_search(&offset).ok()?;
    let end = self.starts.get(index + 1).copied().unwrap_or(self.cursor);

    Some((offset, end - offset))
  }

  /// Pointer to the byte at `offset`.
  ///
  /// # Safety
  ///
  /// `offset` must not exceed `capacity`.
  pub unsafe fn at(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    debug_assert!(offset <= self.capacity);
    unsafe { self.base.add(offset) }
  }
}
