//! # memallocs - Composable Memory Allocators
//!
//! This crate provides a small allocator toolkit built around one trait,
//! [`Allocator`], and two implementations of it:
//!
//! - [`SystemAllocator`] hands out memory from the host C heap. The
//!   process-wide [`SYSTEM`] instance is the default parent of every arena.
//! - [`Arena`] is a region-based **bump allocator** that draws its backing
//!   memory from any other [`Allocator`], another arena included.
//!
//! ## Overview
//!
//! ```text
//!   Allocator Composition:
//!
//!   ┌──────────────┐  allocate(region)   ┌──────────────┐  allocate(region)   ┌──────────┐
//!   │    Arena     │ ──────────────────▶ │    Arena     │ ──────────────────▶ │  SYSTEM  │
//!   │   (child)    │ ◀── deinit / drop ─ │  (parent)    │ ◀── deinit / drop ─ │ (malloc) │
//!   └──────────────┘                     └──────────────┘                     └──────────┘
//!
//!   Every arena borrows its parent; the parent must outlive it.
//! ```
//!
//! ## Region Chain
//!
//! ```text
//!   root                                          tail (cached)
//!    │                                              │
//!    ▼                                              ▼
//!   ┌─────────────────────────┐   ┌──────────────┐   ┌────────────────────────────────┐
//!   │ A1 │ A2 │ A3 │ dead     │──▶│ A4 (large)   │──▶│ A5 │ A6 │      free space     │
//!   └─────────────────────────┘   └──────────────┘   └────────────────────────────────┘
//!                                                              ▲
//!                                                              └── cursor (next alloc)
//! ```
//!
//! A request that does not fit the tail creates a new region of
//! `max(size, min_region_size)` bytes. Space left at the end of an older
//! region is dead until the arena is torn down.
//!
//! ## Crate Structure
//!
//! ```text
//!   memallocs
//!   ├── align      - Alignment macro (align_to!)
//!   ├── allocator  - The Allocator trait
//!   ├── arena      - Arena implementation
//!   ├── error      - AllocError and Result
//!   ├── region     - Region record (internal)
//!   └── system     - SystemAllocator and SYSTEM (feature `system`)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use memallocs::{Allocator, Arena};
//!
//! let mut arena = Arena::init(None, 17);
//!
//! let message = b"hello, world!";
//! let ptr = arena.allocate(32).unwrap();
//!
//! unsafe {
//!     std::ptr::copy_nonoverlapping(message.as_ptr(), ptr.as_ptr(), message.len());
//!     assert_eq!(&message[..], std::slice::from_raw_parts(ptr.as_ptr(), message.len()));
//! }
//!
//! // Every region goes back to the parent at once.
//! arena.deinit();
//! ```
//!
//! ## Features
//!
//! - `system` (default): compiles [`SystemAllocator`], [`SYSTEM`] and the
//!   arena constructors that fall back to it. Without it the crate is
//!   interface-only and every arena is built with [`Arena::with_parent`],
//!   which also lets a program plug in its own default allocator.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: arenas are neither `Send` nor `Sync`
//! - **No individual frees**: `deallocate` on an arena is a no-op
//! - **No compaction**: dead space is only reclaimed at teardown
//! - **No provenance checks** on `deallocate`; `resize` reports a pointer it
//!   cannot place as [`AllocError::ForeignPointer`]
//!
//! ## Safety
//!
//! Memory is handed out as raw pointers. Reading or writing it, and giving it
//! back through `deallocate` or `resize`, requires `unsafe` code that keeps
//! each pointer with the allocator that produced it.

pub mod align;
mod allocator;
mod arena;
mod error;
mod region;
#[cfg(feature = "system")]
mod system;

#[cfg(test)]
mod testing;

pub use allocator::Allocator;
pub use arena::{Arena, DEFAULT_MIN_REGION_SIZE};
pub use error::{AllocError, Result};
#[cfg(feature = "system")]
pub use system::{SYSTEM, SystemAllocator};
