use std::{ffi::CStr, ptr};

use memallocs::{Allocator, Arena, Result, SYSTEM};

/// Prints the shape of the arena's region chain.
fn print_arena(
  label: &str,
  arena: &Arena<'_>,
) {
  println!(
    "[{}] regions = {}, capacity = {} bytes, used = {} bytes",
    label,
    arena.region_count(),
    arena.capacity(),
    arena.used(),
  );
}

fn main() -> Result<()> {
  // Shows the `trace!` event emitted for every region the arena creates.
  tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).init();

  // No parent given: regions come from the process-wide system allocator.
  let mut arena = Arena::init(None, 17);
  print_arena("start", &arena);

  // --------------------------------------------------------------------
  // 1) 32 bytes is larger than the minimum region size, so the first
  //    region is sized to the request itself.
  // --------------------------------------------------------------------
  let some_str = arena.allocate(32)?;
  let message = b"hello, world!\0";

  unsafe {
    ptr::copy_nonoverlapping(message.as_ptr(), some_str.as_ptr(), message.len());
    let text = CStr::from_ptr(some_str.as_ptr().cast());
    println!("\n[1] {}", text.to_string_lossy());
  }
  print_arena("1", &arena);

  // --------------------------------------------------------------------
  // 2) The first region is full: a new one of min_region_size bytes.
  // --------------------------------------------------------------------
  let small = arena.allocate(8)?;
  println!("\n[2] Allocated 8 bytes at {:?}", small);
  print_arena("2", &arena);

  // --------------------------------------------------------------------
  // 3) Growing the most recent allocation stays in place while it fits.
  // --------------------------------------------------------------------
  let grown = unsafe { arena.resize(small, 16)? };
  println!("\n[3] Resized to 16 bytes, moved = {}", grown != small);

  // --------------------------------------------------------------------
  // 4) An arena can be the parent of another arena.
  // --------------------------------------------------------------------
  {
    let outer = Arena::with_parent(&SYSTEM, 1024);
    let inner = Arena::with_parent(&outer, 64);

    inner.allocate(40)?;
    inner.allocate(40)?;

    println!();
    print_arena("4 inner", &inner);
    print_arena("4 outer", &outer);
  }

  // --------------------------------------------------------------------
  // 5) Everything goes back to the system allocator in one pass.
  // --------------------------------------------------------------------
  arena.deinit();
  println!();
  print_arena("end", &arena);

  Ok(())
}
