use thiserror::Error;

/// Failures reported by an [`Allocator`](crate::Allocator).
///
/// `OutOfMemory` is the only failure a well-behaved caller can observe. The
/// other two variants are checked forms of misuse that the arena detects
/// instead of running into undefined behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
  #[error("out of memory: could not obtain {requested} bytes")]
  OutOfMemory { requested: usize },

  #[error("arena used after deinit")]
  Deinitialized,

  #[error("pointer {0:#x} is not owned by this arena")]
  ForeignPointer(usize),
}

pub type Result<T> = std::result::Result<T, AllocError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages() {
    assert_eq!(
      "out of memory: could not obtain 64 bytes",
      AllocError::OutOfMemory { requested: 64 }.to_string()
    );
    assert_eq!("arena used after deinit", AllocError::Deinitialized.to_string());
    assert_eq!(
      "pointer 0x1000 is not owned by this arena",
      AllocError::ForeignPointer(0x1000).to_string()
    );
  }
}
