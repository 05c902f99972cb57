/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. The result is a `usize`.
///
/// # Examples
///
/// ```rust
/// use memallocs::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(5, 1), 5);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    (($value) + ($align) - 1) & !(($align) - 1)
  };
}

#[cfg(test)]
mod tests {
  #[test]
  fn test_align_to_powers_of_two() {
    for shift in 0..12 {
      let align = 1usize << shift;

      for value in 0..(4 * align) {
        let aligned = align_to!(value, align);

        assert_eq!(0, aligned % align);
        assert!(aligned >= value);
        assert!(aligned - value < align);
      }
    }
  }
}
