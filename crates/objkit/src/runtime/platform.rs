//! Platform constants that fix the runtime's memory layout.

/// Size of a native word (pointer or `isize`) in bytes.
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// `true` on targets with 64-bit pointers.
pub const IS_64_BIT: bool = WORD_SIZE == 8;

/// Size of the instance header: the slot holding the class reference.
///
/// The first ivar of a root class starts at this offset.
pub const HEADER_SIZE: usize = WORD_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_one_pointer() {
        assert_eq!(HEADER_SIZE, std::mem::size_of::<*const u8>());
    }

    #[test]
    fn test_word_size_matches_target() {
        assert_eq!(IS_64_BIT, cfg!(target_pointer_width = "64"));
    }
}
