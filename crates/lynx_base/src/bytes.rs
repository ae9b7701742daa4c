//! Byte size helpers

/// Get the number of kilobytes in bytes
#[allow(non_snake_case)]
pub const fn KB(val: usize) -> usize {
    val * 1000
}

/// Get the number of megabytes in bytes
#[allow(non_snake_case)]
pub const fn MB(val: usize) -> usize {
    val * 1000 * 1000
}

/// Get the number of kibibytes in bytes
#[allow(non_snake_case)]
pub const fn KiB(val: usize) -> usize {
    val * 1024
}

/// Get the number of mibibytes in bytes
#[allow(non_snake_case)]
pub const fn MiB(val: usize) -> usize {
    val * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sizes() {
        assert_eq!(KB(4), 4000);
        assert_eq!(MB(1), 1_000_000);
        assert_eq!(KiB(4), 4096);
        assert_eq!(MiB(2), 2 * 1024 * 1024);
    }
}
