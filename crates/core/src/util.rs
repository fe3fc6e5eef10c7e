pub(crate) fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Index of the last divider `<= offset`; dividers are ascending start
/// offsets with `dividers[0] == 0`.
pub(crate) fn divider_index(dividers: &[usize], offset: usize) -> Option<usize> {
    dividers.partition_point(|&d| d <= offset).checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a64_known_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn divider_index_picks_last_start_at_or_before() {
        let dividers = [0, 10, 10, 25];
        assert_eq!(divider_index(&dividers, 0), Some(0));
        assert_eq!(divider_index(&dividers, 9), Some(0));
        assert_eq!(divider_index(&dividers, 10), Some(2));
        assert_eq!(divider_index(&dividers, 30), Some(3));
        assert_eq!(divider_index(&[], 3), None);
    }
}
