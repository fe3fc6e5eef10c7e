use crate::normalize::char_byte_offsets;
use crate::sequence::SequenceMatcher;

/// A run of `candidate` that repeats `reference` verbatim. Byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub offset_in_candidate: usize,
    pub size: usize,
    pub offset_in_reference: usize,
}

/// Matching blocks of at least `min_len` bytes, ordered by
/// `offset_in_candidate`.
///
/// This is the greedy recursive decomposition, not a search for every
/// common substring: once the longest run is fixed, the parts of the
/// candidate to its right are only compared to the reference to its right.
pub fn find_blocks(candidate: &str, reference: &str, min_len: usize) -> Vec<Block> {
    if candidate.is_empty() || reference.is_empty() {
        return Vec::new();
    }

    let a: Vec<char> = candidate.chars().collect();
    let b: Vec<char> = reference.chars().collect();
    let a_offsets = char_byte_offsets(candidate);
    let b_offsets = char_byte_offsets(reference);

    SequenceMatcher::new(&a, &b)
        .matching_blocks()
        .into_iter()
        .filter_map(|m| {
            let start = a_offsets[m.a];
            let size = a_offsets[m.a + m.size] - start;
            (size >= min_len.max(1)).then(|| Block {
                offset_in_candidate: start,
                size,
                offset_in_reference: b_offsets[m.b],
            })
        })
        .collect()
}
