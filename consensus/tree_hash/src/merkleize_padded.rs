use crate::{get_zero_hash, Hash256, BYTES_PER_CHUNK};
use eth2_hashing::hash32_concat;

/// Merkleize `bytes` and pad the resulting tree out to `min_leaves` with zero-subtrees.
///
/// First, `bytes` is split into 32-byte chunks, the last chunk being zero-padded. The chunks
/// become the leaves of a binary tree whose width is the next power of two of
/// `max(chunk_count, min_leaves)`. Missing leaves are treated as `[0; 32]`; entire missing
/// subtrees are substituted with a pre-computed zero-hash rather than being hashed.
///
/// ## Notes
///
/// - The zero-padding is "virtual": memory use is proportional to the supplied bytes, not to the
///   padded width of the tree.
/// - `merkleize_padded(bytes, 0)` hashes the smallest tree that fits `bytes`.
pub fn merkleize_padded(bytes: &[u8], min_leaves: usize) -> Hash256 {
    let num_leaves = std::cmp::max(
        (bytes.len() + BYTES_PER_CHUNK - 1) / BYTES_PER_CHUNK,
        min_leaves,
    )
    .next_power_of_two();

    let height = num_leaves.trailing_zeros() as usize;

    // Split the bytes into 32-byte chunks, zero-padding the final chunk if required.
    let mut layer: Vec<[u8; BYTES_PER_CHUNK]> = bytes
        .chunks(BYTES_PER_CHUNK)
        .map(|chunk| {
            let mut leaf = [0; BYTES_PER_CHUNK];
            leaf[0..chunk.len()].copy_from_slice(chunk);
            leaf
        })
        .collect();

    if layer.is_empty() {
        return Hash256::from_slice(get_zero_hash(height));
    }

    // Hash the current layer pairwise into the next, padding odd layers with the zero-subtree
    // hash for that height.
    for h in 0..height {
        if layer.len() % 2 == 1 {
            let mut zero = [0; BYTES_PER_CHUNK];
            zero.copy_from_slice(get_zero_hash(h));
            layer.push(zero);
        }

        layer = layer
            .chunks(2)
            .map(|pair| hash32_concat(&pair[0], &pair[1]))
            .collect();
    }

    debug_assert_eq!(layer.len(), 1);

    Hash256::from_slice(&layer[0])
}

#[cfg(test)]
mod test {
    use super::*;
    use eth2_hashing::ZERO_HASHES;

    fn reference_root(leaves: &[[u8; BYTES_PER_CHUNK]], width: usize) -> Hash256 {
        // Naive reference: materialize the full zero-padded tree.
        let mut layer: Vec<[u8; BYTES_PER_CHUNK]> = leaves.to_vec();
        layer.resize(width, [0; BYTES_PER_CHUNK]);

        while layer.len() > 1 {
            layer = layer
                .chunks(2)
                .map(|pair| hash32_concat(&pair[0], &pair[1]))
                .collect();
        }

        Hash256::from_slice(&layer[0])
    }

    fn compare_with_reference(leaf_count: usize, min_leaves: usize) {
        let leaves: Vec<[u8; BYTES_PER_CHUNK]> = (0..leaf_count)
            .map(|i| {
                let mut leaf = [0; BYTES_PER_CHUNK];
                leaf[0..8].copy_from_slice(&(i as u64).to_le_bytes());
                leaf
            })
            .collect();

        let bytes: Vec<u8> = leaves.iter().flat_map(|l| l.to_vec()).collect();

        let width = std::cmp::max(leaf_count, min_leaves)
            .next_power_of_two()
            .max(1);

        assert_eq!(
            merkleize_padded(&bytes, min_leaves),
            reference_root(&leaves, width),
            "failed for leaf_count {} min_leaves {}",
            leaf_count,
            min_leaves
        );
    }

    #[test]
    fn exact_power_of_two() {
        compare_with_reference(1, 0);
        compare_with_reference(2, 0);
        compare_with_reference(4, 0);
        compare_with_reference(8, 0);
        compare_with_reference(16, 0);
    }

    #[test]
    fn ragged_widths() {
        for i in 0..=33 {
            compare_with_reference(i, 0);
        }
    }

    #[test]
    fn padded_to_min_leaves() {
        for i in 0..=9 {
            compare_with_reference(i, 16);
        }
        compare_with_reference(3, 8192);
    }

    #[test]
    fn empty_is_zero_hash() {
        assert_eq!(
            merkleize_padded(&[], 8),
            Hash256::from_slice(&ZERO_HASHES[3])
        );
        assert_eq!(merkleize_padded(&[], 0), Hash256::zero());
    }

    #[test]
    fn partial_final_chunk() {
        // 33 bytes = one full chunk plus one byte; the second leaf is zero-padded.
        let bytes = vec![42; 33];
        let mut second = [0; BYTES_PER_CHUNK];
        second[0] = 42;

        assert_eq!(
            merkleize_padded(&bytes, 0),
            Hash256::from_slice(&hash32_concat(&[42; BYTES_PER_CHUNK], &second))
        );
    }
}
