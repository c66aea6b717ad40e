use crate::{Hash256, BYTES_PER_CHUNK};
use eth2_hashing::hash32_concat;

/// Merkleize `bytes`, padding the leaves out to the next power of two with zero-chunks.
///
/// A straightforward reference implementation: every node in the tree is materialized and
/// hashed, including all-zero subtrees. Prefer `merkleize_padded` outside of tests.
pub fn merkleize_standard(bytes: &[u8]) -> Hash256 {
    let mut layer: Vec<[u8; BYTES_PER_CHUNK]> = bytes
        .chunks(BYTES_PER_CHUNK)
        .map(|chunk| {
            let mut leaf = [0; BYTES_PER_CHUNK];
            leaf[0..chunk.len()].copy_from_slice(chunk);
            leaf
        })
        .collect();

    if layer.is_empty() {
        return Hash256::zero();
    }

    layer.resize(layer.len().next_power_of_two(), [0; BYTES_PER_CHUNK]);

    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| hash32_concat(&pair[0], &pair[1]))
            .collect();
    }

    Hash256::from_slice(&layer[0])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::merkleize_padded;

    #[test]
    fn agrees_with_padded() {
        for chunks in 1..=17 {
            let bytes = vec![0xab; chunks * BYTES_PER_CHUNK];
            assert_eq!(merkleize_standard(&bytes), merkleize_padded(&bytes, 0));
        }
    }

    #[test]
    fn single_chunk_is_identity() {
        let bytes = [0x11; BYTES_PER_CHUNK];
        assert_eq!(
            merkleize_standard(&bytes),
            Hash256::from_slice(&bytes),
        );
    }
}
