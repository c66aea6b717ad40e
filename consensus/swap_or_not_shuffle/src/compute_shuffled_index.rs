use eth2_hashing::hash_fixed;
use int_to_bytes::{int_to_bytes1, int_to_bytes4};
use std::cmp::max;

/// Return `p(index)` in a pseudorandom permutation `p` of `0...list_size - 1` with ``seed`` as
/// entropy.
///
/// Utilizes 'swap or not' shuffling found in
/// https://link.springer.com/content/pdf/10.1007%2F978-3-642-32009-5_1.pdf
/// See the 'generalized domain' algorithm on page 3.
///
/// Note: this function is significantly slower than the `shuffle_list` function in this crate.
/// Using `compute_shuffled_index` to shuffle an entire list, index by index, has been observed to
/// be ~250x slower than `shuffle_list`. Therefore, this function is only useful when shuffling a
/// small portion of a large list.
///
/// Returns `None` under any of the following conditions:
///  - `list_size == 0`
///  - `index >= list_size`
///  - `list_size > 2**24`
///  - `list_size > usize::max_value() / 2`
pub fn compute_shuffled_index(
    index: usize,
    list_size: usize,
    seed: &[u8],
    shuffle_round_count: u8,
) -> Option<usize> {
    if list_size == 0
        || index >= list_size
        || list_size > usize::max_value() / 2
        || list_size > 2_usize.pow(24)
    {
        return None;
    }

    let mut index = index;
    for round in 0..shuffle_round_count {
        let pivot = bytes_to_int64(&hash_with_round(seed, round)[0..8]) as usize % list_size;
        index = do_round(seed, index, pivot, round, list_size);
    }

    Some(index)
}

fn do_round(seed: &[u8], index: usize, pivot: usize, round: u8, list_size: usize) -> usize {
    let flip = (pivot + (list_size - index)) % list_size;
    let position = max(index, flip);
    let source = hash_with_round_and_position(seed, round, position);
    let byte = source[(position % 256) / 8];
    let bit = (byte >> (position % 8)) % 2;
    if bit == 1 {
        flip
    } else {
        index
    }
}

fn hash_with_round_and_position(seed: &[u8], round: u8, position: usize) -> [u8; 32] {
    let mut seed = seed.to_vec();
    seed.append(&mut int_to_bytes1(round));
    /*
     * Note: the specification is `int_to_bytes4(position // 256)`, however, we use a `u32`
     * where the spec uses unbounded integers. This is safe because `position` is bounded by
     * `list_size`, which is checked to be less than `2**24`.
     */
    seed.append(&mut int_to_bytes4((position / 256) as u32));
    hash_fixed(&seed[..])
}

fn hash_with_round(seed: &[u8], round: u8) -> [u8; 32] {
    let mut seed = seed.to_vec();
    seed.append(&mut int_to_bytes1(round));
    hash_fixed(&seed[..])
}

fn bytes_to_int64(slice: &[u8]) -> u64 {
    let mut bytes = [0; 8];
    bytes.copy_from_slice(&slice[0..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_for_zero_length_list() {
        assert_eq!(None, compute_shuffled_index(100, 0, &[42, 42], 90));
    }

    #[test]
    fn returns_none_for_out_of_bounds_index() {
        assert_eq!(None, compute_shuffled_index(100, 100, &[42, 42], 90));
    }

    #[test]
    fn singleton_is_identity() {
        assert_eq!(Some(0), compute_shuffled_index(0, 1, &[42; 32], 90));
    }

    #[test]
    fn is_a_permutation() {
        let seed = [7; 32];
        let list_size = 61;

        let mut seen = vec![false; list_size];
        for i in 0..list_size {
            let shuffled = compute_shuffled_index(i, list_size, &seed, 10).unwrap();
            assert!(!seen[shuffled], "two indices mapped to {}", shuffled);
            seen[shuffled] = true;
        }

        assert!(seen.iter().all(|b| *b));
    }
}
