/// Returns `int` as little-endian bytes with a length of 1.
pub fn int_to_bytes1(int: u8) -> Vec<u8> {
    vec![int]
}

/// Returns `int` as little-endian bytes with a length of 4.
pub fn int_to_bytes4(int: u32) -> Vec<u8> {
    int.to_le_bytes().to_vec()
}

/// Returns `int` as little-endian bytes with a length of 4, stored on the stack.
pub fn int_to_fixed_bytes4(int: u32) -> [u8; 4] {
    int.to_le_bytes()
}

/// Returns `int` as little-endian bytes with a length of 8.
pub fn int_to_bytes8(int: u64) -> Vec<u8> {
    int.to_le_bytes().to_vec()
}

/// Returns `int` as little-endian bytes with a length of 32.
pub fn int_to_bytes32(int: u64) -> Vec<u8> {
    let mut bytes = vec![0; 32];
    bytes[0..8].copy_from_slice(&int.to_le_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bytes4_matches_vec() {
        let x: u32 = 42;
        assert_eq!(int_to_bytes4(x), int_to_fixed_bytes4(x).to_vec());
    }

    #[test]
    fn zero_verify_u64() {
        assert_eq!(int_to_bytes8(0), vec![0; 8]);
        assert_eq!(int_to_bytes32(0), vec![0; 32]);
    }

    #[test]
    fn int_to_bytes32_max() {
        let mut expected = vec![255; 8];
        expected.extend_from_slice(&[0; 24]);
        assert_eq!(int_to_bytes32(u64::max_value()), expected);
    }

    #[test]
    fn known_vectors() {
        // (int, little-endian hex of the 8-byte encoding)
        let pairs = vec![
            (0u64, "0000000000000000"),
            (1, "0100000000000000"),
            (256, "0001000000000000"),
            (6592, "c019000000000000"),
            (18446744073709551615, "ffffffffffffffff"),
        ];

        for (int, hex_str) in pairs {
            assert_eq!(int_to_bytes8(int), hex::decode(hex_str).unwrap());
        }
    }
}
