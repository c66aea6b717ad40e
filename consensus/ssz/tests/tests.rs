use ethereum_types::H256;
use ssz::{Decode, DecodeError, Encode, OffsetViolation};
use ssz_derive::{Decode, Encode};

mod round_trip {
    use super::*;

    fn round_trip<T: Encode + Decode + std::fmt::Debug + PartialEq>(items: Vec<T>) {
        for item in items {
            let encoded = &item.as_ssz_bytes();
            assert_eq!(item.ssz_bytes_len(), encoded.len());
            assert_eq!(T::from_ssz_bytes(encoded), Ok(item));
        }
    }

    #[test]
    fn bool() {
        let items: Vec<bool> = vec![true, false];

        round_trip(items);
    }

    #[test]
    fn u8_array_4() {
        let items: Vec<[u8; 4]> = vec![[0, 0, 0, 0], [1, 0, 0, 0], [1, 2, 3, 4], [1, 2, 0, 4]];

        round_trip(items);
    }

    #[test]
    fn h256() {
        let items: Vec<H256> = vec![H256::zero(), H256::from([1; 32]), H256::random()];

        round_trip(items);
    }

    #[test]
    fn vec_of_h256() {
        let items: Vec<Vec<H256>> = vec![
            vec![],
            vec![H256::zero(), H256::from([1; 32]), H256::random()],
        ];

        round_trip(items);
    }

    #[test]
    fn vec_u16() {
        let items: Vec<Vec<u16>> = vec![
            vec![],
            vec![255],
            vec![0, 1, 2],
            vec![100; 64],
            vec![255, 0, 255],
        ];

        round_trip(items);
    }

    #[test]
    fn vec_of_vec_u16() {
        let items: Vec<Vec<Vec<u16>>> = vec![
            vec![],
            vec![vec![]],
            vec![vec![1, 2, 3]],
            vec![vec![], vec![]],
            vec![vec![], vec![1, 2, 3]],
            vec![vec![1, 2, 3], vec![1, 2, 3]],
            vec![vec![1, 2, 3], vec![], vec![1, 2, 3]],
            vec![vec![], vec![], vec![1, 2, 3]],
            vec![vec![], vec![1], vec![1, 2, 3]],
            vec![vec![], vec![1], vec![1, 2, 3]],
        ];

        round_trip(items);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct FixedLen {
        a: u16,
        b: u64,
        c: u32,
    }

    #[test]
    fn fixed_len_struct_encoding() {
        let items: Vec<FixedLen> = vec![
            FixedLen { a: 0, b: 0, c: 0 },
            FixedLen { a: 1, b: 1, c: 1 },
            FixedLen { a: 1, b: 0, c: 1 },
        ];

        round_trip(items);
    }

    #[test]
    fn fixed_len_excess_bytes() {
        let fixed = FixedLen { a: 1, b: 2, c: 3 };

        let mut bytes = fixed.as_ssz_bytes();
        bytes.append(&mut vec![0]);

        assert_eq!(
            FixedLen::from_ssz_bytes(&bytes),
            Err(DecodeError::InvalidByteLength {
                len: 15,
                expected: 14,
            })
        );
    }

    #[test]
    fn vec_of_fixed_len_struct() {
        let items: Vec<FixedLen> = vec![
            FixedLen { a: 0, b: 0, c: 0 },
            FixedLen { a: 1, b: 1, c: 1 },
            FixedLen { a: 1, b: 0, c: 1 },
        ];

        round_trip(items);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct VariableLen {
        a: u16,
        b: Vec<u16>,
        c: u32,
    }

    #[test]
    fn offset_into_fixed_bytes() {
        let bytes = vec![
            //  1   2   3   4   5   6   7   8   9   10  11
            01, 00, 09, 00, 00, 00, 01, 00, 15, 00, 00,
        ];

        assert_eq!(
            VariableLen::from_ssz_bytes(&bytes),
            Err(DecodeError::BadOffset {
                offset: 9,
                violation: OffsetViolation::IntoFixedRegion,
            })
        );
    }

    #[test]
    fn variable_len_excess_bytes() {
        let variable = VariableLen {
            a: 1,
            b: vec![2],
            c: 3,
        };

        let mut bytes = variable.as_ssz_bytes();
        bytes.append(&mut vec![0]);

        // The error message triggered is not so helpful, it's caught by a side-effect. Just
        // checking there is _some_ error is fine.
        assert!(VariableLen::from_ssz_bytes(&bytes).is_err());
    }

    #[test]
    fn first_offset_skips_byte() {
        let bytes = vec![
            //  1   2   3   4   5   6   7   8   9   10  11
            01, 00, 11, 00, 00, 00, 01, 00, 15, 00, 00,
        ];

        assert_eq!(
            VariableLen::from_ssz_bytes(&bytes),
            Err(DecodeError::BadOffset {
                offset: 11,
                violation: OffsetViolation::SkipsHeapBytes,
            })
        );
    }

    #[test]
    fn variable_len_struct_encoding() {
        let items: Vec<VariableLen> = vec![
            VariableLen {
                a: 0,
                b: vec![],
                c: 0,
            },
            VariableLen {
                a: 1,
                b: vec![0],
                c: 1,
            },
            VariableLen {
                a: 1,
                b: vec![0, 1, 2],
                c: 1,
            },
        ];

        round_trip(items);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct ThreeVariableLen {
        a: u16,
        b: Vec<u16>,
        c: Vec<u16>,
        d: Vec<u16>,
    }

    #[test]
    fn three_variable_len() {
        let vec: Vec<ThreeVariableLen> = vec![ThreeVariableLen {
            a: 42,
            b: vec![0],
            c: vec![1],
            d: vec![2],
        }];

        round_trip(vec);
    }

    #[test]
    fn offsets_decreasing() {
        let bytes = vec![
            //  1   2   3   4   5   6   7   8   9   10  11  12  13  14  15  16  17  18
            01, 00, 14, 00, 00, 00, 16, 00, 00, 00, 14, 00, 00, 00, 00, 00, 01, 00,
        ];

        assert_eq!(
            ThreeVariableLen::from_ssz_bytes(&bytes),
            Err(DecodeError::BadOffset {
                offset: 14,
                violation: OffsetViolation::Decreasing,
            })
        );
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    #[ssz(enum_behaviour = "union")]
    enum Shape {
        Circle(u16),
        Square(Vec<u8>),
    }

    #[test]
    fn union_round_trip() {
        let items: Vec<Shape> = vec![
            Shape::Circle(22),
            Shape::Square(vec![]),
            Shape::Square(vec![1, 2, 3]),
        ];

        round_trip(items);
    }

    #[test]
    fn union_bytes() {
        assert_eq!(Shape::Circle(7).as_ssz_bytes(), vec![0, 7, 0]);
        assert_eq!(Shape::Square(vec![9]).as_ssz_bytes(), vec![1, 9]);

        assert_eq!(
            Shape::from_ssz_bytes(&[2, 0]),
            Err(DecodeError::UnionSelectorInvalid(2))
        );
    }
}

mod spec_vectors {
    use super::*;

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct MixedContainer {
        a: u32,
        b: Vec<u8>,
    }

    /// The canonical worked example: a fixed `uint32` followed by a variable `list[uint8]`
    /// serializes to the fixed value, the 4-byte offset of the heap, then the heap.
    #[test]
    fn fixed_then_list_byte_layout() {
        let value = MixedContainer {
            a: 0x01020304,
            b: vec![0xaa, 0xbb],
        };

        let expected = vec![
            0x04, 0x03, 0x02, 0x01, // a, little-endian
            0x08, 0x00, 0x00, 0x00, // offset of b = 8
            0xaa, 0xbb, // b payload
        ];

        assert_eq!(value.as_ssz_bytes(), expected);
        assert_eq!(MixedContainer::from_ssz_bytes(&expected), Ok(value));
    }
}
