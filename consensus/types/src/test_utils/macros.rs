/// Tests SSZ encode/decode round trips and tree-hash stability for a type implementing
/// `TestRandom`.
#[macro_export]
macro_rules! ssz_and_tree_hash_tests {
    ($type: ty) => {
        #[test]
        pub fn test_ssz_round_trip() {
            use ssz::{ssz_encode, Decode};
            use $crate::test_utils::{SeedableRng, StdRng, TestRandom};

            let mut rng = StdRng::from_seed([42; 32]);
            let original = <$type>::random_for_test(&mut rng);

            let bytes = ssz_encode(&original);
            let decoded = <$type as Decode>::from_ssz_bytes(&bytes).unwrap();

            assert_eq!(original, decoded);
        }

        #[test]
        pub fn test_tree_hash_is_deterministic() {
            use tree_hash::TreeHash;
            use $crate::test_utils::{SeedableRng, StdRng, TestRandom};

            let mut rng = StdRng::from_seed([42; 32]);
            let value = <$type>::random_for_test(&mut rng);
            let other = <$type>::random_for_test(&mut rng);

            // The root is a function of the value alone.
            assert_eq!(value.tree_hash_root(), value.tree_hash_root());

            // Distinct random values (almost surely) have distinct roots.
            assert_ne!(value.tree_hash_root(), other.tree_hash_root());
        }
    };
}
