use tree_hash::{merkle_root, Hash256, SignedRoot, TreeHash};
use tree_hash_derive::{SignedRoot, TreeHash};

#[derive(TreeHash)]
struct Uints {
    a: u64,
    b: u64,
    c: u64,
}

#[test]
fn container_of_uints() {
    let value = Uints { a: 1, b: 2, c: 3 };

    let mut bytes = vec![];
    bytes.extend_from_slice(value.a.tree_hash_root().as_bytes());
    bytes.extend_from_slice(value.b.tree_hash_root().as_bytes());
    bytes.extend_from_slice(value.c.tree_hash_root().as_bytes());

    assert_eq!(value.tree_hash_root(), merkle_root(&bytes, 0));
}

#[derive(TreeHash)]
struct SkippedField {
    a: u64,
    b: Hash256,
    #[tree_hash(skip_hashing)]
    cache: Option<u64>,
}

#[test]
fn skipped_field_does_not_contribute() {
    let with_cache = SkippedField {
        a: 42,
        b: Hash256::repeat_byte(7),
        cache: Some(99),
    };
    let without_cache = SkippedField {
        a: 42,
        b: Hash256::repeat_byte(7),
        cache: None,
    };

    assert_eq!(with_cache.tree_hash_root(), without_cache.tree_hash_root());

    let mut bytes = vec![];
    bytes.extend_from_slice(with_cache.a.tree_hash_root().as_bytes());
    bytes.extend_from_slice(with_cache.b.tree_hash_root().as_bytes());
    assert_eq!(with_cache.tree_hash_root(), merkle_root(&bytes, 0));
}

#[derive(TreeHash, SignedRoot)]
struct SignedContainer {
    slot: u64,
    parent: Hash256,
    #[signed_root(skip_hashing)]
    signature: [u8; 96],
}

#[test]
fn signed_root_elides_trailing_signature() {
    let value = SignedContainer {
        slot: 3,
        parent: Hash256::repeat_byte(1),
        signature: [9; 96],
    };

    let mut bytes = vec![];
    bytes.extend_from_slice(value.slot.tree_hash_root().as_bytes());
    bytes.extend_from_slice(value.parent.tree_hash_root().as_bytes());

    assert_eq!(value.signed_root(), merkle_root(&bytes, 0));
    assert_ne!(value.signed_root(), value.tree_hash_root());
}

#[test]
fn signed_root_is_signature_independent() {
    let a = SignedContainer {
        slot: 3,
        parent: Hash256::repeat_byte(1),
        signature: [9; 96],
    };
    let b = SignedContainer {
        signature: [200; 96],
        ..a
    };

    assert_eq!(a.signed_root(), b.signed_root());
    assert_ne!(a.tree_hash_root(), b.tree_hash_root());
}
