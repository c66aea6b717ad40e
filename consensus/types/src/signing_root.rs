use crate::Hash256;
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// The pair that is actually signed: an object's (signing) root bound to the eight-byte domain
/// for the fork and message kind.
#[derive(TreeHash)]
struct SigningData {
    object_root: Hash256,
    domain: u64,
}

/// Compute the message a signature is made over: the tree hash of `object_root` mixed with the
/// signature `domain`.
///
/// `object_root` is a `signed_root()` for self-referential containers (blocks, headers, exits),
/// or a plain `tree_hash_root()` otherwise (attestation data, randao epochs).
pub fn compute_signing_root(object_root: Hash256, domain: u64) -> Hash256 {
    SigningData {
        object_root,
        domain,
    }
    .tree_hash_root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eth2_hashing::hash32_concat;

    #[test]
    fn signing_root_is_pairwise_hash() {
        let root = Hash256::repeat_byte(3);
        let domain = 0x0807060504030201_u64;

        let mut domain_chunk = [0; 32];
        domain_chunk[0..8].copy_from_slice(&domain.to_le_bytes());

        assert_eq!(
            compute_signing_root(root, domain),
            Hash256::from_slice(&hash32_concat(root.as_bytes(), &domain_chunk))
        );
    }

    #[test]
    fn different_domains_give_different_messages() {
        let root = Hash256::repeat_byte(3);
        assert_ne!(compute_signing_root(root, 1), compute_signing_root(root, 2));
    }
}
