use crate::{Hash256, Signature, Slot};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash::SignedRoot;
use tree_hash_derive::{SignedRoot, TreeHash};

/// A header of a `BeaconBlock`.
///
/// The signature is the trailing field and is elided from the signing root, so a header's
/// canonical identity never commits to its own signature.
///
/// Spec v0.12.1
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash, SignedRoot)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body_root: Hash256,
    #[signed_root(skip_hashing)]
    pub signature: Signature,
}

impl BeaconBlockHeader {
    /// Returns the `tree_hash_root` of the header, with the signature elided.
    ///
    /// Spec v0.12.1
    pub fn canonical_root(&self) -> Hash256 {
        self.signed_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    ssz_and_tree_hash_tests!(BeaconBlockHeader);

    #[test]
    fn canonical_root_is_signature_independent() {
        let header = BeaconBlockHeader {
            slot: Slot::new(42),
            parent_root: Hash256::repeat_byte(1),
            state_root: Hash256::repeat_byte(2),
            body_root: Hash256::repeat_byte(3),
            signature: Signature::empty(),
        };

        let mut signed = header.clone();
        signed.signature = crate::SecretKey::random().sign(Hash256::zero());

        assert_eq!(header.canonical_root(), signed.canonical_root());
        assert_ne!(
            tree_hash::TreeHash::tree_hash_root(&header),
            tree_hash::TreeHash::tree_hash_root(&signed)
        );
    }
}
