use crate::{
    BeaconBlockBody, BeaconBlockHeader, ChainSpec, EthSpec, Hash256, Signature, Slot,
};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash::{SignedRoot, TreeHash};
use tree_hash_derive::{SignedRoot, TreeHash};

/// A block of the `BeaconChain`.
///
/// The trailing signature is elided from the signing root; a block's canonical root is its
/// signing root, so identity never depends on the proposer's signature.
///
/// Spec v0.12.1
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash, SignedRoot)]
#[serde(bound = "T: EthSpec")]
pub struct BeaconBlock<T: EthSpec> {
    pub slot: Slot,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBody<T>,
    #[signed_root(skip_hashing)]
    pub signature: Signature,
}

impl<T: EthSpec> BeaconBlock<T> {
    /// Returns an empty block to be used during genesis.
    ///
    /// Spec v0.12.1
    pub fn empty(spec: &ChainSpec) -> Self {
        BeaconBlock {
            slot: spec.genesis_slot,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body: BeaconBlockBody::empty(),
            signature: Signature::empty(),
        }
    }

    /// Returns the `tree_hash_root | hash_tree_root` of the block, with the signature elided.
    ///
    /// Spec v0.12.1
    pub fn canonical_root(&self) -> Hash256 {
        self.signed_root()
    }

    /// Returns a full `BeaconBlockHeader` of this block.
    ///
    /// Note: This method is used instead of an `Into` impl to avoid a `Clone` of an entire block
    /// when you want to have the block _and_ the header.
    ///
    /// Note: performs a full tree-hash of `self.body`.
    ///
    /// Spec v0.12.1
    pub fn block_header(&self) -> BeaconBlockHeader {
        BeaconBlockHeader {
            slot: self.slot,
            parent_root: self.parent_root,
            state_root: self.state_root,
            body_root: self.body.tree_hash_root(),
            signature: self.signature.clone(),
        }
    }

    /// Returns a "temporary" header, where the `state_root` is `Hash256::zero()`.
    ///
    /// Spec v0.12.1
    pub fn temporary_block_header(&self) -> BeaconBlockHeader {
        BeaconBlockHeader {
            state_root: Hash256::zero(),
            signature: Signature::empty(),
            ..self.block_header()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainnetEthSpec;

    ssz_and_tree_hash_tests!(BeaconBlock<MainnetEthSpec>);

    #[test]
    fn block_and_header_roots_agree() {
        let spec = ChainSpec::mainnet();
        let block: BeaconBlock<MainnetEthSpec> = BeaconBlock::empty(&spec);
        let header = block.block_header();

        assert_eq!(block.canonical_root(), header.canonical_root());
    }
}
