use crate::{DepositData, Hash256};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::typenum::U33;
use ssz_types::FixedVector;
use tree_hash_derive::TreeHash;

/// The depth of the Merkle tree maintained by the deposit contract. Proofs carry one extra node
/// for the mixed-in leaf count.
pub const DEPOSIT_TREE_DEPTH: usize = 32;

/// A deposit to potentially become a beacon chain validator.
///
/// `proof` is a Merkle branch into the eth1 deposit tree, at `DEPOSIT_TREE_DEPTH + 1` nodes.
///
/// Spec v0.12.1
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Deposit {
    pub proof: FixedVector<Hash256, U33>,
    pub data: DepositData,
}
