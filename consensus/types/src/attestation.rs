use crate::{AggregateSignature, AttestationData, BitList, EthSpec};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// Details an attestation that can be slashable.
///
/// The length of `aggregation_bits` equals the attesting committee's size; set bits identify
/// the participating members.
///
/// Spec v0.12.1
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "T: EthSpec")]
pub struct Attestation<T: EthSpec> {
    pub aggregation_bits: BitList<T::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: AggregateSignature,
}

impl<T: EthSpec> PartialEq for Attestation<T> {
    fn eq(&self, other: &Self) -> bool {
        self.aggregation_bits == other.aggregation_bits
            && self.data == other.data
            && self.signature == other.signature
    }
}

impl<T: EthSpec> Eq for Attestation<T> {}

impl<T: EthSpec> std::hash::Hash for Attestation<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.aggregation_bits.as_slice().hash(state);
        self.data.hash(state);
        self.signature.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainnetEthSpec;

    ssz_and_tree_hash_tests!(Attestation<MainnetEthSpec>);
}
