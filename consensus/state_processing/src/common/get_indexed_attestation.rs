use super::get_attesting_indices;
use crate::per_block_processing::errors::{
    BlockOperationError, IndexedAttestationInvalid as Invalid,
};
use types::{Attestation, EthSpec, IndexedAttestation, VariableList};

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

/// Convert `attestation` to (almost) indexed-verifiable form.
///
/// Spec v0.12.1
pub fn get_indexed_attestation<T: EthSpec>(
    committee: &[usize],
    attestation: &Attestation<T>,
) -> Result<IndexedAttestation<T>> {
    let attesting_indices = get_attesting_indices::<T>(committee, &attestation.aggregation_bits)?;

    Ok(IndexedAttestation {
        attesting_indices: VariableList::new(
            attesting_indices.into_iter().map(|x| x as u64).collect(),
        )?,
        data: attestation.data.clone(),
        signature: attestation.signature.clone(),
    })
}
