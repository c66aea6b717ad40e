use types::{BeaconStateError, BitList, EthSpec};

/// Returns validator indices which participated in the attestation, sorted by increasing index.
///
/// Spec v0.12.1
pub fn get_attesting_indices<T: EthSpec>(
    committee: &[usize],
    bitlist: &BitList<T::MaxValidatorsPerCommittee>,
) -> Result<Vec<usize>, BeaconStateError> {
    if bitlist.len() != committee.len() {
        return Err(BeaconStateError::InvalidBitfield);
    }

    let mut indices = Vec::with_capacity(bitlist.num_set_bits());

    for (i, validator_index) in committee.iter().enumerate() {
        if let Ok(true) = bitlist.get(i) {
            indices.push(*validator_index)
        }
    }

    indices.sort_unstable();

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::MainnetEthSpec;

    #[test]
    fn length_mismatch_is_an_error() {
        let committee = vec![4, 9, 2];
        let bits = BitList::with_capacity(2).unwrap();

        assert_eq!(
            get_attesting_indices::<MainnetEthSpec>(&committee, &bits),
            Err(BeaconStateError::InvalidBitfield)
        );
    }

    #[test]
    fn set_bits_select_committee_members() {
        let committee = vec![4, 9, 2];
        let mut bits = BitList::with_capacity(3).unwrap();
        bits.set(0, true).unwrap();
        bits.set(2, true).unwrap();

        assert_eq!(
            get_attesting_indices::<MainnetEthSpec>(&committee, &bits).unwrap(),
            vec![2, 4]
        );
    }
}
