use super::errors::{BlockOperationError, DepositInvalid as Invalid};
use merkle_proof::verify_merkle_proof;
use tree_hash::TreeHash;
use types::*;

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

/// Verify `Deposit.pubkey` signed `Deposit.signature`.
///
/// Spec v0.12.1
pub fn verify_deposit_signature(deposit_data: &DepositData, spec: &ChainSpec) -> Result<()> {
    verify!(deposit_data.verify_signature(spec), Invalid::BadSignature);

    Ok(())
}

/// Returns a `Some(validator index)` if a pubkey already exists in the `validators`, otherwise
/// returns `None`.
pub fn get_existing_validator_index<T: EthSpec>(
    state: &BeaconState<T>,
    pubkey: &PublicKeyBytes,
) -> Result<Option<u64>> {
    let validator_index = state
        .validators
        .iter()
        .position(|validator| validator.pubkey == *pubkey);
    Ok(validator_index.map(|i| i as u64))
}

/// Verify that a deposit is included in the state's eth1 deposit root.
///
/// The deposit index is provided as a parameter so we can check proofs
/// before they're due to be processed, and in parallel.
///
/// Spec v0.12.1
pub fn verify_deposit_merkle_proof<T: EthSpec>(
    state: &BeaconState<T>,
    deposit: &Deposit,
    deposit_index: u64,
    spec: &ChainSpec,
) -> Result<()> {
    let leaf = deposit.data.tree_hash_root();

    verify!(
        verify_merkle_proof(
            leaf,
            &deposit.proof[..],
            spec.deposit_contract_tree_depth as usize + 1,
            deposit_index as usize,
            state.eth1_data.deposit_root,
        ),
        Invalid::BadMerkleProof
    );

    Ok(())
}
