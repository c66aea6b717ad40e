use super::errors::{BlockOperationError, ProposerSlashingInvalid as Invalid};
use super::signature_sets::proposer_slashing_signature_set;
use crate::VerifySignatures;
use types::*;

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

fn error(reason: Invalid) -> BlockOperationError<Invalid> {
    BlockOperationError::invalid(reason)
}

/// Indicates if a `ProposerSlashing` is valid to be included in a block in the current epoch of
/// the given state.
///
/// Returns `Ok(())` if the `ProposerSlashing` is valid, otherwise indicates the reason for
/// invalidity.
///
/// Spec v0.12.1
pub fn verify_proposer_slashing<T: EthSpec>(
    state: &BeaconState<T>,
    proposer_slashing: &ProposerSlashing,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<()> {
    let header_1 = &proposer_slashing.header_1;
    let header_2 = &proposer_slashing.header_2;

    // Verify the header slots match
    verify!(
        header_1.slot == header_2.slot,
        Invalid::ProposalSlotMismatch(header_1.slot, header_2.slot)
    );

    // But the headers are different
    verify!(
        header_1.canonical_root() != header_2.canonical_root(),
        Invalid::ProposalsIdentical
    );

    let proposer = state
        .validators
        .get(proposer_slashing.proposer_index as usize)
        .ok_or_else(|| error(Invalid::ProposerUnknown(proposer_slashing.proposer_index)))?;

    // Verify the proposer is slashable
    verify!(
        proposer.is_slashable_at(state.current_epoch()),
        Invalid::ProposerNotSlashable(proposer_slashing.proposer_index)
    );

    if verify_signatures.is_true() {
        verify!(
            proposer_slashing_signature_set(state, proposer_slashing, header_1, spec)?.verify(),
            Invalid::BadProposal1Signature
        );
        verify!(
            proposer_slashing_signature_set(state, proposer_slashing, header_2, spec)?.verify(),
            Invalid::BadProposal2Signature
        );
    }

    Ok(())
}
