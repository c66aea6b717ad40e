use super::errors::{BlockOperationError, ExitInvalid as Invalid};
use super::signature_sets::exit_signature_set;
use crate::VerifySignatures;
use safe_arith::SafeArith;
use types::*;

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

fn error(reason: Invalid) -> BlockOperationError<Invalid> {
    BlockOperationError::invalid(reason)
}

/// Indicates if a `VoluntaryExit` is valid to be included in a block in the current epoch of the
/// given state.
///
/// Returns `Ok(())` if the `VoluntaryExit` is valid, otherwise indicates the reason for
/// invalidity.
///
/// Spec v0.12.1
pub fn verify_exit<T: EthSpec>(
    state: &BeaconState<T>,
    exit: &VoluntaryExit,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<()> {
    let validator = state
        .validators
        .get(exit.validator_index as usize)
        .ok_or_else(|| error(Invalid::ValidatorUnknown(exit.validator_index)))?;

    // Verify the validator is active.
    verify!(
        validator.is_active_at(state.current_epoch()),
        Invalid::NotActive(exit.validator_index)
    );

    // Verify that the validator has not yet exited.
    verify!(
        validator.exit_epoch == spec.far_future_epoch,
        Invalid::AlreadyExited(exit.validator_index)
    );

    // Exits must specify an epoch when they become valid; they are not valid before then.
    verify!(
        state.current_epoch() >= exit.epoch,
        Invalid::FutureEpoch {
            state: state.current_epoch(),
            exit: exit.epoch,
        }
    );

    // Verify the validator has been active long enough.
    let earliest_exit_epoch = validator
        .activation_epoch
        .safe_add(Epoch::new(spec.shard_committee_period))?;
    verify!(
        state.current_epoch() >= earliest_exit_epoch,
        Invalid::TooYoungToExit {
            current_epoch: state.current_epoch(),
            earliest_exit_epoch,
        }
    );

    if verify_signatures.is_true() {
        verify!(
            exit_signature_set(state, exit, spec)?.verify(),
            Invalid::BadSignature
        );
    }

    Ok(())
}
