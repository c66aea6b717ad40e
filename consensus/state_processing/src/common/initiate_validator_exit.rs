use safe_arith::SafeArith;
use types::{BeaconState, BeaconStateError as Error, ChainSpec, Epoch, EthSpec};

/// Initiate the exit of the validator of the given `index`.
///
/// Exits are queued: the exit epoch is the furthest scheduled exit (or the earliest permissible
/// exit epoch, whichever is later), bumped by one whenever the per-epoch churn is full.
///
/// Spec v0.12.1
pub fn initiate_validator_exit<T: EthSpec>(
    state: &mut BeaconState<T>,
    index: usize,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if index >= state.validators.len() {
        return Err(Error::UnknownValidator(index));
    }

    // Return if the validator already initiated exit
    if state.validators[index].exit_epoch != spec.far_future_epoch {
        return Ok(());
    }

    // Compute exit queue epoch
    let delayed_epoch = spec.compute_activation_exit_epoch(state.current_epoch())?;
    let mut exit_queue_epoch = state
        .validators
        .iter()
        .filter(|v| v.exit_epoch != spec.far_future_epoch)
        .map(|v| v.exit_epoch)
        .fold(delayed_epoch, std::cmp::max);
    let exit_queue_churn = state
        .validators
        .iter()
        .filter(|v| v.exit_epoch == exit_queue_epoch)
        .count() as u64;

    if exit_queue_churn >= state.get_churn_limit(spec)? {
        exit_queue_epoch.safe_add_assign(Epoch::new(1))?;
    }

    state.validators[index].exit_epoch = exit_queue_epoch;
    state.validators[index].withdrawable_epoch =
        exit_queue_epoch.safe_add(spec.min_validator_withdrawability_delay)?;

    Ok(())
}
