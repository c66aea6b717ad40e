use super::errors::EpochProcessingError as Error;
use crate::common::initiate_validator_exit;
use itertools::Itertools;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, EthSpec, Validator};

/// Performs a validator registry update, if required.
///
/// Promotes validators to activation eligibility, ejects under-funded validators, and schedules
/// eligible validators for activation in FIFO order limited by the churn.
///
/// Spec v0.12.1
pub fn process_registry_updates<T: EthSpec>(
    state: &mut BeaconState<T>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    // Process activation eligibility and ejections.
    //
    // Collect eligible and exiting validators (we need to avoid mutating the state while
    // iterating). We assume it's safe to re-order the change in eligibility and `initiate_exit`.
    // Rest assured exiting validators will still be exited in the same order as in the spec.
    let current_epoch = state.current_epoch();
    let is_ejectable = |validator: &Validator| {
        validator.is_active_at(current_epoch)
            && validator.effective_balance <= spec.ejection_balance
    };
    let indices_to_update: Vec<usize> = state
        .validators
        .iter()
        .enumerate()
        .filter(|(_, validator)| {
            (validator.activation_eligibility_epoch == spec.far_future_epoch
                && validator.effective_balance == spec.max_effective_balance)
                || is_ejectable(validator)
        })
        .map(|(idx, _)| idx)
        .collect();

    for index in indices_to_update {
        let validator = &mut state.validators[index];

        if validator.activation_eligibility_epoch == spec.far_future_epoch
            && validator.effective_balance == spec.max_effective_balance
        {
            validator.activation_eligibility_epoch = current_epoch.safe_add(1)?;
        }

        if is_ejectable(&state.validators[index]) {
            initiate_validator_exit(state, index, spec)?;
        }
    }

    // Queue validators eligible for activation and not dequeued for activation prior to the
    // finalized epoch.
    let activation_queue = state
        .validators
        .iter()
        .enumerate()
        .filter(|(_, validator)| {
            validator.activation_eligibility_epoch <= state.finalized_checkpoint.epoch
                && validator.activation_epoch == spec.far_future_epoch
        })
        .sorted_by_key(|(index, validator)| (validator.activation_eligibility_epoch, *index))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    // Dequeue validators for activation up to churn limit.
    let churn_limit = state.get_churn_limit(spec)? as usize;
    let delayed_activation_epoch = spec.compute_activation_exit_epoch(current_epoch)?;
    for index in activation_queue.into_iter().take(churn_limit) {
        state.validators[index].activation_epoch = delayed_activation_epoch;
    }

    Ok(())
}
