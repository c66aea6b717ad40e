use super::errors::EpochProcessingError as Error;
use crate::common::decrease_balance;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, EthSpec, Unsigned};

/// Process slashings: the deferred "correlation" penalty applied halfway through the
/// withdrawability delay, scaled by how much total stake was slashed in the surrounding epochs.
///
/// Spec v0.12.1
pub fn process_slashings<T: EthSpec>(
    state: &mut BeaconState<T>,
    total_balance: u64,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let epoch = state.current_epoch();
    let mut sum_slashings = 0u64;
    for slashing in state.get_all_slashings() {
        sum_slashings.safe_add_assign(*slashing)?;
    }

    let mut penalties = vec![];

    for (index, validator) in state.validators.iter().enumerate() {
        if validator.slashed
            && epoch.safe_add(T::EpochsPerSlashingsVector::to_u64().safe_div(2)?)?
                == validator.withdrawable_epoch
        {
            let increment = spec.effective_balance_increment;
            let penalty_numerator = validator
                .effective_balance
                .safe_div(increment)?
                .safe_mul(std::cmp::min(sum_slashings.safe_mul(3)?, total_balance))?;
            let penalty = penalty_numerator
                .safe_div(total_balance)?
                .safe_mul(increment)?;

            penalties.push((index, penalty));
        }
    }

    for (index, penalty) in penalties {
        decrease_balance(state, index, penalty)?;
    }

    Ok(())
}
