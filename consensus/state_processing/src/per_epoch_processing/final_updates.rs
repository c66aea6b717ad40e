use super::errors::EpochProcessingError as Error;
use safe_arith::SafeArith;
use tree_hash::TreeHash;
use types::{BeaconState, ChainSpec, EthSpec, HistoricalBatch, Unsigned, VariableList};

/// Finish up an epoch update: eth1 voting window reset, effective balance hysteresis, ring
/// rotations, historical accumulation and attestation buffer swap.
///
/// Spec v0.12.1
pub fn process_final_updates<T: EthSpec>(
    state: &mut BeaconState<T>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let current_epoch = state.current_epoch();
    let next_epoch = state.next_epoch()?;

    // Reset eth1 data votes.
    if state
        .slot
        .safe_add(1)?
        .safe_rem(T::SlotsPerEth1VotingPeriod::to_u64())?
        == 0
    {
        state.eth1_data_votes = VariableList::empty();
    }

    // Update effective balances with hysteresis (lag).
    for index in 0..state.validators.len() {
        let balance = state.balances[index];
        let validator = &mut state.validators[index];

        let half_increment = spec.effective_balance_increment.safe_div(2)?;
        if balance < validator.effective_balance
            || validator
                .effective_balance
                .safe_add(half_increment.safe_mul(3)?)?
                < balance
        {
            validator.effective_balance = std::cmp::min(
                balance.safe_sub(balance.safe_rem(spec.effective_balance_increment)?)?,
                spec.max_effective_balance,
            );
        }
    }

    // Reset slashings for the epoch about to be entered.
    state.set_slashings(next_epoch, 0)?;

    // Set randao mix: the ring position for the next epoch inherits the current mix.
    state.set_randao_mix(next_epoch, *state.get_randao_mix(current_epoch)?)?;

    // Set historical root accumulator.
    if next_epoch
        .as_u64()
        .safe_rem(T::SlotsPerHistoricalRoot::to_u64().safe_div(T::slots_per_epoch())?)?
        == 0
    {
        let historical_batch = HistoricalBatch::<T> {
            block_roots: state.block_roots.clone(),
            state_roots: state.state_roots.clone(),
        };
        state
            .historical_roots
            .push(historical_batch.tree_hash_root())?;
    }

    // Rotate current/previous epoch attestations.
    state.previous_epoch_attestations =
        std::mem::replace(&mut state.current_epoch_attestations, VariableList::empty());

    Ok(())
}
