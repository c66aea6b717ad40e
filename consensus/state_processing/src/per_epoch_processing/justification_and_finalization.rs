use super::errors::EpochProcessingError as Error;
use super::validator_statuses::TotalBalances;
use safe_arith::SafeArith;
use types::{BeaconState, BitVector, Checkpoint, EthSpec};

/// Update the justified and finalized checkpoints for matching target attestations.
///
/// Two boundary bitmaps (previous- and current-epoch target attesters) justify their epoch when
/// they reach a 2/3 supermajority of stake; the four most recent justification bits then drive
/// the three finalization rules.
///
/// Spec v0.12.1
#[allow(clippy::if_same_then_else)] // For readability and consistency with the spec.
pub fn process_justification_and_finalization<T: EthSpec>(
    state: &mut BeaconState<T>,
    total_balances: &TotalBalances,
) -> Result<(), Error> {
    if state.current_epoch() <= T::genesis_epoch().safe_add(1)? {
        return Ok(());
    }

    let previous_epoch = state.previous_epoch();
    let current_epoch = state.current_epoch();

    let old_previous_justified_checkpoint = state.previous_justified_checkpoint;
    let old_current_justified_checkpoint = state.current_justified_checkpoint;

    // Process justifications
    state.previous_justified_checkpoint = state.current_justified_checkpoint;

    // Shift the justification bits: bit `i` becomes bit `i + 1`, bit 0 resets.
    let old_bits = state.justification_bits.clone();
    let mut bits = BitVector::new();
    for i in 1..bits.len() {
        bits.set(i, old_bits.get(i - 1)?)?;
    }

    if total_balances
        .previous_epoch_target_attesters()
        .safe_mul(3)?
        >= total_balances.current_epoch().safe_mul(2)?
    {
        state.current_justified_checkpoint = Checkpoint {
            epoch: previous_epoch,
            root: *state.get_block_root_at_epoch(previous_epoch)?,
        };
        bits.set(1, true)?;
    }

    if total_balances
        .current_epoch_target_attesters()
        .safe_mul(3)?
        >= total_balances.current_epoch().safe_mul(2)?
    {
        state.current_justified_checkpoint = Checkpoint {
            epoch: current_epoch,
            root: *state.get_block_root_at_epoch(current_epoch)?,
        };
        bits.set(0, true)?;
    }

    state.justification_bits = bits;

    // Process finalizations
    let bits = &state.justification_bits;
    let all_bits_set = |range: std::ops::Range<usize>| -> Result<bool, Error> {
        let mut all_set = true;
        for i in range {
            all_set &= bits.get(i)?;
        }
        Ok(all_set)
    };

    // The 2nd/3rd/4th most recent epochs are justified, the 2nd using the 4th as source.
    if all_bits_set(1..4)? && old_previous_justified_checkpoint.epoch.safe_add(3)? == current_epoch
    {
        state.finalized_checkpoint = old_previous_justified_checkpoint;
    }
    // The 2nd/3rd most recent epochs are justified, the 2nd using the 3rd as source.
    if all_bits_set(1..3)? && old_previous_justified_checkpoint.epoch.safe_add(2)? == current_epoch
    {
        state.finalized_checkpoint = old_previous_justified_checkpoint;
    }
    // The 1st/2nd/3rd most recent epochs are justified, the 1st using the 3rd as source.
    if all_bits_set(0..3)? && old_current_justified_checkpoint.epoch.safe_add(2)? == current_epoch
    {
        state.finalized_checkpoint = old_current_justified_checkpoint;
    }
    // The 1st/2nd most recent epochs are justified, the 1st using the 2nd as source.
    if all_bits_set(0..2)? && old_current_justified_checkpoint.epoch.safe_add(1)? == current_epoch
    {
        state.finalized_checkpoint = old_current_justified_checkpoint;
    }

    Ok(())
}
