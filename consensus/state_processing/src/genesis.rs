use crate::common::DepositDataTree;
use crate::per_block_processing::{errors::BlockProcessingError, process_deposit};
use safe_arith::SafeArith;
use tree_hash::TreeHash;
use types::*;

/// Initialize a `BeaconState` from genesis parameters and an ordered list of deposits.
///
/// The deposit root is re-computed incrementally so every deposit is ingested against the tree
/// that contained it on the eth1 chain.
///
/// Spec v0.12.1
pub fn initialize_beacon_state_from_eth1<T: EthSpec>(
    eth1_block_hash: Hash256,
    eth1_timestamp: u64,
    deposits: Vec<Deposit>,
    spec: &ChainSpec,
) -> Result<BeaconState<T>, BlockProcessingError> {
    let genesis_time = eth1_timestamp;
    let eth1_data = Eth1Data {
        // Temporary deposit root
        deposit_root: Hash256::zero(),
        deposit_count: deposits.len() as u64,
        block_hash: eth1_block_hash,
    };
    let mut state = BeaconState::new(genesis_time, eth1_data, spec);

    // Seed RANDAO with Eth1 entropy
    state.randao_mixes = FixedVector::from(vec![
        eth1_block_hash;
        T::EpochsPerHistoricalVector::to_usize()
    ]);

    let mut deposit_tree = DepositDataTree::create(&[], 0, DEPOSIT_TREE_DEPTH);

    for deposit in deposits.iter() {
        deposit_tree
            .push_leaf(deposit.data.tree_hash_root())
            .map_err(BlockProcessingError::MerkleTreeError)?;
        state.eth1_data.deposit_root = deposit_tree.root();
        process_deposit(&mut state, deposit, spec, true)?;
    }

    process_activations(&mut state, spec)?;

    // Now that we have our validators, initialize the caches (including the committees)
    state.build_all_committee_caches(spec)?;

    Ok(state)
}

/// Activate genesis validators: those that deposited the full effective balance are active from
/// the genesis epoch.
///
/// Spec v0.12.1
pub fn process_activations<T: EthSpec>(
    state: &mut BeaconState<T>,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for index in 0..state.validators.len() {
        let balance = state.balances[index];
        let validator = &mut state.validators[index];

        validator.effective_balance = std::cmp::min(
            balance.safe_sub(balance.safe_rem(spec.effective_balance_increment)?)?,
            spec.max_effective_balance,
        );

        if validator.effective_balance == spec.max_effective_balance {
            validator.activation_eligibility_epoch = T::genesis_epoch();
            validator.activation_epoch = T::genesis_epoch();
        }
    }

    Ok(())
}
