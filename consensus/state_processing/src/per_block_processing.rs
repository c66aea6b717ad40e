use crate::common::{increase_balance, slash_validator};
use errors::{BlockOperationError, BlockProcessingError, HeaderInvalid, IntoWithIndex};
use safe_arith::SafeArith;
use signature_sets::{block_proposal_signature_set, randao_signature_set};
use types::*;

pub use self::verify_attester_slashing::{
    get_slashable_indices, get_slashable_indices_modular, verify_attester_slashing,
};
pub use self::verify_proposer_slashing::verify_proposer_slashing;
pub use is_valid_indexed_attestation::is_valid_indexed_attestation;
pub use verify_attestation::{
    verify_attestation_for_block_inclusion, verify_attestation_for_state,
};
pub use verify_deposit::{
    get_existing_validator_index, verify_deposit_merkle_proof, verify_deposit_signature,
};
pub use verify_exit::verify_exit;

pub mod errors;
mod is_valid_indexed_attestation;
pub mod signature_sets;
mod verify_attestation;
mod verify_attester_slashing;
mod verify_deposit;
mod verify_exit;
mod verify_proposer_slashing;

/// The strategy to be used when validating the block's signatures.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum VerifySignatures {
    /// Validate all signatures encountered.
    True,
    /// Do not validate any signature. Use with caution.
    False,
}

impl VerifySignatures {
    pub fn is_true(self) -> bool {
        self == VerifySignatures::True
    }

    /// Derive the strategy from the spec's `bls_verify` option.
    pub fn from_spec(spec: &ChainSpec) -> Self {
        if spec.bls_verify {
            VerifySignatures::True
        } else {
            VerifySignatures::False
        }
    }
}

/// Updates the state for a new block, whilst validating that the block is valid, optionally
/// checking the block proposer signature.
///
/// Returns `Ok(())` if the block is valid and the state was successfully updated. Otherwise
/// returns an error describing why the block was invalid or how the function failed to execute.
///
/// The ordering (header, randao, eth1 data, operations) is mandated by the specification. Any
/// error aborts processing immediately; callers apply the transition to a disposable clone so a
/// failed block leaves no partial effects.
///
/// Spec v0.12.1
pub fn per_block_processing<T: EthSpec>(
    state: &mut BeaconState<T>,
    block: &BeaconBlock<T>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    process_block_header(state, block, verify_signatures, spec)?;

    // Ensure the current and previous epoch committee caches are built.
    state.build_committee_cache(RelativeEpoch::Previous, spec)?;
    state.build_committee_cache(RelativeEpoch::Current, spec)?;

    process_randao(state, block, verify_signatures, spec)?;
    process_eth1_data(state, &block.body.eth1_data)?;
    process_operations(state, &block.body, verify_signatures, spec)?;

    Ok(())
}

/// Processes the block header, mandating the slot to match the state's, the parent root to match
/// the signing root of the state's latest header, and the proposer to be un-slashed.
///
/// Spec v0.12.1
pub fn process_block_header<T: EthSpec>(
    state: &mut BeaconState<T>,
    block: &BeaconBlock<T>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockOperationError<HeaderInvalid>> {
    // Verify that the slots match
    verify!(block.slot == state.slot, HeaderInvalid::StateSlotMismatch);

    let expected_previous_block_root = state.latest_block_header.canonical_root();
    verify!(
        block.parent_root == expected_previous_block_root,
        HeaderInvalid::ParentBlockRootMismatch {
            state: expected_previous_block_root,
            block: block.parent_root,
        }
    );

    state.latest_block_header = block.temporary_block_header();

    // Verify proposer is not slashed
    let proposer_index = state.get_beacon_proposer_index(block.slot, spec)?;
    verify!(
        !state
            .validators
            .get(proposer_index)
            .ok_or(BeaconStateError::UnknownValidator(proposer_index))?
            .slashed,
        HeaderInvalid::ProposerSlashed(proposer_index)
    );

    if verify_signatures.is_true() {
        verify!(
            block_proposal_signature_set(state, proposer_index, block, spec)?.verify(),
            HeaderInvalid::ProposalSignatureInvalid
        );
    }

    Ok(())
}

/// Verifies the `randao_reveal` against the block's proposer pubkey and updates
/// `state.randao_mixes`.
///
/// Spec v0.12.1
pub fn process_randao<T: EthSpec>(
    state: &mut BeaconState<T>,
    block: &BeaconBlock<T>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if verify_signatures.is_true() {
        let proposer_index = state.get_beacon_proposer_index(block.slot, spec)?;

        // Verify RANDAO reveal signature.
        block_verify!(
            randao_signature_set(state, proposer_index, &block.body.randao_reveal, spec)?
                .verify(),
            BlockProcessingError::RandaoSignatureInvalid
        );
    }

    // Update the current epoch RANDAO mix.
    state.update_randao_mix(state.current_epoch(), &block.body.randao_reveal)?;

    Ok(())
}

/// Update the `state.eth1_data_votes` based upon the `eth1_data` provided.
///
/// Spec v0.12.1
pub fn process_eth1_data<T: EthSpec>(
    state: &mut BeaconState<T>,
    eth1_data: &Eth1Data,
) -> Result<(), BlockProcessingError> {
    if let Some(new_eth1_data) = get_new_eth1_data(state, eth1_data)? {
        state.eth1_data = new_eth1_data;
    }

    state.eth1_data_votes.push(eth1_data.clone())?;

    Ok(())
}

/// Returns `Ok(Some(eth1_data))` if adding the given `eth1_data` to `state.eth1_data_votes` would
/// result in a change to `state.eth1_data`: a strict majority of the voting window.
///
/// Spec v0.12.1
pub fn get_new_eth1_data<T: EthSpec>(
    state: &BeaconState<T>,
    eth1_data: &Eth1Data,
) -> Result<Option<Eth1Data>, BlockProcessingError> {
    let num_votes = state
        .eth1_data_votes
        .iter()
        .filter(|vote| *vote == eth1_data)
        .count();

    // The +1 is to account for the `eth1_data` supplied to the function.
    if num_votes.safe_add(1)?.safe_mul(2)? > T::SlotsPerEth1VotingPeriod::to_usize() {
        Ok(Some(eth1_data.clone()))
    } else {
        Ok(None)
    }
}

/// Processes the operations of the block body in the mandated order: proposer slashings,
/// attester slashings, attestations, deposits, voluntary exits.
///
/// Spec v0.12.1
pub fn process_operations<T: EthSpec>(
    state: &mut BeaconState<T>,
    body: &BeaconBlockBody<T>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    process_proposer_slashings(state, &body.proposer_slashings, verify_signatures, spec)?;
    process_attester_slashings(state, &body.attester_slashings, verify_signatures, spec)?;
    process_attestations(state, &body.attestations, verify_signatures, spec)?;
    process_deposits(state, &body.deposits, spec)?;
    process_exits(state, &body.voluntary_exits, verify_signatures, spec)?;

    Ok(())
}

/// Validates each `ProposerSlashing` and updates the state, short-circuiting on an invalid object.
///
/// Returns `Ok(())` if the validation and state updates completed successfully, otherwise returns
/// an `Err` describing the invalid object or cause of failure.
///
/// Spec v0.12.1
pub fn process_proposer_slashings<T: EthSpec>(
    state: &mut BeaconState<T>,
    proposer_slashings: &[ProposerSlashing],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for (i, proposer_slashing) in proposer_slashings.iter().enumerate() {
        verify_proposer_slashing(state, proposer_slashing, verify_signatures, spec)
            .map_err(|e| e.into_with_index(i))?;

        slash_validator(
            state,
            proposer_slashing.proposer_index as usize,
            None,
            spec,
        )?;
    }

    Ok(())
}

/// Validates each `AttesterSlashing` and updates the state, short-circuiting on an invalid
/// object.
///
/// Spec v0.12.1
pub fn process_attester_slashings<T: EthSpec>(
    state: &mut BeaconState<T>,
    attester_slashings: &[AttesterSlashing<T>],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for (i, attester_slashing) in attester_slashings.iter().enumerate() {
        let slashable_indices =
            verify_attester_slashing(state, attester_slashing, verify_signatures, spec)
                .map_err(|e| e.into_with_index(i))?;

        for i in slashable_indices {
            slash_validator(state, i as usize, None, spec)?;
        }
    }

    Ok(())
}

/// Validates each `Attestation` and updates the state, short-circuiting on an invalid object.
///
/// Spec v0.12.1
pub fn process_attestations<T: EthSpec>(
    state: &mut BeaconState<T>,
    attestations: &[Attestation<T>],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let proposer_index = state.get_beacon_proposer_index(state.slot, spec)? as u64;

    for (i, attestation) in attestations.iter().enumerate() {
        verify_attestation_for_block_inclusion(state, attestation, verify_signatures, spec)
            .map_err(|e| e.into_with_index(i))?;

        let pending_attestation = PendingAttestation {
            aggregation_bits: attestation.aggregation_bits.clone(),
            data: attestation.data.clone(),
            inclusion_delay: state.slot.safe_sub(attestation.data.slot)?.as_u64(),
            proposer_index,
        };

        if attestation.data.target.epoch == state.current_epoch() {
            state.current_epoch_attestations.push(pending_attestation)?;
        } else {
            state.previous_epoch_attestations.push(pending_attestation)?;
        }
    }

    Ok(())
}

/// Validates each `Deposit` and updates the state, short-circuiting on an invalid object.
///
/// The block must contain exactly `min(MAX_DEPOSITS, outstanding deposit count)` deposits.
///
/// Spec v0.12.1
pub fn process_deposits<T: EthSpec>(
    state: &mut BeaconState<T>,
    deposits: &[Deposit],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let expected_deposit_len = std::cmp::min(
        T::MaxDeposits::to_u64(),
        state.get_outstanding_deposit_len()?,
    );
    block_verify!(
        deposits.len() as u64 == expected_deposit_len,
        BlockProcessingError::DepositCountInvalid {
            expected: expected_deposit_len as usize,
            found: deposits.len(),
        }
    );

    for deposit in deposits {
        process_deposit(state, deposit, spec, true)?;
    }

    Ok(())
}

/// Process a single deposit, verifying its Merkle proof against the state's eth1 deposit root at
/// index `state.eth1_deposit_index` (unless `verify_merkle_proof` is false, as during genesis).
///
/// Spec v0.12.1
pub fn process_deposit<T: EthSpec>(
    state: &mut BeaconState<T>,
    deposit: &Deposit,
    spec: &ChainSpec,
    verify_merkle_proof: bool,
) -> Result<(), BlockProcessingError> {
    let deposit_index = state.eth1_deposit_index;

    if verify_merkle_proof {
        verify_deposit_merkle_proof(state, deposit, deposit_index, spec)
            .map_err(|e| e.into_with_index(deposit_index as usize))?;
    }

    state.eth1_deposit_index.safe_add_assign(1)?;

    // Get an `Option<u64>` where `u64` is the validator index if this deposit public key
    // already exists in the beacon_state.
    let validator_index = get_existing_validator_index(state, &deposit.data.pubkey)
        .map_err(|e| e.into_with_index(deposit_index as usize))?;

    let amount = deposit.data.amount;

    if let Some(index) = validator_index {
        // Update the existing validator balance.
        increase_balance(state, index as usize, amount)?;
    } else {
        // The proof-of-possession is only checked when the spec option demands it. An invalid
        // deposit is not an invalid block; it is simply ignored.
        if spec.bls_verify_proof_of_possession && !deposit.data.verify_signature(spec) {
            return Ok(());
        }

        // Create a new validator.
        let validator = Validator {
            pubkey: deposit.data.pubkey,
            withdrawal_credentials: deposit.data.withdrawal_credentials,
            activation_eligibility_epoch: state.current_epoch().safe_add(1)?,
            activation_epoch: spec.far_future_epoch,
            exit_epoch: spec.far_future_epoch,
            withdrawable_epoch: spec.far_future_epoch,
            effective_balance: std::cmp::min(
                amount.safe_sub(amount.safe_rem(spec.effective_balance_increment)?)?,
                spec.max_effective_balance,
            ),
            slashed: false,
        };
        state.validators.push(validator)?;
        state.balances.push(amount)?;
    }

    Ok(())
}

/// Validates each `VoluntaryExit` and updates the state, short-circuiting on an invalid object.
///
/// Spec v0.12.1
pub fn process_exits<T: EthSpec>(
    state: &mut BeaconState<T>,
    voluntary_exits: &[VoluntaryExit],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for (i, exit) in voluntary_exits.iter().enumerate() {
        verify_exit(state, exit, verify_signatures, spec).map_err(|e| e.into_with_index(i))?;

        crate::common::initiate_validator_exit(state, exit.validator_index as usize, spec)?;
    }

    Ok(())
}
