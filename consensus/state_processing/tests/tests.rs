use safe_arith::SafeArith;
use state_processing::common::DepositDataTree;
use state_processing::{
    per_block_processing::{
        process_attester_slashings, process_deposits, process_exits, process_proposer_slashings,
    },
    per_slot_processing, VerifySignatures,
};
use tree_hash::TreeHash;
use types::test_utils::{generate_deterministic_keypair, TestingBeaconStateBuilder};
use types::*;

type E = MinimalEthSpec;

const VALIDATOR_COUNT: usize = 16;

fn test_spec() -> ChainSpec {
    let mut spec = E::default_spec();
    // Signatures are checked by their own tests; transition tests drive the machinery with
    // unsigned containers.
    spec.bls_verify = false;
    spec.bls_verify_proof_of_possession = false;
    spec
}

fn fresh_state(spec: &ChainSpec) -> BeaconState<E> {
    let (state, _keypairs) = TestingBeaconStateBuilder::new(VALIDATOR_COUNT, spec).build();
    state
}

mod slot_processing {
    use super::*;

    /// Applying two epochs of empty slots penalizes every validator: nobody attested, so
    /// everybody misses the source, target and head rewards.
    #[test]
    fn empty_chain_strictly_decreases_every_balance() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        let initial_balances: Vec<u64> = state.balances.iter().copied().collect();

        for _ in 0..(2 * E::slots_per_epoch()) {
            per_slot_processing(&mut state, None, &spec).unwrap();
        }

        assert_eq!(state.slot, Slot::new(2 * E::slots_per_epoch()));

        for (i, balance) in state.balances.iter().enumerate() {
            assert!(
                *balance < initial_balances[i],
                "validator {} was not penalized: {} -> {}",
                i,
                initial_balances[i],
                balance
            );
        }
    }

    /// Within an epoch, slot processing only advances the slot and refreshes the rings; the
    /// registry and balances are untouched, and the transition is deterministic.
    #[test]
    fn intra_epoch_slots_only_touch_the_rings() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);
        let mut twin = state.clone();

        let original = state.clone();

        for _ in 0..3 {
            per_slot_processing(&mut state, None, &spec).unwrap();
            per_slot_processing(&mut twin, None, &spec).unwrap();
        }

        assert_eq!(state, twin, "identical inputs must map to identical states");
        assert_eq!(state.slot, Slot::new(3));
        assert_eq!(state.balances, original.balances);
        assert_eq!(state.validators, original.validators);

        // The rings were refreshed with the header root and state roots.
        let header_root = state.latest_block_header.canonical_root();
        for slot in 0..3u64 {
            assert_eq!(*state.get_block_root(Slot::new(slot)).unwrap(), header_root);
        }
    }

    /// The cached (incremental) root must agree with the freshly computed root after a few
    /// transitions.
    #[test]
    fn incremental_root_tracks_full_root_across_transitions() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        for _ in 0..(E::slots_per_epoch() + 2) {
            per_slot_processing(&mut state, None, &spec).unwrap();
            assert_eq!(state.update_tree_hash_cache().unwrap(), state.canonical_root());
        }
    }
}

mod deposits {
    use super::*;

    #[test]
    fn deposit_appends_a_new_validator() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        let keypair = generate_deterministic_keypair(99);
        let data = DepositData {
            pubkey: PublicKeyBytes::from(&keypair.pk),
            withdrawal_credentials: Hash256::repeat_byte(7),
            amount: spec.max_effective_balance,
            signature: SignatureBytes::empty(),
        };

        let leaf = data.tree_hash_root();
        let tree = DepositDataTree::create(&[leaf], 1, DEPOSIT_TREE_DEPTH);
        let (_, proof) = tree.generate_proof(0);

        state.eth1_data = Eth1Data {
            deposit_root: tree.root(),
            deposit_count: 1,
            block_hash: Hash256::repeat_byte(0x42),
        };
        state.eth1_deposit_index = 0;

        let deposit = Deposit {
            proof: proof.into(),
            data,
        };

        process_deposits(&mut state, &[deposit], &spec).unwrap();

        assert_eq!(state.validators.len(), VALIDATOR_COUNT + 1);
        assert_eq!(state.balances.len(), VALIDATOR_COUNT + 1);
        assert_eq!(state.eth1_deposit_index, 1);

        let new_validator = &state.validators[VALIDATOR_COUNT];
        assert_eq!(
            new_validator.activation_eligibility_epoch,
            state.current_epoch().safe_add(1u64).unwrap()
        );
        assert_eq!(new_validator.activation_epoch, spec.far_future_epoch);
        assert_eq!(state.balances[VALIDATOR_COUNT], spec.max_effective_balance);
    }

    #[test]
    fn deposit_with_known_pubkey_tops_up() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        // Deposit for the pre-existing validator 0.
        let data = DepositData {
            pubkey: state.validators[0].pubkey,
            withdrawal_credentials: Hash256::zero(),
            amount: 1_000_000_000,
            signature: SignatureBytes::empty(),
        };

        let leaf = data.tree_hash_root();
        let tree = DepositDataTree::create(&[leaf], 1, DEPOSIT_TREE_DEPTH);
        let (_, proof) = tree.generate_proof(0);

        state.eth1_data = Eth1Data {
            deposit_root: tree.root(),
            deposit_count: 1,
            block_hash: Hash256::repeat_byte(0x42),
        };
        state.eth1_deposit_index = 0;

        let balance_before = state.balances[0];

        process_deposits(
            &mut state,
            &[Deposit {
                proof: proof.into(),
                data,
            }],
            &spec,
        )
        .unwrap();

        assert_eq!(state.validators.len(), VALIDATOR_COUNT);
        assert_eq!(state.balances[0], balance_before + 1_000_000_000);
    }

    #[test]
    fn deposit_count_must_be_exact() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        state.eth1_data.deposit_count = 1;
        state.eth1_deposit_index = 0;

        // Zero deposits when one is outstanding: fatal validation failure.
        assert!(process_deposits(&mut state, &[], &spec).is_err());
    }
}

mod slashings {
    use super::*;

    #[test]
    fn proposer_slashing_penalizes_and_rewards() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);
        state
            .build_committee_cache(RelativeEpoch::Current, &spec)
            .unwrap();

        let block_proposer = state
            .get_beacon_proposer_index(state.slot, &spec)
            .unwrap();
        // Pick an offender other than the block proposer so the reward accounting is visible.
        let offender = (block_proposer + 1) % VALIDATOR_COUNT;

        let make_header = |state_root: u8| BeaconBlockHeader {
            slot: state.slot,
            parent_root: Hash256::repeat_byte(0xaa),
            state_root: Hash256::repeat_byte(state_root),
            body_root: Hash256::zero(),
            signature: Signature::empty(),
        };

        let slashing = ProposerSlashing {
            proposer_index: offender as u64,
            header_1: make_header(0x01),
            header_2: make_header(0x02),
        };

        let effective_balance = state.validators[offender].effective_balance;
        let penalty = effective_balance / spec.min_slashing_penalty_quotient;
        let whistleblower_reward = effective_balance / spec.whistleblower_reward_quotient;
        let offender_balance = state.balances[offender];
        let proposer_balance = state.balances[block_proposer];

        process_proposer_slashings(&mut state, &[slashing], VerifySignatures::False, &spec)
            .unwrap();

        let current_epoch = state.current_epoch();

        assert!(state.validators[offender].slashed);
        assert_eq!(state.balances[offender], offender_balance - penalty);
        assert_eq!(
            state.balances[block_proposer],
            proposer_balance + whistleblower_reward
        );
        assert_eq!(
            state.get_slashings(current_epoch).unwrap(),
            effective_balance
        );
        assert_eq!(
            state.validators[offender].withdrawable_epoch,
            std::cmp::max(
                current_epoch + <E as EthSpec>::EpochsPerSlashingsVector::to_u64(),
                state.validators[offender].exit_epoch + spec.min_validator_withdrawability_delay
            )
        );
    }

    #[test]
    fn identical_headers_are_not_slashable() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);
        state
            .build_committee_cache(RelativeEpoch::Current, &spec)
            .unwrap();

        let header = BeaconBlockHeader {
            slot: state.slot,
            parent_root: Hash256::repeat_byte(0xaa),
            state_root: Hash256::repeat_byte(0x01),
            body_root: Hash256::zero(),
            signature: Signature::empty(),
        };

        let slashing = ProposerSlashing {
            proposer_index: 0,
            header_1: header.clone(),
            header_2: header,
        };

        assert!(process_proposer_slashings(
            &mut state,
            &[slashing],
            VerifySignatures::False,
            &spec
        )
        .is_err());
    }

    #[test]
    fn attester_slashing_slashes_the_intersection() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);
        state
            .build_committee_cache(RelativeEpoch::Current, &spec)
            .unwrap();

        let attestation = |indices: Vec<u64>, beacon_block_root: u8| IndexedAttestation::<E> {
            attesting_indices: VariableList::new(indices).unwrap(),
            data: AttestationData {
                slot: Slot::new(0),
                index: 0,
                beacon_block_root: Hash256::repeat_byte(beacon_block_root),
                source: Checkpoint::default(),
                target: Checkpoint {
                    epoch: Epoch::new(0),
                    root: Hash256::zero(),
                },
            },
            signature: AggregateSignature::empty(),
        };

        // A double vote: same target epoch, different data.
        let slashing = AttesterSlashing {
            attestation_1: attestation(vec![1, 2, 3], 0x01),
            attestation_2: attestation(vec![2, 3, 4], 0x02),
        };

        let total_effective_before: u64 = state
            .validators
            .iter()
            .map(|v| v.effective_balance)
            .sum();

        process_attester_slashings(&mut state, &[slashing], VerifySignatures::False, &spec)
            .unwrap();

        assert!(!state.validators[1].slashed);
        assert!(state.validators[2].slashed);
        assert!(state.validators[3].slashed);
        assert!(!state.validators[4].slashed);

        // Aggregate balance strictly decreases when a slashing applies.
        let total_balance_after: u64 = state.balances.iter().sum();
        assert!(total_balance_after < total_effective_before);
    }
}

mod exits {
    use super::*;

    #[test]
    fn voluntary_exit_is_queued() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        // The validator must have been active for at least the committee period.
        let exit_epoch = Epoch::new(spec.shard_committee_period);
        state.slot = exit_epoch.start_slot(E::slots_per_epoch());
        state
            .build_committee_cache(RelativeEpoch::Current, &spec)
            .unwrap();

        let exit = VoluntaryExit {
            epoch: exit_epoch,
            validator_index: 3,
            signature: Signature::empty(),
        };

        process_exits(&mut state, &[exit], VerifySignatures::False, &spec).unwrap();

        let expected_exit_epoch = spec.compute_activation_exit_epoch(exit_epoch).unwrap();
        assert_eq!(state.validators[3].exit_epoch, expected_exit_epoch);
        assert_eq!(
            state.validators[3].withdrawable_epoch,
            expected_exit_epoch + spec.min_validator_withdrawability_delay
        );
    }

    #[test]
    fn early_exit_is_rejected() {
        let spec = test_spec();
        let mut state = fresh_state(&spec);
        state
            .build_committee_cache(RelativeEpoch::Current, &spec)
            .unwrap();

        let exit = VoluntaryExit {
            epoch: Epoch::new(0),
            validator_index: 3,
            signature: Signature::empty(),
        };

        assert!(process_exits(&mut state, &[exit], VerifySignatures::False, &spec).is_err());
        assert_eq!(state.validators[3].exit_epoch, spec.far_future_epoch);
    }
}

mod justification {
    use super::*;

    /// Builds a state at the last slot of epoch 2 whose previous-epoch attestations cover
    /// `committees` full committees, then runs the epoch transition.
    fn run_epoch_with_attesting_committees(committees: u64) -> BeaconState<E> {
        let spec = test_spec();
        let mut state = fresh_state(&spec);

        let last_slot_of_epoch_2 = Epoch::new(2).end_slot(E::slots_per_epoch());
        state.slot = last_slot_of_epoch_2;

        // Known block root everywhere, so target and head votes can match.
        let block_root = Hash256::repeat_byte(0xab);
        state.block_roots =
            FixedVector::from(vec![block_root; <E as EthSpec>::SlotsPerHistoricalRoot::to_usize()]);

        state
            .build_committee_cache(RelativeEpoch::Previous, &spec)
            .unwrap();

        let previous_epoch = state.previous_epoch();

        let mut pending = vec![];
        for (i, slot) in previous_epoch
            .slot_iter(E::slots_per_epoch())
            .take(committees as usize)
            .enumerate()
        {
            let committee = state.get_beacon_committee(slot, 0).unwrap();
            let committee_len = committee.committee.len();

            let mut bits: BitList<<E as EthSpec>::MaxValidatorsPerCommittee> =
                BitList::with_capacity(committee_len).unwrap();
            for bit in 0..committee_len {
                bits.set(bit, true).unwrap();
            }

            pending.push(PendingAttestation::<E> {
                aggregation_bits: bits,
                data: AttestationData {
                    slot,
                    index: 0,
                    beacon_block_root: block_root,
                    source: state.previous_justified_checkpoint,
                    target: Checkpoint {
                        epoch: previous_epoch,
                        root: block_root,
                    },
                },
                inclusion_delay: 1,
                proposer_index: i as u64,
            });
        }

        for attestation in pending {
            state.previous_epoch_attestations.push(attestation).unwrap();
        }

        per_slot_processing(&mut state, None, &spec).unwrap();

        state
    }

    #[test]
    fn supermajority_justifies_the_previous_epoch() {
        // 6 of 8 committees = 12 of 16 validators = 3/4 of the stake.
        let state = run_epoch_with_attesting_committees(6);

        assert_eq!(state.current_justified_checkpoint.epoch, Epoch::new(1));
        assert_eq!(
            state.current_justified_checkpoint.root,
            Hash256::repeat_byte(0xab)
        );
        assert!(state.justification_bits.get(1).unwrap());
    }

    #[test]
    fn minority_does_not_justify() {
        // 5 of 8 committees = 10 of 16 validators < 2/3 of the stake.
        let state = run_epoch_with_attesting_committees(5);

        assert_eq!(state.current_justified_checkpoint.epoch, Epoch::new(0));
        assert!(!state.justification_bits.get(1).unwrap());
    }
}
