use beacon_chain::{
    run, AttestationProcessingOutcome, BeaconChain, BlockProcessingOutcome, BlockState,
    ExitReason, Message,
};
use slog::{o, Discard, Logger};
use slot_clock::{ManualSlotClock, SlotClock};
use state_processing::{per_block_processing, per_slot_processing, VerifySignatures};
use std::sync::Arc;
use std::time::Duration;
use store::MemoryStore;
use types::test_utils::TestingBeaconStateBuilder;
use types::*;

type E = MinimalEthSpec;
type TestChain = BeaconChain<E, MemoryStore, ManualSlotClock>;

const VALIDATOR_COUNT: usize = 16;

fn test_spec() -> ChainSpec {
    let mut spec = E::default_spec();
    spec.bls_verify = false;
    spec.bls_verify_proof_of_possession = false;
    spec
}

fn test_chain() -> TestChain {
    let spec = test_spec();
    let (state, _keypairs) = TestingBeaconStateBuilder::new(VALIDATOR_COUNT, &spec).build();

    let slot_clock = ManualSlotClock::new(
        spec.genesis_slot,
        Duration::from_secs(0),
        Duration::from_secs(spec.seconds_per_slot),
    );

    let log = Logger::root(Discard, o!());

    BeaconChain::from_genesis(Arc::new(MemoryStore::open()), slot_clock, state, spec, log)
        .expect("genesis must not fail")
}

/// Builds a valid empty block on top of the given post-state.
fn produce_block(
    parent_root: Hash256,
    parent_state: &BeaconState<E>,
    slot: Slot,
    graffiti: u8,
    spec: &ChainSpec,
) -> BeaconBlock<E> {
    let mut state = parent_state.clone();

    while state.slot < slot {
        per_slot_processing(&mut state, None, spec).unwrap();
    }

    let mut block = BeaconBlock::empty(spec);
    block.slot = slot;
    block.parent_root = parent_root;
    block.body.graffiti = Hash256::repeat_byte(graffiti);
    block.body.eth1_data = state.eth1_data.clone();

    per_block_processing(&mut state, &block, VerifySignatures::False, spec).unwrap();
    block.state_root = state.update_tree_hash_cache().unwrap();

    block
}

/// Extends the canonical head by one block at the given slot.
fn extend_head(chain: &mut TestChain, slot: Slot, graffiti: u8) -> Hash256 {
    let spec = chain.spec.clone();
    let head = chain.head().clone();
    let block = produce_block(head.block_root, &head.state, slot, graffiti, &spec);
    let block_root = block.canonical_root();

    chain.slot_clock().set_slot(slot);
    let outcome = chain.process_block(block).unwrap();
    assert_eq!(outcome, BlockProcessingOutcome::Applied { block_root });

    block_root
}

#[test]
fn a_chain_of_blocks_extends_the_head() {
    let mut chain = test_chain();
    let genesis_root = chain.head().block_root;

    let mut expected_head = genesis_root;
    for slot in 1..=5u64 {
        expected_head = extend_head(&mut chain, Slot::new(slot), slot as u8);
    }

    assert_eq!(chain.head().block_root, expected_head);
    assert_eq!(chain.head().block.slot, Slot::new(5));
    assert_eq!(chain.head().state.slot, Slot::new(5));

    // Every applied block is retrievable from the store, by root and by slot.
    assert!(chain.store().get_block(&expected_head).unwrap().is_some());
    assert_eq!(
        chain.store().block_roots_at_slot(Slot::new(5)).unwrap(),
        vec![expected_head]
    );
}

#[test]
fn a_block_waits_for_its_unknown_parent() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let block_1 = produce_block(head.block_root, &head.state, Slot::new(1), 1, &spec);
    let root_1 = block_1.canonical_root();

    // The child is built on block 1's post-state.
    let mut state_1 = head.state.clone();
    per_slot_processing(&mut state_1, None, &spec).unwrap();
    per_block_processing(&mut state_1, &block_1, VerifySignatures::False, &spec).unwrap();
    state_1.update_tree_hash_cache().unwrap();
    let block_2 = produce_block(root_1, &state_1, Slot::new(2), 2, &spec);
    let root_2 = block_2.canonical_root();

    chain.slot_clock().set_slot(Slot::new(2));

    // Deliver out of order.
    assert_eq!(
        chain.process_block(block_2).unwrap(),
        BlockProcessingOutcome::UnknownParent(root_1)
    );
    assert_eq!(chain.block_state(&root_2), Some(BlockState::WaitingParent));
    assert_eq!(chain.head().block_root, chain.genesis_block_root());

    // The parent unparks and applies the waiting child in the same call.
    assert_eq!(
        chain.process_block(block_1).unwrap(),
        BlockProcessingOutcome::Applied { block_root: root_1 }
    );

    assert_eq!(chain.block_state(&root_2), Some(BlockState::Applied));
    assert_eq!(chain.head().block_root, root_2);
}

#[test]
fn a_future_block_waits_for_the_clock() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let block = produce_block(head.block_root, &head.state, Slot::new(3), 3, &spec);
    let block_root = block.canonical_root();

    // The clock still reads slot 0.
    assert_eq!(
        chain.process_block(block).unwrap(),
        BlockProcessingOutcome::FutureSlot {
            present_slot: Slot::new(0),
            block_slot: Slot::new(3),
        }
    );
    assert_eq!(chain.block_state(&block_root), Some(BlockState::WaitingPayload));

    // Tick forward to the block's slot: it is released and applied.
    chain.slot_clock().set_slot(Slot::new(3));
    chain.on_tick(Slot::new(3)).unwrap();

    assert_eq!(chain.block_state(&block_root), Some(BlockState::Applied));
    assert_eq!(chain.head().block_root, block_root);
}

#[test]
fn a_wrong_state_root_is_rejected() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let mut block = produce_block(head.block_root, &head.state, Slot::new(1), 1, &spec);
    block.state_root = Hash256::repeat_byte(0x66);
    let block_root = block.canonical_root();

    chain.slot_clock().set_slot(Slot::new(1));

    assert_eq!(
        chain.process_block(block).unwrap(),
        BlockProcessingOutcome::StateRootMismatch
    );
    assert_eq!(chain.block_state(&block_root), Some(BlockState::Rejected));
    assert_eq!(chain.head().block_root, chain.genesis_block_root());
    assert!(chain.store().get_block(&block_root).unwrap().is_none());
}

#[test]
fn an_invalid_operation_rejects_the_block() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let mut block = produce_block(head.block_root, &head.state, Slot::new(1), 1, &spec);
    // A voluntary exit for a validator that is far too young: the state transition must refuse
    // the block wholesale.
    block.body.voluntary_exits = vec![VoluntaryExit {
        epoch: Epoch::new(0),
        validator_index: 3,
        signature: Signature::empty(),
    }]
    .into();
    let block_root = block.canonical_root();

    chain.slot_clock().set_slot(Slot::new(1));

    assert_eq!(
        chain.process_block(block).unwrap(),
        BlockProcessingOutcome::InvalidBlock
    );
    assert_eq!(chain.block_state(&block_root), Some(BlockState::Rejected));

    // No partial effects: the head state does not know the exit.
    assert_eq!(
        chain.head().state.validators[3].exit_epoch,
        spec.far_future_epoch
    );
}

#[test]
fn sibling_ties_break_toward_the_smaller_root() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let block_a = produce_block(head.block_root, &head.state, Slot::new(1), 0xaa, &spec);
    let block_b = produce_block(head.block_root, &head.state, Slot::new(1), 0xbb, &spec);

    let root_a = block_a.canonical_root();
    let root_b = block_b.canonical_root();
    assert_ne!(root_a, root_b);

    chain.slot_clock().set_slot(Slot::new(1));

    // Deliver the lexicographically larger block first; with no votes the head must still be
    // the smaller root.
    let (first, second) = if root_a < root_b {
        (block_b, block_a)
    } else {
        (block_a, block_b)
    };

    chain.process_block(first).unwrap();
    chain.process_block(second).unwrap();

    assert_eq!(chain.head().block_root, std::cmp::min(root_a, root_b));
}

#[test]
fn attestations_steer_the_fork_choice() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let block_a = produce_block(head.block_root, &head.state, Slot::new(1), 0xaa, &spec);
    let block_b = produce_block(head.block_root, &head.state, Slot::new(1), 0xbb, &spec);
    let root_a = block_a.canonical_root();
    let root_b = block_b.canonical_root();
    let bigger_root = std::cmp::max(root_a, root_b);

    chain.slot_clock().set_slot(Slot::new(1));
    chain.process_block(block_a).unwrap();
    chain.process_block(block_b).unwrap();

    // The tie-break head is the smaller root; attest to the bigger one.
    let attested_state = chain.state_by_block_root(&bigger_root).unwrap().clone();
    let committee = attested_state
        .get_beacon_committee(Slot::new(1), 0)
        .unwrap();
    let committee_len = committee.committee.len();

    let mut bits: BitList<<E as EthSpec>::MaxValidatorsPerCommittee> =
        BitList::with_capacity(committee_len).unwrap();
    for i in 0..committee_len {
        bits.set(i, true).unwrap();
    }

    let attestation = Attestation::<E> {
        aggregation_bits: bits,
        data: AttestationData {
            slot: Slot::new(1),
            index: 0,
            beacon_block_root: bigger_root,
            source: attested_state.current_justified_checkpoint,
            target: Checkpoint {
                epoch: Epoch::new(0),
                root: bigger_root,
            },
        },
        signature: AggregateSignature::empty(),
    };

    assert_eq!(
        chain.process_attestation(attestation).unwrap(),
        AttestationProcessingOutcome::Staged
    );

    assert_eq!(chain.head().block_root, bigger_root);
}

#[test]
fn attestations_for_unknown_blocks_wait_and_flush() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let block = produce_block(head.block_root, &head.state, Slot::new(1), 1, &spec);
    let block_root = block.canonical_root();

    let attestation = Attestation::<E> {
        aggregation_bits: BitList::with_capacity(2).unwrap(),
        data: AttestationData {
            slot: Slot::new(1),
            index: 0,
            beacon_block_root: block_root,
            source: Checkpoint::default(),
            target: Checkpoint {
                epoch: Epoch::new(0),
                root: block_root,
            },
        },
        signature: AggregateSignature::empty(),
    };

    assert_eq!(
        chain.process_attestation(attestation).unwrap(),
        AttestationProcessingOutcome::Deferred(block_root)
    );
    assert_eq!(chain.attestation_pool().deferred_len(), 1);

    chain.slot_clock().set_slot(Slot::new(1));
    chain.process_block(block).unwrap();

    // The deferred attestation was flushed into the main pool when its block applied.
    assert_eq!(chain.attestation_pool().deferred_len(), 0);
    assert_eq!(chain.attestation_pool().staged_len(), 1);
}

#[test]
fn the_message_loop_processes_in_order_and_shuts_down() {
    let mut chain = test_chain();
    let spec = chain.spec.clone();
    let head = chain.head().clone();

    let block = produce_block(head.block_root, &head.state, Slot::new(1), 1, &spec);
    let block_root = block.canonical_root();

    chain.slot_clock().set_slot(Slot::new(1));

    let (sender, receiver) = std::sync::mpsc::channel();
    sender.send(Message::Tick(Slot::new(1))).unwrap();
    sender.send(Message::Block(Box::new(block))).unwrap();
    sender.send(Message::Shutdown).unwrap();

    let reason = run(&mut chain, receiver);

    assert_eq!(reason, ExitReason::Normal);
    assert_eq!(reason.exit_code(), 0);
    assert_eq!(chain.head().block_root, block_root);
}

#[test]
fn observed_state_snapshots_are_published() {
    let mut chain = test_chain();
    let receiver = chain.subscribe();

    extend_head(&mut chain, Slot::new(1), 1);

    let snapshot = receiver.try_recv().expect("a snapshot must be published");
    assert_eq!(snapshot.head_block_root, chain.head().block_root);
    assert_eq!(snapshot.state.slot, Slot::new(1));
}
