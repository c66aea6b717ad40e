use crate::attestation_pool::AttestationPool;
use crate::errors::BeaconChainError as Error;
use crate::metrics;
use fork_choice::ForkChoice;
use pharos_metrics::inc_counter;
use slog::{debug, info, Logger};
use slot_clock::SlotClock;
use state_processing::common::get_attesting_indices;
use state_processing::{per_block_processing, per_slot_processing, VerifySignatures};
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use store::{ChainStore, Store};
use types::{
    Attestation, BeaconBlock, BeaconState, ChainSpec, Checkpoint, EthSpec, Hash256, Slot,
};

/// How many slots a block may wait for its parent before the watcher is cancelled and the block
/// dropped. Stands in for the per-request deadline of a sync implementation.
const PARENT_WAIT_SLOTS: u64 = 4;

/// The lifecycle of a block moving through the pipeline.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BlockState {
    Queued,
    WaitingParent,
    WaitingPayload,
    Verifying,
    Applied,
    Rejected,
}

/// The outcome of feeding one block to the pipeline. Only `Applied` changes observable state.
#[derive(Debug, PartialEq, Clone)]
pub enum BlockProcessingOutcome {
    Applied {
        block_root: Hash256,
    },
    /// The block was already known.
    Duplicate,
    /// The parent is unknown; the block is parked and a watcher registered.
    UnknownParent(Hash256),
    /// The block is ahead of the wall clock; it is parked until its slot arrives.
    FutureSlot {
        present_slot: Slot,
        block_slot: Slot,
    },
    /// The state transition refused the block.
    InvalidBlock,
    /// The transition succeeded but the resulting state root does not match the block.
    StateRootMismatch,
}

/// The outcome of feeding one attestation to the pipeline.
#[derive(Debug, PartialEq, Clone)]
pub enum AttestationProcessingOutcome {
    Staged,
    /// Parked until the referenced block arrives.
    Deferred(Hash256),
    /// Dropped: the committee or bitfield did not make sense against the target state.
    Invalid,
    /// Dropped: older than the pool's history threshold.
    Stale,
}

/// The canonical head of the chain as selected by fork choice.
#[derive(Debug, Clone)]
pub struct CanonicalHead<E: EthSpec> {
    pub block_root: Hash256,
    pub block: BeaconBlock<E>,
    pub state: BeaconState<E>,
}

/// An immutable snapshot published to subscribers after every head update and on every tick.
#[derive(Debug, Clone)]
pub struct ObservedState<E: EthSpec> {
    pub head_block_root: Hash256,
    pub state: BeaconState<E>,
    /// Staged attestations a proposer building on this state should consider.
    pub proposer_churn: Vec<Attestation<E>>,
}

struct PendingBlock<E: EthSpec> {
    block: BeaconBlock<E>,
    queued_at: Slot,
}

/// The block-processor pipeline.
///
/// All mutable collaborators (the store facade, the fork choice, the pool, the state cache) are
/// owned exclusively by this struct; external consumers only ever receive snapshots.
pub struct BeaconChain<E: EthSpec, S: Store, C: SlotClock> {
    pub spec: ChainSpec,
    store: ChainStore<S, E>,
    slot_clock: C,
    fork_choice: ForkChoice,
    attestation_pool: AttestationPool<E>,
    /// Post-states of every applied block, keyed by block root. States are replayable from
    /// genesis, so this cache carries no durability obligation.
    state_cache: HashMap<Hash256, BeaconState<E>>,
    /// Parked blocks, keyed by the parent root they are waiting for.
    pending_blocks: HashMap<Hash256, Vec<PendingBlock<E>>>,
    /// Blocks from future slots, waiting for the wall clock.
    future_blocks: Vec<BeaconBlock<E>>,
    /// Last observed lifecycle state per block root.
    block_states: HashMap<Hash256, BlockState>,
    canonical_head: CanonicalHead<E>,
    genesis_block_root: Hash256,
    subscribers: Vec<Sender<Arc<ObservedState<E>>>>,
    log: Logger,
}

impl<E: EthSpec, S: Store, C: SlotClock> BeaconChain<E, S, C> {
    /// Instantiate the pipeline from a genesis state.
    pub fn from_genesis(
        store: Arc<S>,
        slot_clock: C,
        mut genesis_state: BeaconState<E>,
        spec: ChainSpec,
        log: Logger,
    ) -> Result<Self, Error> {
        genesis_state.build_all_committee_caches(&spec)?;

        let genesis_state_root = if spec.incremental_hasher {
            genesis_state.update_tree_hash_cache()?
        } else {
            genesis_state.canonical_root()
        };

        let mut genesis_block = BeaconBlock::empty(&spec);
        genesis_block.state_root = genesis_state_root;
        let genesis_block_root = genesis_block.canonical_root();

        let chain_store = ChainStore::new(store);
        chain_store.put_block(genesis_block_root, &genesis_block)?;

        let mut fork_choice = ForkChoice::new();
        fork_choice.process_block(
            genesis_block_root,
            genesis_block.parent_root,
            genesis_block.slot,
        );

        let mut state_cache = HashMap::new();
        state_cache.insert(genesis_block_root, genesis_state.clone());

        let mut block_states = HashMap::new();
        block_states.insert(genesis_block_root, BlockState::Applied);

        info!(
            log,
            "Beacon chain initialized";
            "genesis_block_root" => format!("{:?}", genesis_block_root),
            "validators" => genesis_state.validators.len()
        );

        Ok(Self {
            spec,
            store: chain_store,
            slot_clock,
            fork_choice,
            attestation_pool: AttestationPool::new(),
            state_cache,
            pending_blocks: HashMap::new(),
            future_blocks: Vec::new(),
            block_states,
            canonical_head: CanonicalHead {
                block_root: genesis_block_root,
                block: genesis_block,
                state: genesis_state,
            },
            genesis_block_root,
            subscribers: Vec::new(),
            log,
        })
    }

    pub fn head(&self) -> &CanonicalHead<E> {
        &self.canonical_head
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn slot_clock(&self) -> &C {
        &self.slot_clock
    }

    /// The post-state of an applied block.
    pub fn state_by_block_root(&self, block_root: &Hash256) -> Option<&BeaconState<E>> {
        self.state_cache.get(block_root)
    }

    pub fn genesis_block_root(&self) -> Hash256 {
        self.genesis_block_root
    }

    pub fn fork_choice(&self) -> &ForkChoice {
        &self.fork_choice
    }

    pub fn attestation_pool(&self) -> &AttestationPool<E> {
        &self.attestation_pool
    }

    pub fn store(&self) -> &ChainStore<S, E> {
        &self.store
    }

    /// The lifecycle state last recorded for a block root.
    pub fn block_state(&self, block_root: &Hash256) -> Option<BlockState> {
        self.block_states.get(block_root).copied()
    }

    /// Register a subscriber for observed-state snapshots.
    pub fn subscribe(&mut self) -> Receiver<Arc<ObservedState<E>>> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    fn present_slot(&self) -> Slot {
        self.slot_clock.now().unwrap_or(self.spec.genesis_slot)
    }

    /// Feed a block into the pipeline.
    ///
    /// Applying a block may unpark children that were waiting for it; those are processed in
    /// the same call, in arrival order.
    pub fn process_block(
        &mut self,
        block: BeaconBlock<E>,
    ) -> Result<BlockProcessingOutcome, Error> {
        let outcome = self.process_block_inner(block)?;

        if let BlockProcessingOutcome::Applied { block_root } = &outcome {
            let mut unblocked = VecDeque::new();
            self.collect_children(*block_root, &mut unblocked);

            while let Some(child) = unblocked.pop_front() {
                if let BlockProcessingOutcome::Applied { block_root } =
                    self.process_block_inner(child)?
                {
                    self.collect_children(block_root, &mut unblocked);
                }
            }

            self.update_canonical_head()?;
        }

        Ok(outcome)
    }

    fn collect_children(&mut self, parent_root: Hash256, queue: &mut VecDeque<BeaconBlock<E>>) {
        if let Some(children) = self.pending_blocks.remove(&parent_root) {
            queue.extend(children.into_iter().map(|pending| pending.block));
        }
    }

    fn process_block_inner(
        &mut self,
        block: BeaconBlock<E>,
    ) -> Result<BlockProcessingOutcome, Error> {
        let block_root = block.canonical_root();

        if let Some(BlockState::Applied) = self.block_states.get(&block_root) {
            return Ok(BlockProcessingOutcome::Duplicate);
        }

        self.block_states.insert(block_root, BlockState::Queued);

        // Blocks from future slots wait for the wall clock.
        let present_slot = self.present_slot();
        if block.slot > present_slot {
            let block_slot = block.slot;
            self.block_states
                .insert(block_root, BlockState::WaitingPayload);
            self.future_blocks.push(block);
            inc_counter(&metrics::BLOCKS_FROM_THE_FUTURE);

            return Ok(BlockProcessingOutcome::FutureSlot {
                present_slot,
                block_slot,
            });
        }

        // Blocks with an unknown parent wait for it, with a watcher registered under the
        // parent root.
        let parent_root = block.parent_root;
        let parent_state = match self.state_cache.get(&parent_root) {
            Some(state) => state.clone(),
            None => {
                self.block_states
                    .insert(block_root, BlockState::WaitingParent);
                self.pending_blocks
                    .entry(parent_root)
                    .or_insert_with(Vec::new)
                    .push(PendingBlock {
                        block,
                        queued_at: present_slot,
                    });
                inc_counter(&metrics::BLOCKS_AWAITING_PARENT);

                return Ok(BlockProcessingOutcome::UnknownParent(parent_root));
            }
        };

        self.block_states.insert(block_root, BlockState::Verifying);

        // All preconditions hold: run the transitions against a disposable copy of the parent's
        // post-state. Failure leaves no partial effects anywhere.
        let mut state = parent_state;
        while state.slot < block.slot {
            per_slot_processing(&mut state, None, &self.spec)?;
        }

        if let Err(outcome) = per_block_processing(
            &mut state,
            &block,
            VerifySignatures::from_spec(&self.spec),
            &self.spec,
        ) {
            // Adversaries must not learn reasons; operators see counters.
            debug!(self.log, "Block failed state transition"; "outcome" => format!("{:?}", outcome));
            info!(self.log, "Block rejected"; "category" => "invalid_block");
            self.block_states.insert(block_root, BlockState::Rejected);
            inc_counter(&metrics::BLOCKS_REJECTED);

            return Ok(BlockProcessingOutcome::InvalidBlock);
        }

        let state_root = if self.spec.incremental_hasher {
            state.update_tree_hash_cache()?
        } else {
            state.canonical_root()
        };

        if state_root != block.state_root {
            info!(self.log, "Block rejected"; "category" => "state_root_mismatch");
            self.block_states.insert(block_root, BlockState::Rejected);
            inc_counter(&metrics::BLOCKS_REJECTED);

            return Ok(BlockProcessingOutcome::StateRootMismatch);
        }

        self.apply_block(block_root, block, state)?;

        Ok(BlockProcessingOutcome::Applied { block_root })
    }

    /// Index an accepted block everywhere: store, fork choice, state cache, justified pointer,
    /// and flush any attestations that were waiting for it.
    fn apply_block(
        &mut self,
        block_root: Hash256,
        block: BeaconBlock<E>,
        state: BeaconState<E>,
    ) -> Result<(), Error> {
        self.store.put_block(block_root, &block)?;
        self.fork_choice
            .process_block(block_root, block.parent_root, block.slot);

        // Advance the best-justified pointer.
        let justified = state.current_justified_checkpoint;
        let stored = self.store.justified_checkpoint()?;
        if stored.map_or(true, |stored| justified.epoch > stored.epoch) {
            self.store.set_justified_checkpoint(&justified)?;
        }

        self.state_cache.insert(block_root, state);
        self.block_states.insert(block_root, BlockState::Applied);
        inc_counter(&metrics::BLOCKS_APPLIED);
        debug!(self.log, "Block applied"; "root" => format!("{:?}", block_root), "slot" => block.slot.as_u64());

        // Attestations that referenced this block can now be staged.
        for attestation in self.attestation_pool.take_deferred(&block_root) {
            self.process_attestation(attestation)?;
        }

        Ok(())
    }

    /// Feed an attestation into the pipeline: stage it for proposers and register the votes
    /// with the fork choice.
    pub fn process_attestation(
        &mut self,
        attestation: Attestation<E>,
    ) -> Result<AttestationProcessingOutcome, Error> {
        let block_root = attestation.data.beacon_block_root;

        if !self.fork_choice.contains_block(&block_root) {
            self.attestation_pool.defer(attestation);
            inc_counter(&metrics::ATTESTATIONS_DEFERRED);
            return Ok(AttestationProcessingOutcome::Deferred(block_root));
        }

        // Resolve the attesting validators against the post-state of the attested block.
        let attesting_indices = {
            let state = self.state_cache.get(&block_root).ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "no post-state for applied block {:?}",
                    block_root
                ))
            })?;

            let committee = match state.get_beacon_committee(
                attestation.data.slot,
                attestation.data.index,
            ) {
                Ok(committee) => committee,
                Err(_) => {
                    info!(self.log, "Attestation dropped"; "category" => "invalid_attestation");
                    inc_counter(&metrics::ATTESTATIONS_DROPPED);
                    return Ok(AttestationProcessingOutcome::Invalid);
                }
            };

            match get_attesting_indices::<E>(committee.committee, &attestation.aggregation_bits) {
                Ok(indices) => indices,
                Err(_) => {
                    info!(self.log, "Attestation dropped"; "category" => "invalid_attestation");
                    inc_counter(&metrics::ATTESTATIONS_DROPPED);
                    return Ok(AttestationProcessingOutcome::Invalid);
                }
            }
        };

        let target_epoch = attestation.data.target.epoch;
        if !self.attestation_pool.insert(attestation) {
            inc_counter(&metrics::ATTESTATIONS_DROPPED);
            return Ok(AttestationProcessingOutcome::Stale);
        }

        for validator_index in attesting_indices {
            self.fork_choice
                .process_attestation(validator_index as u64, block_root, target_epoch);
        }

        inc_counter(&metrics::ATTESTATIONS_STAGED);
        self.update_canonical_head()?;

        Ok(AttestationProcessingOutcome::Staged)
    }

    /// Observe a clock tick: prune the pool, release blocks whose slot has arrived, expire
    /// parent watchers, and publish a fresh snapshot.
    pub fn on_tick(&mut self, slot: Slot) -> Result<(), Error> {
        pharos_metrics::set_gauge(
            &metrics::HASHES_PERFORMED,
            eth2_hashing::hash_count() as i64,
        );

        self.attestation_pool.on_tick(slot);

        // Release blocks whose slot has arrived.
        let (ready, still_waiting): (Vec<_>, Vec<_>) = self
            .future_blocks
            .drain(..)
            .partition(|block| block.slot <= slot);
        self.future_blocks = still_waiting;

        for block in ready {
            self.process_block(block)?;
        }

        // Cancel watchers whose parent never arrived; dependent blocks are rejected.
        let log = &self.log;
        let block_states = &mut self.block_states;
        self.pending_blocks.retain(|_, pending| {
            pending.retain(|p| {
                let expired = slot > p.queued_at + PARENT_WAIT_SLOTS;
                if expired {
                    block_states.insert(p.block.canonical_root(), BlockState::Rejected);
                    info!(log, "Block rejected"; "category" => "parent_wait_expired");
                    inc_counter(&metrics::PARENT_WAIT_EXPIRIES);
                }
                !expired
            });
            !pending.is_empty()
        });

        self.publish_observed_state();

        Ok(())
    }

    /// Re-run fork choice from the best justified checkpoint and adopt the resulting head.
    pub fn update_canonical_head(&mut self) -> Result<(), Error> {
        let justified = self
            .store
            .justified_checkpoint()?
            .unwrap_or_else(|| Checkpoint {
                epoch: self.spec.genesis_epoch,
                root: Hash256::zero(),
            });

        // A zero root denotes "genesis".
        let justified_root = if justified.root == Hash256::zero() {
            self.genesis_block_root
        } else {
            justified.root
        };

        let balances: Vec<u64> = self
            .state_cache
            .get(&justified_root)
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "no post-state for justified block {:?}",
                    justified_root
                ))
            })?
            .validators
            .iter()
            .map(|v| v.effective_balance)
            .collect();

        let head_root = self
            .fork_choice
            .find_head(justified_root, &balances)
            .map_err(|e| Error::InvariantViolation(format!("fork choice: {:?}", e)))?;

        if head_root != self.canonical_head.block_root {
            let head_block = self.store.get_block(&head_root)?.ok_or_else(|| {
                Error::InvariantViolation(format!("head block not in store: {:?}", head_root))
            })?;
            let head_state = self.state_cache.get(&head_root).ok_or_else(|| {
                Error::InvariantViolation(format!("no post-state for head {:?}", head_root))
            })?;

            let extends_previous_head = head_block.parent_root == self.canonical_head.block_root;
            if !extends_previous_head {
                inc_counter(&metrics::REORGS);
            }
            inc_counter(&metrics::HEAD_CHANGES);

            debug!(
                self.log,
                "Canonical head updated";
                "root" => format!("{:?}", head_root),
                "slot" => head_block.slot.as_u64()
            );

            self.canonical_head = CanonicalHead {
                block_root: head_root,
                block: head_block,
                state: head_state.clone(),
            };

            // Finalization prunes the fork choice down to the finalized subtree.
            let finalized_root = self.canonical_head.state.finalized_checkpoint.root;
            if finalized_root != Hash256::zero() {
                self.fork_choice.prune(finalized_root);
            }

            self.publish_observed_state();
        }

        Ok(())
    }

    /// Send an immutable snapshot to every live subscriber.
    fn publish_observed_state(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }

        let snapshot = Arc::new(ObservedState {
            head_block_root: self.canonical_head.block_root,
            state: self.canonical_head.state.clone(),
            proposer_churn: self
                .attestation_pool
                .proposer_feed(&self.canonical_head.state, &self.spec),
        });

        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}
