use state_processing::per_block_processing::verify_attestation_for_state;
use state_processing::VerifySignatures;
use std::collections::{BTreeMap, HashMap, HashSet};
use types::{Attestation, BeaconState, ChainSpec, Epoch, EthSpec, Hash256, Slot};

/// How many epochs of attestations are retained behind the current epoch.
const HISTORIC_EPOCHS: u64 = 1;

/// Stages attestations until they are either included on chain, handed to a proposer, or
/// expire.
///
/// Attestations referencing an unknown block root are parked in a separate queue and flushed
/// back through the pipeline when the block arrives.
#[derive(Debug, Default)]
pub struct AttestationPool<E: EthSpec> {
    /// The main pool, keyed by the attestation's target epoch.
    epochs: BTreeMap<Epoch, HashSet<Attestation<E>>>,
    /// Attestations whose `beacon_block_root` is not yet known, keyed by that root.
    no_block_root: HashMap<Hash256, Vec<Attestation<E>>>,
    current_epoch: Option<Epoch>,
}

impl<E: EthSpec> AttestationPool<E> {
    pub fn new() -> Self {
        Self {
            epochs: BTreeMap::new(),
            no_block_root: HashMap::new(),
            current_epoch: None,
        }
    }

    /// The earliest target epoch the pool retains.
    fn history_threshold(&self) -> Epoch {
        self.current_epoch
            .map(|epoch| epoch - HISTORIC_EPOCHS)
            .unwrap_or_else(|| Epoch::new(0))
    }

    /// Observe a clock tick, discarding epochs that fell behind the history threshold.
    pub fn on_tick(&mut self, slot: Slot) {
        let new_epoch = slot.epoch(E::slots_per_epoch());

        match self.current_epoch {
            Some(current) if new_epoch <= current => return,
            _ => self.current_epoch = Some(new_epoch),
        }

        let threshold = self.history_threshold();
        self.epochs = self.epochs.split_off(&threshold);
    }

    /// Stage an attestation in the main pool.
    ///
    /// Attestations behind the history threshold are discarded; returns whether the
    /// attestation was retained.
    pub fn insert(&mut self, attestation: Attestation<E>) -> bool {
        let target_epoch = attestation.data.target.epoch;

        if self.current_epoch.is_some() && target_epoch < self.history_threshold() {
            return false;
        }

        self.epochs
            .entry(target_epoch)
            .or_insert_with(HashSet::new)
            .insert(attestation);
        true
    }

    /// Park an attestation whose block is not yet known.
    pub fn defer(&mut self, attestation: Attestation<E>) {
        self.no_block_root
            .entry(attestation.data.beacon_block_root)
            .or_insert_with(Vec::new)
            .push(attestation);
    }

    /// Remove and return every attestation that was waiting for `block_root`.
    pub fn take_deferred(&mut self, block_root: &Hash256) -> Vec<Attestation<E>> {
        self.no_block_root.remove(block_root).unwrap_or_default()
    }

    /// The number of attestations currently staged in the main pool.
    pub fn staged_len(&self) -> usize {
        self.epochs.values().map(HashSet::len).sum()
    }

    /// The number of attestations parked for unknown blocks.
    pub fn deferred_len(&self) -> usize {
        self.no_block_root.values().map(Vec::len).sum()
    }

    /// The attestations a block proposer on top of `state` should consider including: staged
    /// attestations that are neither already covered by on-chain aggregation bits nor rejected
    /// by the state.
    pub fn proposer_feed(&self, state: &BeaconState<E>, spec: &ChainSpec) -> Vec<Attestation<E>> {
        self.epochs
            .values()
            .flatten()
            .filter(|attestation| !self.is_covered_on_chain(attestation, state))
            .filter(|attestation| {
                verify_attestation_for_state(
                    state,
                    attestation,
                    VerifySignatures::from_spec(spec),
                    spec,
                )
                .is_ok()
            })
            .cloned()
            .collect()
    }

    /// Returns `true` if every participant of `attestation` is already covered by an on-chain
    /// pending attestation with the same data.
    fn is_covered_on_chain(&self, attestation: &Attestation<E>, state: &BeaconState<E>) -> bool {
        let mut on_chain_bits: Option<types::BitList<E::MaxValidatorsPerCommittee>> = None;

        for pending in state
            .previous_epoch_attestations
            .iter()
            .chain(state.current_epoch_attestations.iter())
            .filter(|pending| pending.data == attestation.data)
        {
            on_chain_bits = Some(match on_chain_bits {
                Some(bits) if bits.len() == pending.aggregation_bits.len() => {
                    bits.union(&pending.aggregation_bits)
                }
                Some(bits) => bits,
                None => pending.aggregation_bits.clone(),
            });
        }

        match on_chain_bits {
            Some(bits) if bits.len() == attestation.aggregation_bits.len() => {
                attestation.aggregation_bits.is_subset(&bits)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{AttestationData, BitList, Checkpoint, MinimalEthSpec};

    type E = MinimalEthSpec;

    fn attestation(target_epoch: u64, block_byte: u8) -> Attestation<E> {
        let mut bits: BitList<<E as EthSpec>::MaxValidatorsPerCommittee> =
            BitList::with_capacity(2).unwrap();
        bits.set(0, true).unwrap();

        Attestation {
            aggregation_bits: bits,
            data: AttestationData {
                slot: Epoch::new(target_epoch).start_slot(E::slots_per_epoch()),
                index: 0,
                beacon_block_root: Hash256::repeat_byte(block_byte),
                source: Checkpoint::default(),
                target: Checkpoint {
                    epoch: Epoch::new(target_epoch),
                    root: Hash256::repeat_byte(block_byte),
                },
            },
            signature: types::AggregateSignature::empty(),
        }
    }

    #[test]
    fn stages_and_deduplicates() {
        let mut pool = AttestationPool::<E>::new();
        pool.on_tick(Slot::new(0));

        assert!(pool.insert(attestation(0, 1)));
        assert!(pool.insert(attestation(0, 1)));
        assert_eq!(pool.staged_len(), 1);

        assert!(pool.insert(attestation(0, 2)));
        assert_eq!(pool.staged_len(), 2);
    }

    #[test]
    fn tick_prunes_old_epochs() {
        let mut pool = AttestationPool::<E>::new();
        pool.on_tick(Slot::new(0));

        pool.insert(attestation(0, 1));
        pool.insert(attestation(1, 2));
        pool.insert(attestation(2, 3));
        assert_eq!(pool.staged_len(), 3);

        // Epoch 2: epochs >= 1 are retained.
        pool.on_tick(Epoch::new(2).start_slot(E::slots_per_epoch()));
        assert_eq!(pool.staged_len(), 2);

        // Epoch 4: everything is stale.
        pool.on_tick(Epoch::new(4).start_slot(E::slots_per_epoch()));
        assert_eq!(pool.staged_len(), 0);

        // Stale insertions bounce.
        assert!(!pool.insert(attestation(0, 1)));
        assert_eq!(pool.staged_len(), 0);
    }

    #[test]
    fn deferred_attestations_wait_for_their_block() {
        let mut pool = AttestationPool::<E>::new();
        pool.on_tick(Slot::new(0));

        let attestation = attestation(0, 9);
        let block_root = attestation.data.beacon_block_root;

        pool.defer(attestation);
        assert_eq!(pool.deferred_len(), 1);
        assert_eq!(pool.staged_len(), 0);

        let flushed = pool.take_deferred(&block_root);
        assert_eq!(flushed.len(), 1);
        assert_eq!(pool.deferred_len(), 0);

        assert!(pool.take_deferred(&block_root).is_empty());
    }
}
