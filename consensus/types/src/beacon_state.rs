use crate::*;
use cached_tree_hash::Error as CachedTreeHashError;
use eth2_hashing::hash;
use int_to_bytes::{int_to_bytes4, int_to_bytes8};
use safe_arith::{ArithError, SafeArith};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::Error as SszTypesError;
use swap_or_not_shuffle::compute_shuffled_index;
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

pub use self::committee_cache::CommitteeCache;
pub use self::tree_hash_cache::BeaconTreeHashCache;

mod committee_cache;
mod tree_hash_cache;

/// The number of committee caches held in memory: previous, current and next epochs.
pub const CACHED_EPOCHS: usize = 3;

const MAX_RANDOM_BYTE: u64 = u8::max_value() as u64;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    EpochOutOfBounds,
    SlotOutOfBounds,
    UnknownValidator(usize),
    UnableToDetermineProducer,
    InsufficientValidators,
    UnableToShuffle,
    TooManyValidators,
    ValidatorRegistryFull,
    BalancesRegistryFull,
    NoCommittee {
        slot: Slot,
        index: u64,
    },
    InvalidBitfield,
    DepositCountInvalid,
    CommitteeCacheUninitialized(Option<RelativeEpoch>),
    RelativeEpochError(RelativeEpochError),
    TreeHashCacheNotInitialized,
    CachedTreeHashError(CachedTreeHashError),
    TreeHashError(tree_hash::Error),
    SszTypesError(SszTypesError),
    ArithError(ArithError),
}

impl From<RelativeEpochError> for Error {
    fn from(e: RelativeEpochError) -> Error {
        Error::RelativeEpochError(e)
    }
}

impl From<CachedTreeHashError> for Error {
    fn from(e: CachedTreeHashError) -> Error {
        Error::CachedTreeHashError(e)
    }
}

impl From<tree_hash::Error> for Error {
    fn from(e: tree_hash::Error) -> Error {
        Error::TreeHashError(e)
    }
}

impl From<SszTypesError> for Error {
    fn from(e: SszTypesError) -> Error {
        Error::SszTypesError(e)
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Error {
        Error::ArithError(e)
    }
}

/// The state of the `BeaconChain` at some slot.
///
/// Observable semantics are "new state per transition step"; the committee and tree-hash caches
/// are carried alongside the canonical fields and fork whenever the state is cloned.
///
/// Spec v0.12.1
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "T: EthSpec")]
pub struct BeaconState<T>
where
    T: EthSpec,
{
    // Versioning
    #[serde(with = "serde_utils::quoted_u64")]
    pub genesis_time: u64,
    pub slot: Slot,
    pub fork: Fork,

    // History
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: FixedVector<Hash256, T::SlotsPerHistoricalRoot>,
    pub state_roots: FixedVector<Hash256, T::SlotsPerHistoricalRoot>,
    pub historical_roots: VariableList<Hash256, T::HistoricalRootsLimit>,

    // Ethereum 1.0 chain data
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: VariableList<Eth1Data, T::SlotsPerEth1VotingPeriod>,
    #[serde(with = "serde_utils::quoted_u64")]
    pub eth1_deposit_index: u64,

    // Registry
    pub validators: VariableList<Validator, T::ValidatorRegistryLimit>,
    pub balances: VariableList<u64, T::ValidatorRegistryLimit>,

    // Randomness
    pub randao_mixes: FixedVector<Hash256, T::EpochsPerHistoricalVector>,

    // Slashings
    pub slashings: FixedVector<u64, T::EpochsPerSlashingsVector>,

    // Attestations
    pub previous_epoch_attestations: VariableList<PendingAttestation<T>, T::MaxPendingAttestations>,
    pub current_epoch_attestations: VariableList<PendingAttestation<T>, T::MaxPendingAttestations>,

    // Finality
    pub justification_bits: BitVector<T::JustificationBitsLength>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // Caching (not in the spec)
    #[serde(skip_serializing, skip_deserializing)]
    #[ssz(skip_serializing, skip_deserializing)]
    #[tree_hash(skip_hashing)]
    pub committee_caches: [CommitteeCache; CACHED_EPOCHS],
    #[serde(skip_serializing, skip_deserializing)]
    #[ssz(skip_serializing, skip_deserializing)]
    #[tree_hash(skip_hashing)]
    pub tree_hash_cache: Option<BeaconTreeHashCache<T>>,
}

/// Returns the active validator indices in `validators` at `epoch`: those with
/// `activation_epoch <= epoch < exit_epoch`.
///
/// Spec v0.12.1
pub fn get_active_validator_indices(validators: &[Validator], epoch: Epoch) -> Vec<usize> {
    validators
        .iter()
        .enumerate()
        .filter(|(_, validator)| validator.is_active_at(epoch))
        .map(|(i, _)| i)
        .collect()
}

impl<T: EthSpec> BeaconState<T> {
    /// Produce the first state of the Beacon Chain.
    ///
    /// This does not fully build a genesis beacon state, it omits processing of initial
    /// validator deposits. To obtain a full genesis beacon state, use the
    /// `state_processing::initialize_beacon_state_from_eth1` function.
    ///
    /// Spec v0.12.1
    pub fn new(genesis_time: u64, eth1_data: Eth1Data, spec: &ChainSpec) -> Self {
        BeaconState {
            // Versioning
            genesis_time,
            slot: spec.genesis_slot,
            fork: Fork::genesis(spec.genesis_fork_version),

            // History
            latest_block_header: BeaconBlock::<T>::empty(spec).temporary_block_header(),
            block_roots: FixedVector::default(),
            state_roots: FixedVector::default(),
            historical_roots: VariableList::empty(),

            // Eth1
            eth1_data,
            eth1_data_votes: VariableList::empty(),
            eth1_deposit_index: 0,

            // Validator registry
            validators: VariableList::empty(),
            balances: VariableList::empty(),

            // Randomness
            randao_mixes: FixedVector::default(),

            // Slashings
            slashings: FixedVector::default(),

            // Attestations
            previous_epoch_attestations: VariableList::empty(),
            current_epoch_attestations: VariableList::empty(),

            // Finality
            justification_bits: BitVector::new(),
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),

            // Caching (not in spec)
            committee_caches: [
                CommitteeCache::default(),
                CommitteeCache::default(),
                CommitteeCache::default(),
            ],
            tree_hash_cache: None,
        }
    }

    /// Returns the `tree_hash_root` of the state, computing every node of the tree.
    ///
    /// Prefer `update_tree_hash_cache` where repeated roots of an evolving state are needed.
    ///
    /// Spec v0.12.1
    pub fn canonical_root(&self) -> Hash256 {
        self.tree_hash_root()
    }

    /// The epoch corresponding to `self.slot`.
    ///
    /// Spec v0.12.1
    pub fn current_epoch(&self) -> Epoch {
        self.slot.epoch(T::slots_per_epoch())
    }

    /// The epoch prior to `self.current_epoch()`.
    ///
    /// If the current epoch is the genesis epoch, the genesis_epoch is returned.
    ///
    /// Spec v0.12.1
    pub fn previous_epoch(&self) -> Epoch {
        let current_epoch = self.current_epoch();
        if current_epoch > T::genesis_epoch() {
            current_epoch - 1
        } else {
            current_epoch
        }
    }

    /// The epoch following `self.current_epoch()`.
    ///
    /// Spec v0.12.1
    pub fn next_epoch(&self) -> Result<Epoch, Error> {
        Ok(self.current_epoch().safe_add(1)?)
    }

    /// Returns the active validator indices for the given epoch, without consulting the committee
    /// caches.
    pub fn get_active_validator_indices(&self, epoch: Epoch) -> Vec<usize> {
        get_active_validator_indices(&self.validators, epoch)
    }

    /// Returns the active validator indices for the given `relative_epoch`, from the committee
    /// cache.
    ///
    /// Note: the indices are shuffled (i.e., not in ascending order).
    pub fn get_cached_active_validator_indices(
        &self,
        relative_epoch: RelativeEpoch,
    ) -> Result<&[usize], Error> {
        let cache = self.committee_cache(relative_epoch)?;

        Ok(cache.active_validator_indices())
    }

    /// The number of committees at `slot`, from the committee cache.
    pub fn get_committee_count_at_slot(&self, slot: Slot) -> Result<u64, Error> {
        let relative_epoch = RelativeEpoch::from_slot(self.slot, slot, T::slots_per_epoch())?;
        let cache = self.committee_cache(relative_epoch)?;
        Ok(cache.committees_per_slot())
    }

    /// The committee assigned to `(slot, index)`, from the committee cache.
    ///
    /// Spec v0.12.1
    pub fn get_beacon_committee(
        &self,
        slot: Slot,
        index: u64,
    ) -> Result<BeaconCommittee, Error> {
        let relative_epoch = RelativeEpoch::from_slot(self.slot, slot, T::slots_per_epoch())?;
        let cache = self.committee_cache(relative_epoch)?;

        cache
            .get_beacon_committee(slot, index)
            .ok_or(Error::NoCommittee { slot, index })
    }

    /// Every committee of the epoch described by `relative_epoch`.
    pub fn get_beacon_committees_at_epoch(
        &self,
        relative_epoch: RelativeEpoch,
    ) -> Result<Vec<BeaconCommittee>, Error> {
        let cache = self.committee_cache(relative_epoch)?;
        cache.get_all_beacon_committees()
    }

    /// Returns the block proposer for the given slot of the current epoch.
    ///
    /// The proposer is a balance-weighted sample over the active validator set, seeded by the
    /// epoch's RANDAO mix and the slot.
    ///
    /// Spec v0.12.1
    pub fn get_beacon_proposer_index(
        &self,
        slot: Slot,
        spec: &ChainSpec,
    ) -> Result<usize, Error> {
        let epoch = slot.epoch(T::slots_per_epoch());

        if epoch != self.current_epoch() {
            return Err(Error::SlotOutOfBounds);
        }

        let seed = self.get_beacon_proposer_seed(slot, spec)?;
        let indices = self.get_active_validator_indices(epoch);

        self.compute_proposer_index(&indices, &seed, spec)
    }

    /// Compute the seed to use for the beacon proposer selection at the given `slot`.
    fn get_beacon_proposer_seed(&self, slot: Slot, spec: &ChainSpec) -> Result<Vec<u8>, Error> {
        let epoch = slot.epoch(T::slots_per_epoch());
        let mut preimage = self
            .get_seed(epoch, Domain::BeaconProposer, spec)?
            .as_bytes()
            .to_vec();
        preimage.append(&mut int_to_bytes8(slot.as_u64()));
        Ok(hash(&preimage))
    }

    /// Compute the proposer (not necessarily for the Beacon chain) from a list of indices.
    ///
    /// Spec v0.12.1
    pub fn compute_proposer_index(
        &self,
        indices: &[usize],
        seed: &[u8],
        spec: &ChainSpec,
    ) -> Result<usize, Error> {
        if indices.is_empty() {
            return Err(Error::InsufficientValidators);
        }

        let mut i = 0;
        loop {
            let candidate_index = indices[compute_shuffled_index(
                i.safe_rem(indices.len())?,
                indices.len(),
                seed,
                spec.shuffle_round_count,
            )
            .ok_or(Error::UnableToShuffle)?];
            let random_byte = {
                let mut preimage = seed.to_vec();
                preimage.append(&mut int_to_bytes8((i / 32) as u64));
                let hash = hash(&preimage);
                hash[i % 32]
            };
            let effective_balance = self
                .validators
                .get(candidate_index)
                .ok_or(Error::UnknownValidator(candidate_index))?
                .effective_balance;
            if effective_balance.safe_mul(MAX_RANDOM_BYTE)?
                >= spec
                    .max_effective_balance
                    .safe_mul(u64::from(random_byte))?
            {
                return Ok(candidate_index);
            }
            i.safe_add_assign(1)?;
        }
    }

    /// Safely obtains the index for latest block roots, given some `slot`.
    ///
    /// Spec v0.12.1
    fn get_latest_block_roots_index(&self, slot: Slot) -> Result<usize, Error> {
        if slot < self.slot && self.slot <= slot + self.block_roots.len() as u64 {
            Ok(slot.as_usize().safe_rem(self.block_roots.len())?)
        } else {
            Err(Error::SlotOutOfBounds)
        }
    }

    /// Return the block root at a recent `slot`.
    ///
    /// Spec v0.12.1
    pub fn get_block_root(&self, slot: Slot) -> Result<&Hash256, Error> {
        let i = self.get_latest_block_roots_index(slot)?;
        Ok(&self.block_roots[i])
    }

    /// Return the block root at a recent `epoch`.
    ///
    /// Spec v0.12.1
    pub fn get_block_root_at_epoch(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        self.get_block_root(epoch.start_slot(T::slots_per_epoch()))
    }

    /// Sets the block root for some given slot.
    ///
    /// Spec v0.12.1
    pub fn set_block_root(&mut self, slot: Slot, block_root: Hash256) -> Result<(), Error> {
        let i = self.get_latest_block_roots_index(slot)?;
        self.block_roots[i] = block_root;
        Ok(())
    }

    /// Safely obtains the index for latest state roots, given some `slot`.
    ///
    /// Spec v0.12.1
    fn get_latest_state_roots_index(&self, slot: Slot) -> Result<usize, Error> {
        if slot < self.slot && self.slot <= slot + self.state_roots.len() as u64 {
            Ok(slot.as_usize().safe_rem(self.state_roots.len())?)
        } else {
            Err(Error::SlotOutOfBounds)
        }
    }

    /// Gets the state root for some slot.
    ///
    /// Spec v0.12.1
    pub fn get_state_root(&self, slot: Slot) -> Result<&Hash256, Error> {
        let i = self.get_latest_state_roots_index(slot)?;
        Ok(&self.state_roots[i])
    }

    /// Sets the latest state root for slot.
    ///
    /// Spec v0.12.1
    pub fn set_state_root(&mut self, slot: Slot, state_root: Hash256) -> Result<(), Error> {
        let i = self.get_latest_state_roots_index(slot)?;
        self.state_roots[i] = state_root;
        Ok(())
    }

    /// Safely obtain the index for `randao_mixes`.
    ///
    /// The epoch must fall inside the look-back window
    /// `(current_epoch - EPOCHS_PER_HISTORICAL_VECTOR, current_epoch]`.
    fn get_randao_mix_index(&self, epoch: Epoch) -> Result<usize, Error> {
        let current_epoch = self.current_epoch();
        let len = T::EpochsPerHistoricalVector::to_u64();

        if current_epoch < epoch.safe_add(len)? && epoch <= current_epoch {
            Ok(epoch.as_usize().safe_rem(len as usize)?)
        } else {
            Err(Error::EpochOutOfBounds)
        }
    }

    /// Return the randao mix at a recent ``epoch``.
    ///
    /// Spec v0.12.1
    pub fn get_randao_mix(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        let i = self.get_randao_mix_index(epoch)?;
        Ok(&self.randao_mixes[i])
    }

    /// XOR-update the randao mix at the given epoch position with the hash of the RANDAO reveal.
    ///
    /// Spec v0.12.1
    pub fn update_randao_mix(&mut self, epoch: Epoch, signature: &Signature) -> Result<(), Error> {
        let i = epoch
            .as_usize()
            .safe_rem(T::EpochsPerHistoricalVector::to_usize())?;

        let signature_hash = Hash256::from_slice(&hash(&signature.serialize()));

        self.randao_mixes[i] = *self.get_randao_mix(epoch)? ^ signature_hash;

        Ok(())
    }

    /// Set the randao mix at the ring position for ``epoch``.
    ///
    /// Unlike the getter this is not window-checked: epoch processing writes the mix for the
    /// *next* epoch when rotating the ring.
    ///
    /// Spec v0.12.1
    pub fn set_randao_mix(&mut self, epoch: Epoch, mix: Hash256) -> Result<(), Error> {
        let i = epoch
            .as_usize()
            .safe_rem(T::EpochsPerHistoricalVector::to_usize())?;
        self.randao_mixes[i] = mix;
        Ok(())
    }

    /// The number of deposits that have been acknowledged by the eth1 vote but not yet
    /// processed into the state.
    pub fn get_outstanding_deposit_len(&self) -> Result<u64, Error> {
        self.eth1_data
            .deposit_count
            .checked_sub(self.eth1_deposit_index)
            .ok_or(Error::DepositCountInvalid)
    }

    /// Generate a seed for the given `epoch`.
    ///
    /// Spec v0.12.1
    pub fn get_seed(
        &self,
        epoch: Epoch,
        domain_type: Domain,
        spec: &ChainSpec,
    ) -> Result<Hash256, Error> {
        // Bypass the safe randao getter: the seed for `epoch` deliberately reads the mix written
        // `MIN_SEED_LOOKAHEAD + 1` epochs before the end of the ring window.
        let mix = {
            let i = epoch
                .safe_add(T::EpochsPerHistoricalVector::to_u64())?
                .safe_sub(spec.min_seed_lookahead)?
                .safe_sub(1)?;
            let i_mod = i.as_usize().safe_rem(self.randao_mixes.len())?;
            self.randao_mixes[i_mod]
        };
        let domain_bytes = int_to_bytes4(spec.get_domain_constant(domain_type));
        let epoch_bytes = int_to_bytes8(epoch.as_u64());

        const NUM_DOMAIN_BYTES: usize = 4;
        const NUM_EPOCH_BYTES: usize = 8;
        const NUM_MIX_BYTES: usize = 32;

        let mut preimage = [0; NUM_DOMAIN_BYTES + NUM_EPOCH_BYTES + NUM_MIX_BYTES];
        preimage[0..NUM_DOMAIN_BYTES].copy_from_slice(&domain_bytes);
        preimage[NUM_DOMAIN_BYTES..NUM_DOMAIN_BYTES + NUM_EPOCH_BYTES]
            .copy_from_slice(&epoch_bytes);
        preimage[NUM_DOMAIN_BYTES + NUM_EPOCH_BYTES..].copy_from_slice(mix.as_bytes());

        Ok(Hash256::from_slice(&hash(&preimage)))
    }

    /// Return the effective balance for a validator with the given `validator_index`.
    ///
    /// Spec v0.12.1
    pub fn get_effective_balance(&self, validator_index: usize) -> Result<u64, Error> {
        self.validators
            .get(validator_index)
            .map(|v| v.effective_balance)
            .ok_or(Error::UnknownValidator(validator_index))
    }

    /// Return the combined effective balance of a set of validators, with a floor of one
    /// effective-balance increment.
    ///
    /// Spec v0.12.1
    pub fn get_total_balance(
        &self,
        validator_indices: &[usize],
        spec: &ChainSpec,
    ) -> Result<u64, Error> {
        let mut total = 0u64;
        for &i in validator_indices {
            total.safe_add_assign(self.get_effective_balance(i)?)?;
        }

        Ok(std::cmp::max(total, spec.effective_balance_increment))
    }

    /// Return the combined effective balance of the active validators of the current epoch.
    ///
    /// Spec v0.12.1
    pub fn get_total_active_balance(&self, spec: &ChainSpec) -> Result<u64, Error> {
        let indices = self.get_cached_active_validator_indices(RelativeEpoch::Current)?;
        // The slice is copied to satisfy the borrow checker; committees are small relative to
        // the state.
        let indices = indices.to_vec();
        self.get_total_balance(&indices, spec)
    }

    /// Return the churn limit for the current epoch: how many validators may enter or exit.
    ///
    /// Spec v0.12.1
    pub fn get_churn_limit(&self, spec: &ChainSpec) -> Result<u64, Error> {
        Ok(std::cmp::max(
            spec.min_per_epoch_churn_limit,
            (self
                .committee_cache(RelativeEpoch::Current)?
                .active_validator_count() as u64)
                .safe_div(spec.churn_limit_quotient)?,
        ))
    }

    /// Get the domain, mixing in the fork version active at `epoch`.
    pub fn get_domain(&self, epoch: Epoch, domain: Domain, spec: &ChainSpec) -> u64 {
        spec.get_domain(epoch, domain, &self.fork)
    }

    /// Get the total slashed balances recorded for the epoch's position in the slashings ring.
    pub fn get_slashings(&self, epoch: Epoch) -> Result<u64, Error> {
        let i = epoch
            .as_usize()
            .safe_rem(T::EpochsPerSlashingsVector::to_usize())?;
        Ok(self.slashings[i])
    }

    /// Get the entire slashings ring.
    pub fn get_all_slashings(&self) -> &[u64] {
        &self.slashings
    }

    /// Set the total slashed balances for the epoch's position in the slashings ring.
    pub fn set_slashings(&mut self, epoch: Epoch, value: u64) -> Result<(), Error> {
        let i = epoch
            .as_usize()
            .safe_rem(T::EpochsPerSlashingsVector::to_usize())?;
        self.slashings[i] = value;
        Ok(())
    }

    /// Get a mutable reference to the balance of a single validator.
    pub fn get_balance_mut(&mut self, validator_index: usize) -> Result<&mut u64, Error> {
        self.balances
            .get_mut(validator_index)
            .ok_or(Error::UnknownValidator(validator_index))
    }

    /// Build all committee caches, if they need to be built.
    pub fn build_all_committee_caches(&mut self, spec: &ChainSpec) -> Result<(), Error> {
        self.build_committee_cache(RelativeEpoch::Previous, spec)?;
        self.build_committee_cache(RelativeEpoch::Current, spec)?;
        self.build_committee_cache(RelativeEpoch::Next, spec)?;
        Ok(())
    }

    /// Build an epoch cache, unless it is has already been built.
    pub fn build_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<(), Error> {
        let i = Self::committee_cache_index(relative_epoch);
        let is_initialized = self.committee_caches[i]
            .is_initialized_at(relative_epoch.into_epoch(self.current_epoch()));

        if !is_initialized {
            self.force_build_committee_cache(relative_epoch, spec)?;
        }

        Ok(())
    }

    /// Always builds the requested committee cache, even if it is already initialized.
    pub fn force_build_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<(), Error> {
        let epoch = relative_epoch.into_epoch(self.current_epoch());

        self.committee_caches[Self::committee_cache_index(relative_epoch)] =
            CommitteeCache::initialized(self, epoch, spec)?;
        Ok(())
    }

    /// Advances the cache for this state into the next epoch.
    ///
    /// This should be used following per-epoch processing: the previous-epoch cache is dropped,
    /// the current becomes previous and the next slot is left to be built.
    pub fn advance_caches(&mut self) {
        self.committee_caches.rotate_left(1);
        self.committee_caches[Self::committee_cache_index(RelativeEpoch::Next)] =
            CommitteeCache::default();
    }

    fn committee_cache_index(relative_epoch: RelativeEpoch) -> usize {
        match relative_epoch {
            RelativeEpoch::Previous => 0,
            RelativeEpoch::Current => 1,
            RelativeEpoch::Next => 2,
        }
    }

    /// Returns the cache for some `RelativeEpoch`. Returns an error if the cache has not been
    /// initialized.
    pub fn committee_cache(&self, relative_epoch: RelativeEpoch) -> Result<&CommitteeCache, Error> {
        let cache = &self.committee_caches[Self::committee_cache_index(relative_epoch)];

        if cache.is_initialized_at(relative_epoch.into_epoch(self.current_epoch())) {
            Ok(cache)
        } else {
            Err(Error::CommitteeCacheUninitialized(Some(relative_epoch)))
        }
    }

    /// Completely drops the `committee_caches`, replacing them with new, empty caches.
    pub fn drop_committee_caches(&mut self) {
        self.committee_caches = [
            CommitteeCache::default(),
            CommitteeCache::default(),
            CommitteeCache::default(),
        ];
    }

    /// Compute the tree hash root of the state using the tree hash cache, initializing it if it
    /// does not exist.
    ///
    /// The first call builds every node of the tree; subsequent calls only re-hash the paths
    /// above leaves that changed since the previous call.
    pub fn update_tree_hash_cache(&mut self) -> Result<Hash256, Error> {
        if self.tree_hash_cache.is_none() {
            self.tree_hash_cache = Some(BeaconTreeHashCache::new(self));
        }

        // The cache is temporarily taken so that it can borrow `self` immutably.
        let mut cache = self
            .tree_hash_cache
            .take()
            .ok_or(Error::TreeHashCacheNotInitialized)?;
        let result = cache.recalculate_tree_hash_root(self);
        self.tree_hash_cache = Some(cache);

        result
    }

    /// Completely drops the tree hash cache, replacing it with a new, empty cache.
    pub fn drop_tree_hash_cache(&mut self) {
        self.tree_hash_cache = None;
    }
}

/// Equality is defined over the canonical (spec) fields only; caches never affect it.
impl<T: EthSpec> PartialEq for BeaconState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.genesis_time == other.genesis_time
            && self.slot == other.slot
            && self.fork == other.fork
            && self.latest_block_header == other.latest_block_header
            && self.block_roots == other.block_roots
            && self.state_roots == other.state_roots
            && self.historical_roots == other.historical_roots
            && self.eth1_data == other.eth1_data
            && self.eth1_data_votes == other.eth1_data_votes
            && self.eth1_deposit_index == other.eth1_deposit_index
            && self.validators == other.validators
            && self.balances == other.balances
            && self.randao_mixes == other.randao_mixes
            && self.slashings == other.slashings
            && self.previous_epoch_attestations == other.previous_epoch_attestations
            && self.current_epoch_attestations == other.current_epoch_attestations
            && self.justification_bits == other.justification_bits
            && self.previous_justified_checkpoint == other.previous_justified_checkpoint
            && self.current_justified_checkpoint == other.current_justified_checkpoint
            && self.finalized_checkpoint == other.finalized_checkpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestingBeaconStateBuilder;
    use crate::MinimalEthSpec;
    use ssz::{Decode, Encode};
    use std::collections::HashSet;

    type E = MinimalEthSpec;

    fn test_state(validator_count: usize) -> (BeaconState<E>, ChainSpec) {
        let spec = E::default_spec();
        let (state, _keypairs) =
            TestingBeaconStateBuilder::new(validator_count, &spec).build();
        (state, spec)
    }

    #[test]
    fn ssz_round_trip_drops_caches() {
        let (mut state, spec) = test_state(16);
        state.build_all_committee_caches(&spec).unwrap();
        state.update_tree_hash_cache().unwrap();

        let bytes = state.as_ssz_bytes();
        let decoded = BeaconState::<E>::from_ssz_bytes(&bytes).unwrap();

        assert_eq!(state, decoded);
        assert!(decoded.tree_hash_cache.is_none());
    }

    #[test]
    fn cached_root_equals_full_root() {
        let (mut state, _spec) = test_state(16);

        assert_eq!(state.update_tree_hash_cache().unwrap(), state.canonical_root());

        // Mutate something small and check again.
        state.genesis_time += 1;
        *state.get_balance_mut(3).unwrap() += 7;

        assert_eq!(state.update_tree_hash_cache().unwrap(), state.canonical_root());
    }

    #[test]
    fn committees_are_a_partition_of_the_active_set() {
        let validator_count = 57;
        let (mut state, spec) = test_state(validator_count);
        state.build_committee_cache(RelativeEpoch::Current, &spec).unwrap();

        let mut seen = HashSet::new();
        let committees = state
            .get_beacon_committees_at_epoch(RelativeEpoch::Current)
            .unwrap();

        for bc in &committees {
            for &validator_index in bc.committee {
                assert!(
                    seen.insert(validator_index),
                    "validator {} appears in two committees",
                    validator_index
                );
            }
        }

        let active = state.get_active_validator_indices(state.current_epoch());
        assert_eq!(seen.len(), active.len());
        assert_eq!(seen, active.into_iter().collect::<HashSet<_>>());
    }

    #[test]
    fn randao_mix_bounds() {
        let (state, _spec) = test_state(16);

        // Genesis: only the current epoch is inside the window.
        assert!(state.get_randao_mix(state.current_epoch()).is_ok());
        assert!(state.get_randao_mix(state.current_epoch() + 1).is_err());
    }

    #[test]
    fn block_root_bounds() {
        let (mut state, _spec) = test_state(16);

        // At slot zero no root has been recorded yet.
        assert!(state.get_block_root(Slot::new(0)).is_err());

        state.slot = Slot::new(1);
        assert!(state.get_block_root(Slot::new(0)).is_ok());
        assert!(state.get_block_root(Slot::new(1)).is_err());
    }

    #[test]
    fn proposer_index_is_stable_and_in_the_active_set() {
        let (mut state, spec) = test_state(16);
        state.build_committee_cache(RelativeEpoch::Current, &spec).unwrap();

        let proposer = state
            .get_beacon_proposer_index(state.slot, &spec)
            .unwrap();
        let again = state
            .get_beacon_proposer_index(state.slot, &spec)
            .unwrap();

        assert_eq!(proposer, again);
        assert!(state
            .get_active_validator_indices(state.current_epoch())
            .contains(&proposer));
    }
}
