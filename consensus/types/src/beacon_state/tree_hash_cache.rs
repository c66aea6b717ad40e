use super::{BeaconState, Error};
use crate::{EthSpec, Hash256, Unsigned, Validator};
use cached_tree_hash::{int_log, CacheArena, CachedTreeHash, TreeHashCache};
use std::marker::PhantomData;
use tree_hash::{mix_in_length, MerkleHasher, TreeHash, BYTES_PER_CHUNK};

/// The number of fields on the beacon state.
const NUM_BEACON_STATE_FIELDS: usize = 20;

/// The number of leaves in the Merkle tree of a `Validator` container.
const NUM_VALIDATOR_FIELDS: usize = 8;

/// Provides an incremental tree hash for an evolving `BeaconState`.
///
/// The large rings and lists each keep a `TreeHashCache`; the remaining (small) fields are
/// hashed from scratch on every recalculation. Cloning the cache (which happens whenever a
/// state is cloned) forks it: both sides continue independently.
#[derive(Debug, Clone)]
pub struct BeaconTreeHashCache<T: EthSpec> {
    /// Arena for the fixed-size rings: block roots, state roots, historical and randao mixes.
    fixed_arena: CacheArena,
    balances_arena: CacheArena,
    slashings_arena: CacheArena,
    block_roots: TreeHashCache,
    state_roots: TreeHashCache,
    historical_roots: TreeHashCache,
    randao_mixes: TreeHashCache,
    slashings: TreeHashCache,
    balances: TreeHashCache,
    validators: ValidatorsListTreeHashCache,
    _phantom: PhantomData<T>,
}

impl<T: EthSpec> BeaconTreeHashCache<T> {
    pub fn new(state: &BeaconState<T>) -> Self {
        let mut fixed_arena = CacheArena::default();
        let block_roots = state.block_roots.new_tree_hash_cache(&mut fixed_arena);
        let state_roots = state.state_roots.new_tree_hash_cache(&mut fixed_arena);
        let historical_roots = state.historical_roots.new_tree_hash_cache(&mut fixed_arena);
        let randao_mixes = state.randao_mixes.new_tree_hash_cache(&mut fixed_arena);

        let mut balances_arena = CacheArena::default();
        let balances = state.balances.new_tree_hash_cache(&mut balances_arena);

        let mut slashings_arena = CacheArena::default();
        let slashings = state.slashings.new_tree_hash_cache(&mut slashings_arena);

        let validators = ValidatorsListTreeHashCache::new::<T>(&state.validators);

        Self {
            fixed_arena,
            balances_arena,
            slashings_arena,
            block_roots,
            state_roots,
            historical_roots,
            randao_mixes,
            slashings,
            balances,
            validators,
            _phantom: PhantomData,
        }
    }

    /// Updates the cache and returns the tree hash root for the given `state`.
    ///
    /// The provided `state` should be a descendant of the last `state` given to this function, or
    /// the `Self::new` function.
    pub fn recalculate_tree_hash_root(&mut self, state: &BeaconState<T>) -> Result<Hash256, Error> {
        let mut hasher = MerkleHasher::with_leaves(NUM_BEACON_STATE_FIELDS);

        hasher.write(state.genesis_time.tree_hash_root().as_bytes())?;
        hasher.write(state.slot.tree_hash_root().as_bytes())?;
        hasher.write(state.fork.tree_hash_root().as_bytes())?;
        hasher.write(state.latest_block_header.tree_hash_root().as_bytes())?;
        hasher.write(
            state
                .block_roots
                .recalculate_tree_hash_root(&mut self.fixed_arena, &mut self.block_roots)?
                .as_bytes(),
        )?;
        hasher.write(
            state
                .state_roots
                .recalculate_tree_hash_root(&mut self.fixed_arena, &mut self.state_roots)?
                .as_bytes(),
        )?;
        hasher.write(
            state
                .historical_roots
                .recalculate_tree_hash_root(&mut self.fixed_arena, &mut self.historical_roots)?
                .as_bytes(),
        )?;
        hasher.write(state.eth1_data.tree_hash_root().as_bytes())?;
        hasher.write(state.eth1_data_votes.tree_hash_root().as_bytes())?;
        hasher.write(state.eth1_deposit_index.tree_hash_root().as_bytes())?;
        hasher.write(
            self.validators
                .recalculate_tree_hash_root(&state.validators)?
                .as_bytes(),
        )?;
        hasher.write(
            state
                .balances
                .recalculate_tree_hash_root(&mut self.balances_arena, &mut self.balances)?
                .as_bytes(),
        )?;
        hasher.write(
            state
                .randao_mixes
                .recalculate_tree_hash_root(&mut self.fixed_arena, &mut self.randao_mixes)?
                .as_bytes(),
        )?;
        hasher.write(
            state
                .slashings
                .recalculate_tree_hash_root(&mut self.slashings_arena, &mut self.slashings)?
                .as_bytes(),
        )?;
        hasher.write(state.previous_epoch_attestations.tree_hash_root().as_bytes())?;
        hasher.write(state.current_epoch_attestations.tree_hash_root().as_bytes())?;
        hasher.write(state.justification_bits.tree_hash_root().as_bytes())?;
        hasher.write(
            state
                .previous_justified_checkpoint
                .tree_hash_root()
                .as_bytes(),
        )?;
        hasher.write(
            state
                .current_justified_checkpoint
                .tree_hash_root()
                .as_bytes(),
        )?;
        hasher.write(state.finalized_checkpoint.tree_hash_root().as_bytes())?;

        hasher.finish().map_err(Into::into)
    }
}

/// A cache for the `validators` list: one small cache per validator plus one cache over the
/// resulting validator roots.
#[derive(Debug, Clone)]
struct ValidatorsListTreeHashCache {
    list_arena: CacheArena,
    values_arena: CacheArena,
    list_cache: TreeHashCache,
    value_caches: Vec<TreeHashCache>,
    /// Memoised pubkey roots; a validator's pubkey is immutable once it has been appended, so
    /// its two-chunk hash never needs recomputing.
    pubkey_roots: Vec<Hash256>,
}

impl ValidatorsListTreeHashCache {
    fn new<T: EthSpec>(_validators: &[Validator]) -> Self {
        let mut list_arena = CacheArena::default();
        let list_cache = TreeHashCache::new(
            &mut list_arena,
            int_log(T::ValidatorRegistryLimit::to_usize()),
            0,
        );

        Self {
            list_arena,
            values_arena: CacheArena::default(),
            list_cache,
            value_caches: vec![],
            pubkey_roots: vec![],
        }
    }

    fn recalculate_tree_hash_root(&mut self, validators: &[Validator]) -> Result<Hash256, Error> {
        // Registrations are append-only; allocate caches for any new validators.
        for validator in validators.iter().skip(self.value_caches.len()) {
            self.value_caches.push(TreeHashCache::new(
                &mut self.values_arena,
                int_log(NUM_VALIDATOR_FIELDS),
                NUM_VALIDATOR_FIELDS,
            ));
            self.pubkey_roots.push(validator.pubkey.tree_hash_root());
        }

        let mut roots = Vec::with_capacity(validators.len());
        for (i, validator) in validators.iter().enumerate() {
            let leaves = validator_leaves(validator, self.pubkey_roots[i]);
            let root =
                self.value_caches[i].recalculate_merkle_root(&mut self.values_arena, leaves)?;
            roots.push(root);
        }

        let list_root = self.list_cache.recalculate_merkle_root(
            &mut self.list_arena,
            roots.iter().map(|root| root.to_fixed_bytes()),
        )?;

        Ok(mix_in_length(&list_root, validators.len()))
    }
}

/// The eight chunk-leaves of a `Validator` container, in field order.
fn validator_leaves(
    validator: &Validator,
    pubkey_root: Hash256,
) -> impl ExactSizeIterator<Item = [u8; BYTES_PER_CHUNK]> {
    let leaves: Vec<[u8; BYTES_PER_CHUNK]> = vec![
        pubkey_root.to_fixed_bytes(),
        validator.withdrawal_credentials.to_fixed_bytes(),
        u64_chunk(validator.effective_balance),
        u64_chunk(validator.slashed as u64),
        u64_chunk(validator.activation_eligibility_epoch.as_u64()),
        u64_chunk(validator.activation_epoch.as_u64()),
        u64_chunk(validator.exit_epoch.as_u64()),
        u64_chunk(validator.withdrawable_epoch.as_u64()),
    ];

    leaves.into_iter()
}

fn u64_chunk(value: u64) -> [u8; BYTES_PER_CHUNK] {
    let mut chunk = [0; BYTES_PER_CHUNK];
    chunk[0..8].copy_from_slice(&value.to_le_bytes());
    chunk
}
