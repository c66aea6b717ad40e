use crate::{CacheArena, CacheArenaAllocation, Error, Hash256, SmallVec8};
use eth2_hashing::{hash32_concat, ZERO_HASHES};
use smallvec::smallvec;
use tree_hash::BYTES_PER_CHUNK;

/// Sparse Merkle tree suitable for tree hash caching.
///
/// `layers[0]` is the root layer (a single node), `layers[depth]` is the leaf layer. Layers are
/// only populated as far right as the leaves supplied so far; anything to the right is an implicit
/// zero-subtree.
#[derive(Debug, PartialEq, Clone)]
pub struct TreeHashCache {
    initialized: bool,
    depth: usize,
    layers: Vec<CacheArenaAllocation>,
}

impl TreeHashCache {
    /// Create a new cache with a capacity for `2^depth` leaves.
    ///
    /// `_leaves` is a hint for the number of leaves the caller expects to store; allocations are
    /// created lazily so it is only advisory.
    pub fn new(arena: &mut CacheArena, depth: usize, _leaves: usize) -> Self {
        let layers = (0..=depth).map(|_| arena.alloc()).collect();

        TreeHashCache {
            initialized: false,
            depth,
            layers,
        }
    }

    /// Compute the tree hash root of the given `leaves`, replaying only the hashing above leaves
    /// which differ from the previous call.
    pub fn recalculate_merkle_root(
        &mut self,
        arena: &mut CacheArena,
        leaves: impl ExactSizeIterator<Item = [u8; BYTES_PER_CHUNK]>,
    ) -> Result<Hash256, Error> {
        let dirty_indices = self.update_leaves(arena, leaves)?;
        self.update_merkle_root(arena, dirty_indices)
    }

    /// Phase 1 of an update: store the new leaves, returning the indices of those which changed.
    pub fn update_leaves(
        &mut self,
        arena: &mut CacheArena,
        mut leaves: impl ExactSizeIterator<Item = [u8; BYTES_PER_CHUNK]>,
    ) -> Result<SmallVec8<usize>, Error> {
        let new_leaf_count = leaves.len();
        let leaf_layer = self.layers[self.depth].clone();
        let initialized = self.initialized;

        let stored_leaf_count = leaf_layer.len(arena)?;

        if new_leaf_count < stored_leaf_count {
            return Err(Error::LeafCountDecreased {
                stored: stored_leaf_count,
                supplied: new_leaf_count,
            });
        }

        let capacity = 2usize.pow(self.depth as u32);
        if new_leaf_count > capacity {
            return Err(Error::LeafCapacityExceeded {
                capacity,
                supplied: new_leaf_count,
            });
        }

        let mut dirty: SmallVec8<usize> = smallvec![];

        // Diff the new leaves against the stored ones.
        leaf_layer
            .iter_mut(arena)?
            .enumerate()
            .zip(&mut leaves)
            .for_each(|((i, leaf), new_leaf)| {
                if !initialized || leaf.as_bytes() != &new_leaf[..] {
                    leaf.assign_from_slice(&new_leaf);
                    dirty.push(i);
                }
            });

        // Any remaining new leaves extend the tree to the right.
        dirty.extend(stored_leaf_count..new_leaf_count);
        leaf_layer.extend_with_vec(arena, leaves.map(|l| Hash256::from_slice(&l)).collect())?;

        self.initialized = true;

        Ok(dirty)
    }

    /// Phase 2 of an update: hash the paths above every dirty leaf.
    ///
    /// An empty `dirty_indices` returns the memoised root without performing any hashing at all.
    pub fn update_merkle_root(
        &mut self,
        arena: &mut CacheArena,
        mut dirty_indices: SmallVec8<usize>,
    ) -> Result<Hash256, Error> {
        if dirty_indices.is_empty() {
            return Ok(self.root(arena));
        }

        let mut depth = self.depth;

        while depth > 0 {
            let new_dirty_indices = lift_dirty(&dirty_indices);

            for &idx in &new_dirty_indices {
                let left_idx = idx * 2;
                let right_idx = left_idx + 1;

                let left = self.layers[depth]
                    .get(arena, left_idx)?
                    .copied()
                    .ok_or(Error::MissingLeftNode(left_idx))?;

                let right = self.layers[depth]
                    .get(arena, right_idx)?
                    .copied()
                    .unwrap_or_else(|| Hash256::from_slice(&ZERO_HASHES[self.depth - depth]));

                let new_hash = hash32_concat(left.as_bytes(), right.as_bytes());

                match self.layers[depth - 1].get_mut(arena, idx)? {
                    Some(hash) => {
                        hash.assign_from_slice(&new_hash);
                    }
                    None => {
                        // The parent layer should never be more than one node shorter than
                        // required, since we process dirty indices in ascending order.
                        if self.layers[depth - 1].len(arena)? == idx {
                            self.layers[depth - 1].push(arena, Hash256::from_slice(&new_hash))?;
                        } else {
                            return Err(Error::ParentLayerOutOfSync);
                        }
                    }
                }
            }

            dirty_indices = new_dirty_indices;
            depth -= 1;
        }

        Ok(self.root(arena))
    }

    /// Get the root of this cache, without doing any updates/computation.
    pub fn root(&self, arena: &CacheArena) -> Hash256 {
        self.layers[0]
            .get(arena, 0)
            .ok()
            .flatten()
            .copied()
            .unwrap_or_else(|| Hash256::from_slice(&ZERO_HASHES[self.depth]))
    }

    /// The number of leaves stored so far.
    pub fn leaf_count(&self, arena: &CacheArena) -> Result<usize, Error> {
        self.layers[self.depth].len(arena).map_err(Into::into)
    }
}

/// Returns the parent indices for a set of node indices within a layer.
fn lift_dirty(dirty_indices: &[usize]) -> SmallVec8<usize> {
    let mut new_dirty: SmallVec8<usize> = dirty_indices.iter().map(|i| *i / 2).collect();

    new_dirty.dedup();

    new_dirty
}
