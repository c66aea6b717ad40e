//! Incremental Merkle-root caching.
//!
//! A `TreeHashCache` remembers every node of a value's Merkle tree. When the value mutates, the
//! new leaves are diffed against the remembered ones and only the paths above changed leaves are
//! re-hashed. Cloning a cache (together with its arena) forks it: both sides continue
//! independently with the same memoised root.

mod cache;
mod cache_arena;
mod impls;

use smallvec::SmallVec;

type SmallVec8<T> = SmallVec<[T; 8]>;

pub type CacheArena = cache_arena::CacheArena<Hash256>;
pub type CacheArenaAllocation = cache_arena::CacheArenaAllocation<Hash256>;

pub use crate::cache::TreeHashCache;
pub use crate::impls::int_log;
use ethereum_types::H256 as Hash256;

/// The ways an incremental recomputation can fail.
///
/// A cache is bound to one value: its depth fixes the leaf capacity and its stored layers must
/// track that value's mutations exactly. Each variant names the binding that was broken.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// More leaves were supplied than the depth chosen at construction can hold.
    LeafCapacityExceeded { capacity: usize, supplied: usize },
    /// Fewer leaves were supplied than are already stored. Tracked values only ever grow, so a
    /// shorter leaf stream means the cache was applied to the wrong value.
    LeafCountDecreased { stored: usize, supplied: usize },
    /// A parent layer is shorter than its dirty children require; the stored layers no longer
    /// describe one tree.
    ParentLayerOutOfSync,
    /// A dirty node had no left sibling in the layer below.
    MissingLeftNode(usize),
    /// The backing arena rejected an access.
    Arena(cache_arena::Error),
}

impl From<cache_arena::Error> for Error {
    fn from(e: cache_arena::Error) -> Error {
        Error::Arena(e)
    }
}

/// Implemented by types that can compute their tree hash root through a cache instead of from
/// scratch.
///
/// The `Cache` parameter lets composite values carry something richer than a single
/// `TreeHashCache` (e.g., one cache per field plus one for the field roots).
pub trait CachedTreeHash<Cache> {
    /// Create a new cache appropriate for use with values of this type.
    fn new_tree_hash_cache(&self, arena: &mut CacheArena) -> Cache;

    /// Update the cache and use it to compute the tree hash root for `self`.
    fn recalculate_tree_hash_root(
        &self,
        arena: &mut CacheArena,
        cache: &mut Cache,
    ) -> Result<Hash256, Error>;
}
