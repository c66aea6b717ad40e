use super::{BlockRootsAtSlot, Error, Store};
use std::marker::PhantomData;
use std::sync::Arc;
use types::{BeaconBlock, Checkpoint, EthSpec, Hash256, Slot};

/// The single key under which the best justified checkpoint pointer lives.
const JUSTIFIED_CHECKPOINT_KEY: &[u8] = b"best";

/// The chain storage facade: blocks by root, block roots by slot, and the best justified
/// checkpoint, overlaid on an opaque `Store`.
pub struct ChainStore<S, E> {
    db: Arc<S>,
    _phantom: PhantomData<E>,
}

impl<S, E> Clone for ChainStore<S, E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<S: Store, E: EthSpec> ChainStore<S, E> {
    pub fn new(db: Arc<S>) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }

    /// Store a block under its root and append the root to the slot index.
    pub fn put_block(&self, block_root: Hash256, block: &BeaconBlock<E>) -> Result<(), Error> {
        self.db.put(block_root.as_bytes(), block)?;

        let slot_key = block.slot.as_u64().to_le_bytes();
        let mut index: BlockRootsAtSlot =
            self.db.get(&slot_key)?.unwrap_or_default();
        if !index.roots.contains(&block_root) {
            index.roots.push(block_root);
            self.db.put(&slot_key, &index)?;
        }

        Ok(())
    }

    /// Retrieve a block by its root.
    pub fn get_block(&self, block_root: &Hash256) -> Result<Option<BeaconBlock<E>>, Error> {
        self.db.get(block_root.as_bytes())
    }

    /// Returns `true` if the block is known.
    pub fn block_exists(&self, block_root: &Hash256) -> Result<bool, Error> {
        self.db
            .key_exists(super::DBColumn::BeaconBlock, block_root.as_bytes())
    }

    /// Every block root observed at the given slot, in insertion order.
    pub fn block_roots_at_slot(&self, slot: Slot) -> Result<Vec<Hash256>, Error> {
        let slot_key = slot.as_u64().to_le_bytes();
        Ok(self
            .db
            .get::<BlockRootsAtSlot>(&slot_key)?
            .unwrap_or_default()
            .roots)
    }

    /// Walk `parent_root` links from `head_root` until a block at `slot` is found.
    ///
    /// Returns `None` if the chain skipped the slot, an error if the walk leaves the store.
    pub fn block_at_slot(
        &self,
        head_root: Hash256,
        slot: Slot,
    ) -> Result<Option<(Hash256, BeaconBlock<E>)>, Error> {
        let mut current_root = head_root;

        loop {
            let block = match self.get_block(&current_root)? {
                Some(block) => block,
                None => {
                    return Err(Error::DBError {
                        message: format!("missing block during ancestor walk: {:?}", current_root),
                    })
                }
            };

            if block.slot == slot {
                break Ok(Some((current_root, block)));
            } else if block.slot < slot {
                break Ok(None);
            } else {
                current_root = block.parent_root;
            }
        }
    }

    /// The best justified checkpoint pointer, if one has been stored.
    pub fn justified_checkpoint(&self) -> Result<Option<Checkpoint>, Error> {
        self.db.get(JUSTIFIED_CHECKPOINT_KEY)
    }

    /// Replace the best justified checkpoint pointer.
    pub fn set_justified_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), Error> {
        self.db.put(JUSTIFIED_CHECKPOINT_KEY, checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryStore;
    use super::*;
    use types::{ChainSpec, Epoch, MinimalEthSpec};

    type E = MinimalEthSpec;

    fn block_at(slot: u64, parent_root: Hash256, spec: &ChainSpec) -> (Hash256, BeaconBlock<E>) {
        let mut block = BeaconBlock::empty(spec);
        block.slot = Slot::new(slot);
        block.parent_root = parent_root;
        (block.canonical_root(), block)
    }

    fn chain_store() -> ChainStore<MemoryStore, E> {
        ChainStore::new(Arc::new(MemoryStore::open()))
    }

    #[test]
    fn blocks_round_trip_and_index() {
        let spec = ChainSpec::minimal();
        let store = chain_store();

        let (root, block) = block_at(3, Hash256::zero(), &spec);
        store.put_block(root, &block).unwrap();

        assert_eq!(store.get_block(&root).unwrap(), Some(block));
        assert!(store.block_exists(&root).unwrap());
        assert_eq!(store.block_roots_at_slot(Slot::new(3)).unwrap(), vec![root]);
        assert_eq!(store.block_roots_at_slot(Slot::new(4)).unwrap(), vec![]);

        // Re-inserting does not duplicate the index entry.
        let (root_again, block_again) = block_at(3, Hash256::zero(), &spec);
        store.put_block(root_again, &block_again).unwrap();
        assert_eq!(store.block_roots_at_slot(Slot::new(3)).unwrap(), vec![root]);
    }

    #[test]
    fn ancestor_walk_finds_blocks_and_skips() {
        let spec = ChainSpec::minimal();
        let store = chain_store();

        let (root_0, block_0) = block_at(0, Hash256::repeat_byte(0xff), &spec);
        let (root_1, block_1) = block_at(1, root_0, &spec);
        // Slot 2 is skipped.
        let (root_3, block_3) = block_at(3, root_1, &spec);

        store.put_block(root_0, &block_0).unwrap();
        store.put_block(root_1, &block_1).unwrap();
        store.put_block(root_3, &block_3).unwrap();

        let (found_root, found_block) = store.block_at_slot(root_3, Slot::new(1)).unwrap().unwrap();
        assert_eq!(found_root, root_1);
        assert_eq!(found_block, block_1);

        assert_eq!(store.block_at_slot(root_3, Slot::new(2)).unwrap(), None);
    }

    #[test]
    fn justified_pointer_round_trips() {
        let store = chain_store();

        assert_eq!(store.justified_checkpoint().unwrap(), None);

        let checkpoint = Checkpoint {
            epoch: Epoch::new(3),
            root: Hash256::repeat_byte(0x11),
        };
        store.set_justified_checkpoint(&checkpoint).unwrap();

        assert_eq!(store.justified_checkpoint().unwrap(), Some(checkpoint));
    }
}
