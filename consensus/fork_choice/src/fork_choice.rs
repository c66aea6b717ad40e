use std::collections::HashMap;
use types::{Epoch, Hash256, Slot};

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// The justified block the traversal starts from is not known.
    MissingJustifiedBlock(Hash256),
}

/// The most recent vote of a single validator.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct LatestMessage {
    pub epoch: Epoch,
    pub root: Hash256,
}

#[derive(Debug, Clone, Copy)]
struct BlockInfo {
    slot: Slot,
    parent_root: Hash256,
}

/// Latest-vote-weighted fork choice.
///
/// `find_head` walks the block tree from the justified block, at every step descending into the
/// child whose subtree carries the greatest attesting balance, with ties broken towards the
/// lexicographically smaller root. Two instances fed the same blocks and votes always select
/// the same head.
#[derive(Debug, Default, Clone)]
pub struct ForkChoice {
    /// Minimal information about every known block.
    blocks: HashMap<Hash256, BlockInfo>,
    /// Stores the children for any given parent.
    children: HashMap<Hash256, Vec<Hash256>>,
    /// The latest attestation target of each validator.
    latest_messages: HashMap<u64, LatestMessage>,
}

impl ForkChoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block.
    ///
    /// Re-registering a known root is a no-op: blocks are immutable after construction.
    pub fn process_block(&mut self, root: Hash256, parent_root: Hash256, slot: Slot) {
        if self.blocks.contains_key(&root) {
            return;
        }

        self.blocks.insert(root, BlockInfo { slot, parent_root });
        self.children.entry(parent_root).or_insert_with(Vec::new).push(root);
    }

    /// Register the latest attestation of `validator_index`.
    ///
    /// Only the most recent vote (by target epoch) of each validator is retained.
    pub fn process_attestation(
        &mut self,
        validator_index: u64,
        block_root: Hash256,
        target_epoch: Epoch,
    ) {
        match self.latest_messages.get_mut(&validator_index) {
            Some(message) => {
                if target_epoch > message.epoch {
                    *message = LatestMessage {
                        epoch: target_epoch,
                        root: block_root,
                    };
                }
            }
            None => {
                self.latest_messages.insert(
                    validator_index,
                    LatestMessage {
                        epoch: target_epoch,
                        root: block_root,
                    },
                );
            }
        }
    }

    /// Returns the latest message of the given validator, if any.
    pub fn latest_message(&self, validator_index: u64) -> Option<&LatestMessage> {
        self.latest_messages.get(&validator_index)
    }

    /// Returns `true` if the block is known to the fork choice.
    pub fn contains_block(&self, root: &Hash256) -> bool {
        self.blocks.contains_key(root)
    }

    /// Run the head-finding traversal from the justified block.
    ///
    /// `balances` maps validator index to effective balance (conventionally those of the
    /// justified state); validators outside the slice carry no weight.
    pub fn find_head(
        &self,
        justified_root: Hash256,
        balances: &[u64],
    ) -> Result<Hash256, Error> {
        let justified_block = self
            .blocks
            .get(&justified_root)
            .ok_or(Error::MissingJustifiedBlock(justified_root))?;

        // Weigh every latest message once, up front.
        let mut latest_votes: HashMap<Hash256, u64> = HashMap::new();
        for (validator_index, message) in &self.latest_messages {
            if let Some(balance) = balances.get(*validator_index as usize) {
                if *balance > 0 {
                    *latest_votes.entry(message.root).or_insert(0) += balance;
                }
            }
        }

        let mut head_root = justified_root;

        loop {
            let children = match self.children.get(&head_root) {
                Some(children) if !children.is_empty() => children,
                // No children: the head has been found.
                _ => break,
            };

            // Candidates are visited in lexicographic order and only replaced on strictly
            // greater weight, so ties resolve to the smallest root.
            let mut candidates = children.clone();
            candidates.sort();

            let mut best: Option<(Hash256, u64)> = None;
            for candidate in candidates {
                let candidate_slot = match self.blocks.get(&candidate) {
                    Some(info) => info.slot,
                    None => continue,
                };

                // Only blocks beyond the justified block are considered.
                if candidate_slot <= justified_block.slot {
                    continue;
                }

                let weight = self.subtree_weight(&latest_votes, candidate);

                match best {
                    Some((_, best_weight)) if weight <= best_weight => {}
                    _ => best = Some((candidate, weight)),
                }
            }

            match best {
                Some((root, _)) => head_root = root,
                None => break,
            }
        }

        Ok(head_root)
    }

    /// Sum the weight of all latest votes whose block has `ancestor_root` as an ancestor
    /// (itself included).
    fn subtree_weight(&self, latest_votes: &HashMap<Hash256, u64>, ancestor_root: Hash256) -> u64 {
        let ancestor_slot = match self.blocks.get(&ancestor_root) {
            Some(info) => info.slot,
            None => return 0,
        };

        let mut weight = 0;

        for (vote_root, votes) in latest_votes {
            if self.descends_from(*vote_root, ancestor_root, ancestor_slot) {
                weight += votes;
            }
        }

        weight
    }

    /// Walk `parent_root` links from `root` to decide whether `ancestor_root` is an ancestor.
    ///
    /// Votes for blocks that are not in the justified subtree simply never match and carry no
    /// weight.
    fn descends_from(&self, root: Hash256, ancestor_root: Hash256, ancestor_slot: Slot) -> bool {
        let mut current = root;

        loop {
            if current == ancestor_root {
                return true;
            }

            match self.blocks.get(&current) {
                Some(info) if info.slot > ancestor_slot => current = info.parent_root,
                _ => return false,
            }
        }
    }

    /// Drop every block that does not descend from the finalized root, along with votes for
    /// dropped blocks.
    pub fn prune(&mut self, finalized_root: Hash256) {
        let finalized_slot = match self.blocks.get(&finalized_root) {
            Some(info) => info.slot,
            None => return,
        };

        let retained: HashMap<Hash256, BlockInfo> = self
            .blocks
            .iter()
            .filter(|(root, _)| self.descends_from(**root, finalized_root, finalized_slot))
            .map(|(root, info)| (*root, *info))
            .collect();

        self.blocks = retained;

        // A retained parent only ever lists retained children, so pruning the keys suffices.
        let blocks = &self.blocks;
        self.children.retain(|parent, _| blocks.contains_key(parent));

        let blocks = &self.blocks;
        self.latest_messages
            .retain(|_, message| blocks.contains_key(&message.root));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis() -> Hash256 {
        Hash256::zero()
    }

    fn root(i: u8) -> Hash256 {
        Hash256::repeat_byte(i)
    }

    /// Build a fork choice over:
    ///
    /// ```ignore
    ///         genesis
    ///        /       \
    ///      0x01      0x02
    ///       |
    ///      0x03
    /// ```
    fn forked() -> ForkChoice {
        let mut fc = ForkChoice::new();
        fc.process_block(genesis(), Hash256::repeat_byte(0xff), Slot::new(0));
        fc.process_block(root(1), genesis(), Slot::new(1));
        fc.process_block(root(2), genesis(), Slot::new(1));
        fc.process_block(root(3), root(1), Slot::new(2));
        fc
    }

    #[test]
    fn missing_justified_block_is_an_error() {
        let fc = ForkChoice::new();
        assert_eq!(
            fc.find_head(genesis(), &[]),
            Err(Error::MissingJustifiedBlock(genesis()))
        );
    }

    #[test]
    fn tie_breaks_toward_the_smaller_root() {
        let mut fc = ForkChoice::new();
        fc.process_block(genesis(), Hash256::repeat_byte(0xff), Slot::new(0));
        // Insertion order must not matter: insert the larger root first.
        fc.process_block(root(2), genesis(), Slot::new(1));
        fc.process_block(root(1), genesis(), Slot::new(1));

        // Zero attestations for either child.
        let head = fc.find_head(genesis(), &[32, 32]).unwrap();
        assert_eq!(head, root(1));
    }

    #[test]
    fn votes_outweigh_the_tie_break() {
        let mut fc = forked();

        fc.process_attestation(0, root(2), Epoch::new(1));

        let head = fc.find_head(genesis(), &[32, 32, 32]).unwrap();
        assert_eq!(head, root(2));
    }

    #[test]
    fn votes_for_descendants_count_for_ancestors() {
        let mut fc = forked();

        // Two votes deep in the 0x01 subtree beat one for 0x02.
        fc.process_attestation(0, root(3), Epoch::new(1));
        fc.process_attestation(1, root(3), Epoch::new(1));
        fc.process_attestation(2, root(2), Epoch::new(1));

        let head = fc.find_head(genesis(), &[32, 32, 32]).unwrap();
        assert_eq!(head, root(3));
    }

    #[test]
    fn only_the_latest_vote_counts() {
        let mut fc = forked();

        fc.process_attestation(0, root(2), Epoch::new(1));
        // The same validator later votes for the other branch.
        fc.process_attestation(0, root(3), Epoch::new(2));

        let head = fc.find_head(genesis(), &[32]).unwrap();
        assert_eq!(head, root(3));

        // An older vote never replaces a newer one.
        fc.process_attestation(0, root(2), Epoch::new(1));
        assert_eq!(fc.find_head(genesis(), &[32]).unwrap(), root(3));
    }

    #[test]
    fn zero_balance_votes_carry_no_weight() {
        let mut fc = forked();

        fc.process_attestation(0, root(2), Epoch::new(1));

        // Validator 0 has no balance: the tie-break wins.
        let head = fc.find_head(genesis(), &[0, 32, 32]).unwrap();
        assert_eq!(head, root(3));
    }

    #[test]
    fn determinism() {
        let mut a = forked();
        let mut b = forked();

        for (i, block) in [root(2), root(3), root(1)].iter().enumerate() {
            a.process_attestation(i as u64, *block, Epoch::new(1));
            b.process_attestation(i as u64, *block, Epoch::new(1));
        }

        let balances = vec![32; 3];
        assert_eq!(
            a.find_head(genesis(), &balances).unwrap(),
            b.find_head(genesis(), &balances).unwrap()
        );
    }

    #[test]
    fn prune_discards_the_losing_branch() {
        let mut fc = forked();
        fc.process_attestation(0, root(2), Epoch::new(1));

        fc.prune(root(1));

        assert!(fc.contains_block(&root(1)));
        assert!(fc.contains_block(&root(3)));
        assert!(!fc.contains_block(&root(2)));
        assert!(!fc.contains_block(&genesis()));
        assert_eq!(fc.latest_message(0), None);

        assert_eq!(fc.find_head(root(1), &[32]).unwrap(), root(3));
    }
}
