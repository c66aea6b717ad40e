use crate::Epoch;
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// Specifies a fork of the beacon chain.
///
/// Spec v0.12.1
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Fork {
    #[serde(with = "serde_utils::bytes_4_hex")]
    pub previous_version: [u8; 4],
    #[serde(with = "serde_utils::bytes_4_hex")]
    pub current_version: [u8; 4],
    pub epoch: Epoch,
}

impl Fork {
    /// Initialize the `Fork` from the genesis parameters in the `spec`.
    pub fn genesis(genesis_fork_version: [u8; 4]) -> Self {
        Self {
            previous_version: genesis_fork_version,
            current_version: genesis_fork_version,
            epoch: Epoch::new(0),
        }
    }

    /// Return the fork version of the given ``epoch``.
    pub fn get_fork_version(&self, epoch: Epoch) -> [u8; 4] {
        if epoch < self.epoch {
            return self.previous_version;
        }
        self.current_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    ssz_and_tree_hash_tests!(Fork);

    fn test_genesis(version: [u8; 4]) {
        let fork = Fork::genesis(version);

        assert_eq!(fork.previous_version, version);
        assert_eq!(fork.current_version, version);
        assert_eq!(fork.epoch, Epoch::new(0));
    }

    #[test]
    fn genesis() {
        test_genesis([0, 0, 0, 0]);
        test_genesis([9, 9, 9, 9]);
        test_genesis([2, 1, 2, 1]);
    }

    #[test]
    fn get_fork_version() {
        let previous_version = [1, 0, 0, 0];
        let current_version = [2, 0, 0, 0];
        let epoch = Epoch::new(10);

        let fork = Fork {
            previous_version,
            current_version,
            epoch,
        };

        assert_eq!(fork.get_fork_version(Epoch::new(0)), previous_version);
        assert_eq!(fork.get_fork_version(Epoch::new(9)), previous_version);
        assert_eq!(fork.get_fork_version(Epoch::new(10)), current_version);
        assert_eq!(fork.get_fork_version(Epoch::new(11)), current_version);
    }
}
