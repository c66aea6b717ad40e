//! The fork-choice rule: a latest-vote-weighted tree traversal that selects a canonical head
//! from the set of known blocks and the most recent attestation of each validator.
//!
//! The structure is self-contained: blocks are registered as `(root, parent, slot)` records and
//! attestations as `(validator, block root, target epoch)`, so `find_head` never has to read
//! the block store.

mod fork_choice;

pub use crate::fork_choice::{Error, ForkChoice, LatestMessage};
