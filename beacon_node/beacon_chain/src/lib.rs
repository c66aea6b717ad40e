//! The orchestration around the pure state transition core: a single-threaded pipeline that
//! consumes an ordered stream of blocks, attestations and clock ticks, maintains the canonical
//! head via fork choice, and publishes observed-state snapshots to subscribers.

#[macro_use]
extern crate lazy_static;

mod attestation_pool;
mod beacon_chain;
mod errors;
mod message;
mod metrics;

pub use crate::beacon_chain::{
    AttestationProcessingOutcome, BeaconChain, BlockProcessingOutcome, BlockState, CanonicalHead,
    ObservedState,
};
pub use attestation_pool::AttestationPool;
pub use errors::BeaconChainError;
pub use message::{run, ExitReason, Message};
