//! The pure state transition functions of the beacon chain: slot processing, epoch processing
//! and block processing, plus genesis initialization.
//!
//! Every function here is a pure transformation from `(state, input)` to a new state or an
//! error; any validation failure leaves the caller's copy of the state behind and yields no
//! partial effects.

#[macro_use]
mod macros;

pub mod common;
pub mod genesis;
pub mod per_block_processing;
pub mod per_epoch_processing;
pub mod per_slot_processing;

pub use genesis::{initialize_beacon_state_from_eth1, process_activations};
pub use per_block_processing::{
    errors::BlockProcessingError, per_block_processing, process_eth1_data, process_operations,
    VerifySignatures,
};
pub use per_epoch_processing::{errors::EpochProcessingError, per_epoch_processing};
pub use per_slot_processing::{per_slot_processing, Error as SlotProcessingError};
