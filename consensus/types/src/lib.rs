//! Types used by the beacon chain consensus core.
//!
//! The containers here mirror the phase 0 data model: blocks and headers carry their signature as
//! the trailing field, and every container is SSZ encodable and Merkle hashable.

#[macro_use]
mod slot_epoch_macros;

#[macro_use]
pub mod test_utils;

pub mod attestation;
pub mod attestation_data;
pub mod attester_slashing;
pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_block_header;
pub mod beacon_committee;
pub mod beacon_state;
pub mod chain_spec;
pub mod checkpoint;
pub mod deposit;
pub mod deposit_data;
pub mod eth1_data;
pub mod eth_spec;
pub mod fork;
pub mod historical_batch;
pub mod indexed_attestation;
pub mod pending_attestation;
pub mod proposer_slashing;
pub mod relative_epoch;
pub mod signing_root;
pub mod slot_epoch;
pub mod validator;
pub mod voluntary_exit;

pub use crate::attestation::Attestation;
pub use crate::attestation_data::AttestationData;
pub use crate::attester_slashing::AttesterSlashing;
pub use crate::beacon_block::BeaconBlock;
pub use crate::beacon_block_body::BeaconBlockBody;
pub use crate::beacon_block_header::BeaconBlockHeader;
pub use crate::beacon_committee::BeaconCommittee;
pub use crate::beacon_state::{BeaconState, BeaconTreeHashCache, CommitteeCache, Error as BeaconStateError};
pub use crate::chain_spec::{ChainSpec, Domain, StandardConfig};
pub use crate::checkpoint::Checkpoint;
pub use crate::deposit::{Deposit, DEPOSIT_TREE_DEPTH};
pub use crate::deposit_data::DepositData;
pub use crate::eth1_data::Eth1Data;
pub use crate::eth_spec::{EthSpec, MainnetEthSpec, MinimalEthSpec};
pub use crate::fork::Fork;
pub use crate::historical_batch::HistoricalBatch;
pub use crate::indexed_attestation::IndexedAttestation;
pub use crate::pending_attestation::PendingAttestation;
pub use crate::proposer_slashing::ProposerSlashing;
pub use crate::relative_epoch::{Error as RelativeEpochError, RelativeEpoch};
pub use crate::signing_root::compute_signing_root;
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::validator::Validator;
pub use crate::voluntary_exit::VoluntaryExit;

pub type Hash256 = ethereum_types::H256;

pub use bls::{
    AggregatePublicKey, AggregateSignature, Keypair, PublicKey, PublicKeyBytes, SecretKey,
    Signature, SignatureBytes,
};
pub use ssz_types::{typenum, typenum::Unsigned, BitList, BitVector, FixedVector, VariableList};
pub use tree_hash::SignedRoot;
