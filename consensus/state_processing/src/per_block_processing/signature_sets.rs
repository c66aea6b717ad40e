//! Gathers the (signature, public keys, message) triples the block operations verify, so that
//! verification decisions are separated from the mutation of the state.

use types::{
    AggregateSignature, BeaconBlock, BeaconBlockHeader, BeaconState, BeaconStateError, ChainSpec,
    Domain, EthSpec, Hash256, IndexedAttestation, ProposerSlashing, PublicKey, Signature,
    SignedRoot, VoluntaryExit,
};
use tree_hash::TreeHash;
use types::signing_root::compute_signing_root;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// Signature verification was attempted for a validator that is not known to the state.
    ValidatorUnknown(u64),
    /// The public key bytes stored in the state could not be decompressed to a valid point.
    BadBlsBytes { validator_index: u64 },
    /// A state lookup failed while assembling the set.
    BeaconStateError(BeaconStateError),
}

impl From<BeaconStateError> for Error {
    fn from(e: BeaconStateError) -> Error {
        Error::BeaconStateError(e)
    }
}

type Result<T> = std::result::Result<T, Error>;

/// A (signature, public keys, message) triple awaiting verification.
pub enum SignatureSet {
    Single {
        signature: Signature,
        pubkey: PublicKey,
        message: Hash256,
    },
    Aggregate {
        signature: AggregateSignature,
        pubkeys: Vec<PublicKey>,
        message: Hash256,
    },
}

impl SignatureSet {
    pub fn single(signature: Signature, pubkey: PublicKey, message: Hash256) -> Self {
        SignatureSet::Single {
            signature,
            pubkey,
            message,
        }
    }

    pub fn aggregate(
        signature: AggregateSignature,
        pubkeys: Vec<PublicKey>,
        message: Hash256,
    ) -> Self {
        SignatureSet::Aggregate {
            signature,
            pubkeys,
            message,
        }
    }

    pub fn verify(&self) -> bool {
        match self {
            SignatureSet::Single {
                signature,
                pubkey,
                message,
            } => signature.verify(pubkey, *message),
            SignatureSet::Aggregate {
                signature,
                pubkeys,
                message,
            } => {
                let pubkey_refs = pubkeys.iter().collect::<Vec<_>>();
                signature.fast_aggregate_verify(*message, &pubkey_refs)
            }
        }
    }
}

/// Decompress the public key of the validator at `validator_index`.
pub fn get_pubkey_from_state<T: EthSpec>(
    state: &BeaconState<T>,
    validator_index: usize,
) -> Result<PublicKey> {
    state
        .validators
        .get(validator_index)
        .ok_or(Error::ValidatorUnknown(validator_index as u64))?
        .pubkey
        .decompress()
        .map_err(|_| Error::BadBlsBytes {
            validator_index: validator_index as u64,
        })
}

/// A signature set that is valid if a block was signed by the expected block producer.
pub fn block_proposal_signature_set<T: EthSpec>(
    state: &BeaconState<T>,
    proposer_index: usize,
    block: &BeaconBlock<T>,
    spec: &ChainSpec,
) -> Result<SignatureSet> {
    let domain = state.get_domain(
        block.slot.epoch(T::slots_per_epoch()),
        Domain::BeaconProposer,
        spec,
    );
    let message = compute_signing_root(block.signed_root(), domain);

    Ok(SignatureSet::single(
        block.signature.clone(),
        get_pubkey_from_state(state, proposer_index)?,
        message,
    ))
}

/// A signature set that is valid if the block proposers have signed the header in a proposer
/// slashing.
pub fn proposer_slashing_signature_set<T: EthSpec>(
    state: &BeaconState<T>,
    proposer_slashing: &ProposerSlashing,
    header: &BeaconBlockHeader,
    spec: &ChainSpec,
) -> Result<SignatureSet> {
    let domain = state.get_domain(
        header.slot.epoch(T::slots_per_epoch()),
        Domain::BeaconProposer,
        spec,
    );
    let message = compute_signing_root(header.signed_root(), domain);

    Ok(SignatureSet::single(
        header.signature.clone(),
        get_pubkey_from_state(state, proposer_slashing.proposer_index as usize)?,
        message,
    ))
}

/// A signature set that is valid if the block proposer signed the RANDAO reveal over the epoch
/// of the block's slot.
pub fn randao_signature_set<T: EthSpec>(
    state: &BeaconState<T>,
    proposer_index: usize,
    randao_reveal: &Signature,
    spec: &ChainSpec,
) -> Result<SignatureSet> {
    let epoch = state.current_epoch();
    let domain = state.get_domain(epoch, Domain::Randao, spec);
    let message = compute_signing_root(epoch.tree_hash_root(), domain);

    Ok(SignatureSet::single(
        randao_reveal.clone(),
        get_pubkey_from_state(state, proposer_index)?,
        message,
    ))
}

/// A signature set that is valid if all attesting validators signed the attestation data.
pub fn indexed_attestation_signature_set<T: EthSpec>(
    state: &BeaconState<T>,
    indexed_attestation: &IndexedAttestation<T>,
    spec: &ChainSpec,
) -> Result<SignatureSet> {
    let mut pubkeys = Vec::with_capacity(indexed_attestation.attesting_indices.len());
    for &validator_index in indexed_attestation.attesting_indices.iter() {
        pubkeys.push(get_pubkey_from_state(state, validator_index as usize)?);
    }

    let domain = state.get_domain(
        indexed_attestation.data.target.epoch,
        Domain::BeaconAttester,
        spec,
    );
    let message = compute_signing_root(indexed_attestation.data.tree_hash_root(), domain);

    Ok(SignatureSet::aggregate(
        indexed_attestation.signature.clone(),
        pubkeys,
        message,
    ))
}

/// A signature set that is valid if the `VoluntaryExit` was signed by the indicated validator.
pub fn exit_signature_set<T: EthSpec>(
    state: &BeaconState<T>,
    exit: &VoluntaryExit,
    spec: &ChainSpec,
) -> Result<SignatureSet> {
    let domain = state.get_domain(exit.epoch, Domain::VoluntaryExit, spec);
    let message = compute_signing_root(exit.signed_root(), domain);

    Ok(SignatureSet::single(
        exit.signature.clone(),
        get_pubkey_from_state(state, exit.validator_index as usize)?,
        message,
    ))
}
