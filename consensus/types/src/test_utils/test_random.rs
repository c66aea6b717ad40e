use crate::*;
use rand::RngCore;
use ssz_types::typenum::Unsigned;

/// Produces a pseudo-random instance of a type, for round-trip and property tests.
///
/// Randomness is structural only: signatures are empty points and pubkeys are arbitrary bytes,
/// since codec tests never verify them.
pub trait TestRandom {
    fn random_for_test(rng: &mut impl RngCore) -> Self;
}

impl TestRandom for bool {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        (u64::random_for_test(rng) % 2) == 1
    }
}

impl TestRandom for u64 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u64()
    }
}

impl TestRandom for u32 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u32()
    }
}

impl TestRandom for u8 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u32() as u8
    }
}

impl TestRandom for usize {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u32() as usize
    }
}

impl TestRandom for [u8; 4] {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 4];
        rng.fill_bytes(&mut bytes);
        bytes
    }
}

impl TestRandom for Hash256 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 32];
        rng.fill_bytes(&mut bytes);
        Hash256::from_slice(&bytes)
    }
}

impl TestRandom for PublicKeyBytes {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 48];
        rng.fill_bytes(&mut bytes);
        PublicKeyBytes::deserialize(&bytes).expect("48 bytes are always a valid container")
    }
}

impl TestRandom for SignatureBytes {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 96];
        rng.fill_bytes(&mut bytes);
        SignatureBytes::deserialize(&bytes).expect("96 bytes are always a valid container")
    }
}

impl TestRandom for Signature {
    fn random_for_test(_rng: &mut impl RngCore) -> Self {
        Signature::empty()
    }
}

impl TestRandom for AggregateSignature {
    fn random_for_test(_rng: &mut impl RngCore) -> Self {
        AggregateSignature::empty()
    }
}

impl<T: TestRandom, N: Unsigned> TestRandom for VariableList<T, N> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let len = std::cmp::min(N::to_usize(), 4);
        let vec = (0..len).map(|_| T::random_for_test(rng)).collect();
        VariableList::new(vec).expect("length is bounded by N")
    }
}

impl<T: TestRandom + Default, N: Unsigned> TestRandom for FixedVector<T, N> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let vec = (0..N::to_usize()).map(|_| T::random_for_test(rng)).collect();
        FixedVector::new(vec).expect("length equals N")
    }
}

impl<N: Unsigned + Clone> TestRandom for BitList<N> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let len = std::cmp::min(N::to_usize(), 16);
        let mut bitfield = BitList::with_capacity(len).expect("length is bounded by N");
        for i in 0..len {
            bitfield.set(i, bool::random_for_test(rng)).expect("in bounds");
        }
        bitfield
    }
}

impl<N: Unsigned + Clone> TestRandom for BitVector<N> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bitfield = BitVector::new();
        for i in 0..N::to_usize() {
            bitfield.set(i, bool::random_for_test(rng)).expect("in bounds");
        }
        bitfield
    }
}

impl TestRandom for Fork {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            previous_version: <[u8; 4]>::random_for_test(rng),
            current_version: <[u8; 4]>::random_for_test(rng),
            epoch: Epoch::random_for_test(rng),
        }
    }
}

impl TestRandom for Checkpoint {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            epoch: Epoch::random_for_test(rng),
            root: Hash256::random_for_test(rng),
        }
    }
}

impl TestRandom for Eth1Data {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            deposit_root: Hash256::random_for_test(rng),
            deposit_count: u64::random_for_test(rng),
            block_hash: Hash256::random_for_test(rng),
        }
    }
}

impl TestRandom for Validator {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            pubkey: PublicKeyBytes::random_for_test(rng),
            withdrawal_credentials: Hash256::random_for_test(rng),
            effective_balance: u64::random_for_test(rng),
            slashed: bool::random_for_test(rng),
            activation_eligibility_epoch: Epoch::random_for_test(rng),
            activation_epoch: Epoch::random_for_test(rng),
            exit_epoch: Epoch::random_for_test(rng),
            withdrawable_epoch: Epoch::random_for_test(rng),
        }
    }
}

impl TestRandom for AttestationData {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: Slot::random_for_test(rng),
            index: u64::random_for_test(rng),
            beacon_block_root: Hash256::random_for_test(rng),
            source: Checkpoint::random_for_test(rng),
            target: Checkpoint::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for Attestation<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            aggregation_bits: BitList::random_for_test(rng),
            data: AttestationData::random_for_test(rng),
            signature: AggregateSignature::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for PendingAttestation<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            aggregation_bits: BitList::random_for_test(rng),
            data: AttestationData::random_for_test(rng),
            inclusion_delay: u64::random_for_test(rng),
            proposer_index: u64::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for IndexedAttestation<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            attesting_indices: VariableList::random_for_test(rng),
            data: AttestationData::random_for_test(rng),
            signature: AggregateSignature::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for AttesterSlashing<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            attestation_1: IndexedAttestation::random_for_test(rng),
            attestation_2: IndexedAttestation::random_for_test(rng),
        }
    }
}

impl TestRandom for BeaconBlockHeader {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: Slot::random_for_test(rng),
            parent_root: Hash256::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            body_root: Hash256::random_for_test(rng),
            signature: Signature::random_for_test(rng),
        }
    }
}

impl TestRandom for ProposerSlashing {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            proposer_index: u64::random_for_test(rng),
            header_1: BeaconBlockHeader::random_for_test(rng),
            header_2: BeaconBlockHeader::random_for_test(rng),
        }
    }
}

impl TestRandom for VoluntaryExit {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            epoch: Epoch::random_for_test(rng),
            validator_index: u64::random_for_test(rng),
            signature: Signature::random_for_test(rng),
        }
    }
}

impl TestRandom for DepositData {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            pubkey: PublicKeyBytes::random_for_test(rng),
            withdrawal_credentials: Hash256::random_for_test(rng),
            amount: u64::random_for_test(rng),
            signature: SignatureBytes::random_for_test(rng),
        }
    }
}

impl TestRandom for Deposit {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            proof: FixedVector::random_for_test(rng),
            data: DepositData::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for BeaconBlockBody<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            randao_reveal: Signature::random_for_test(rng),
            eth1_data: Eth1Data::random_for_test(rng),
            graffiti: Hash256::random_for_test(rng),
            proposer_slashings: VariableList::random_for_test(rng),
            attester_slashings: VariableList::random_for_test(rng),
            attestations: VariableList::random_for_test(rng),
            deposits: VariableList::random_for_test(rng),
            voluntary_exits: VariableList::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for BeaconBlock<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: Slot::random_for_test(rng),
            parent_root: Hash256::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            body: BeaconBlockBody::random_for_test(rng),
            signature: Signature::random_for_test(rng),
        }
    }
}

impl<T: EthSpec> TestRandom for HistoricalBatch<T> {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            block_roots: FixedVector::random_for_test(rng),
            state_roots: FixedVector::random_for_test(rng),
        }
    }
}
