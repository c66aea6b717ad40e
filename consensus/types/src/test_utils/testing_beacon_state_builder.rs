use super::generate_deterministic_keypairs;
use crate::*;

/// The eth1 block hash used for all testing genesis states.
pub const DEFAULT_ETH1_BLOCK_HASH: &[u8; 32] = &[0x42; 32];

/// Builds a genesis beacon state with a set of deterministic validators that are active from the
/// genesis epoch.
///
/// Deposit processing is bypassed: validator records are written directly into the registry,
/// which is sufficient (and much faster) for transition and pipeline tests.
pub struct TestingBeaconStateBuilder<T: EthSpec> {
    state: BeaconState<T>,
    keypairs: Vec<Keypair>,
}

impl<T: EthSpec> TestingBeaconStateBuilder<T> {
    /// Instantiate the builder with `validator_count` deterministic keypairs.
    pub fn new(validator_count: usize, spec: &ChainSpec) -> Self {
        Self::from_keypairs(generate_deterministic_keypairs(validator_count), spec)
    }

    /// Instantiate the builder from existing keypairs.
    pub fn from_keypairs(keypairs: Vec<Keypair>, spec: &ChainSpec) -> Self {
        let genesis_time = 0;

        let eth1_data = Eth1Data {
            deposit_root: Hash256::zero(),
            deposit_count: keypairs.len() as u64,
            block_hash: Hash256::from_slice(DEFAULT_ETH1_BLOCK_HASH),
        };

        let mut state = BeaconState::new(genesis_time, eth1_data, spec);

        // The validators below are installed directly, so the deposits backing them count as
        // already processed.
        state.eth1_deposit_index = keypairs.len() as u64;

        for keypair in &keypairs {
            let pubkey = PublicKeyBytes::from(&keypair.pk);

            let mut withdrawal_credentials = Hash256::from_slice(&eth2_hashing::hash(
                &pubkey.serialize()[..],
            ));
            withdrawal_credentials.as_bytes_mut()[0] = spec.bls_withdrawal_prefix_byte;

            state
                .validators
                .push(Validator {
                    pubkey,
                    withdrawal_credentials,
                    effective_balance: spec.max_effective_balance,
                    slashed: false,
                    activation_eligibility_epoch: T::genesis_epoch(),
                    activation_epoch: T::genesis_epoch(),
                    exit_epoch: spec.far_future_epoch,
                    withdrawable_epoch: spec.far_future_epoch,
                })
                .expect("validator count is below the registry limit");
            state
                .balances
                .push(spec.max_effective_balance)
                .expect("validator count is below the registry limit");
        }

        // Seed the RANDAO ring with the eth1 block hash, as genesis initialisation does.
        state.randao_mixes = FixedVector::from(vec![
            Hash256::from_slice(DEFAULT_ETH1_BLOCK_HASH);
            T::EpochsPerHistoricalVector::to_usize()
        ]);

        Self { state, keypairs }
    }

    /// Consumes the builder, returning the state and the keypairs backing its validators.
    pub fn build(self) -> (BeaconState<T>, Vec<Keypair>) {
        (self.state, self.keypairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MinimalEthSpec;

    #[test]
    fn builds_an_active_genesis_state() {
        let spec = MinimalEthSpec::default_spec();
        let (state, keypairs) = TestingBeaconStateBuilder::<MinimalEthSpec>::new(16, &spec).build();

        assert_eq!(state.validators.len(), 16);
        assert_eq!(state.balances.len(), 16);
        assert_eq!(keypairs.len(), 16);
        assert_eq!(
            state.get_active_validator_indices(state.current_epoch()).len(),
            16
        );
        assert_eq!(state.slot, Slot::new(0));
    }
}
