use crate::{Epoch, Fork, Slot};
use serde_derive::{Deserialize, Serialize};

/// Each of the BLS signature domains.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Domain {
    BeaconProposer,
    BeaconAttester,
    Randao,
    Deposit,
    VoluntaryExit,
}

/// Holds all the "constants" for a beacon chain network.
///
/// The length of every list/vector in the state is fixed at the type-level by `EthSpec`;
/// everything else a network may vary is here. Values default to the "mainnet" specification.
#[derive(PartialEq, Debug, Clone)]
pub struct ChainSpec {
    /*
     * Constants
     */
    pub genesis_slot: Slot,
    pub genesis_epoch: Epoch,
    pub far_future_epoch: Epoch,
    pub base_rewards_per_epoch: u64,
    pub deposit_contract_tree_depth: u64,

    /*
     * Misc
     */
    pub max_committees_per_slot: usize,
    pub target_committee_size: usize,
    pub min_per_epoch_churn_limit: u64,
    pub churn_limit_quotient: u64,
    pub shuffle_round_count: u8,

    /*
     * Gwei values
     */
    pub min_deposit_amount: u64,
    pub max_effective_balance: u64,
    pub ejection_balance: u64,
    pub effective_balance_increment: u64,

    /*
     * Initial values
     */
    pub genesis_fork_version: [u8; 4],
    pub bls_withdrawal_prefix_byte: u8,

    /*
     * Time parameters
     */
    pub seconds_per_slot: u64,
    pub min_attestation_inclusion_delay: u64,
    pub min_seed_lookahead: Epoch,
    pub max_seed_lookahead: Epoch,
    pub min_epochs_to_inactivity_penalty: u64,
    pub min_validator_withdrawability_delay: Epoch,
    pub shard_committee_period: u64,

    /*
     * Reward and penalty quotients
     */
    pub base_reward_factor: u64,
    pub whistleblower_reward_quotient: u64,
    pub proposer_reward_quotient: u64,
    pub inactivity_penalty_quotient: u64,
    pub min_slashing_penalty_quotient: u64,

    /*
     * Signature domains
     */
    pub domain_beacon_proposer: u32,
    pub domain_beacon_attester: u32,
    pub domain_randao: u32,
    pub domain_deposit: u32,
    pub domain_voluntary_exit: u32,

    /*
     * Spec options
     */
    pub bls_verify: bool,
    pub bls_verify_proof_of_possession: bool,
    pub incremental_hasher: bool,
    pub cache_size_entries: usize,
}

impl ChainSpec {
    /// Get the domain number, unmodified by the fork.
    ///
    /// Spec v0.12.1
    pub fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::BeaconAttester => self.domain_beacon_attester,
            Domain::Randao => self.domain_randao,
            Domain::Deposit => self.domain_deposit,
            Domain::VoluntaryExit => self.domain_voluntary_exit,
        }
    }

    /// Get the domain that represents the fork meta and signature domain.
    ///
    /// The domain is eight bytes: the four-byte domain tag followed by the four-byte fork version
    /// active at `epoch`, interpreted little-endian.
    pub fn get_domain(&self, epoch: Epoch, domain: Domain, fork: &Fork) -> u64 {
        let fork_version = fork.get_fork_version(epoch);
        self.compute_domain(domain, fork_version)
    }

    /// Get the domain for a deposit signature: deposits are valid across forks, so they are
    /// always bound to the genesis fork version.
    pub fn get_deposit_domain(&self) -> u64 {
        self.compute_domain(Domain::Deposit, self.genesis_fork_version)
    }

    /// Returns the epoch at which an activation or exit initiated in `epoch` takes effect.
    ///
    /// Spec v0.12.1
    pub fn compute_activation_exit_epoch(
        &self,
        epoch: Epoch,
    ) -> Result<Epoch, safe_arith::ArithError> {
        use safe_arith::SafeArith;
        epoch.safe_add(1)?.safe_add(self.max_seed_lookahead)
    }

    /// Compute a domain by applying the given `fork_version`.
    pub fn compute_domain(&self, domain: Domain, fork_version: [u8; 4]) -> u64 {
        let domain_constant = self.get_domain_constant(domain);

        let mut bytes: Vec<u8> = domain_constant.to_le_bytes().to_vec();
        bytes.append(&mut fork_version.to_vec());

        let mut fork_and_domain = [0; 8];
        fork_and_domain.copy_from_slice(&bytes);

        u64::from_le_bytes(fork_and_domain)
    }

    /// Returns a `ChainSpec` compatible with the Ethereum Foundation mainnet specification.
    pub fn mainnet() -> Self {
        Self {
            /*
             * Constants
             */
            genesis_slot: Slot::new(0),
            genesis_epoch: Epoch::new(0),
            far_future_epoch: Epoch::max_value(),
            base_rewards_per_epoch: 4,
            deposit_contract_tree_depth: 32,

            /*
             * Misc
             */
            max_committees_per_slot: 64,
            target_committee_size: 128,
            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65_536,
            shuffle_round_count: 90,

            /*
             * Gwei values
             */
            min_deposit_amount: 1_000_000_000,
            max_effective_balance: 32_000_000_000,
            ejection_balance: 16_000_000_000,
            effective_balance_increment: 1_000_000_000,

            /*
             * Initial values
             */
            genesis_fork_version: [0; 4],
            bls_withdrawal_prefix_byte: 0,

            /*
             * Time parameters
             */
            seconds_per_slot: 12,
            min_attestation_inclusion_delay: 1,
            min_seed_lookahead: Epoch::new(1),
            max_seed_lookahead: Epoch::new(4),
            min_epochs_to_inactivity_penalty: 4,
            min_validator_withdrawability_delay: Epoch::new(256),
            shard_committee_period: 2_048,

            /*
             * Reward and penalty quotients
             */
            base_reward_factor: 64,
            whistleblower_reward_quotient: 512,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: 16_777_216,
            min_slashing_penalty_quotient: 32,

            /*
             * Signature domains
             */
            domain_beacon_proposer: 0,
            domain_beacon_attester: 1,
            domain_randao: 2,
            domain_deposit: 3,
            domain_voluntary_exit: 4,

            /*
             * Spec options
             */
            bls_verify: true,
            bls_verify_proof_of_possession: true,
            incremental_hasher: true,
            cache_size_entries: 64,
        }
    }

    /// Returns a `ChainSpec` compatible with the minimal specification, primarily for testing.
    pub fn minimal() -> Self {
        Self {
            max_committees_per_slot: 4,
            target_committee_size: 4,
            churn_limit_quotient: 32,
            shuffle_round_count: 10,
            seconds_per_slot: 6,
            min_validator_withdrawability_delay: Epoch::new(256),
            shard_committee_period: 64,
            ..ChainSpec::mainnet()
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// A flat, serde-friendly mirror of `ChainSpec`, so that any constant (and any spec option) can
/// be overridden from a YAML file.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "UPPERCASE")]
pub struct StandardConfig {
    #[serde(with = "serde_utils::quoted_u64")]
    pub genesis_slot: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub genesis_epoch: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub base_rewards_per_epoch: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub deposit_contract_tree_depth: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub max_committees_per_slot: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub target_committee_size: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_per_epoch_churn_limit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub churn_limit_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub shuffle_round_count: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_deposit_amount: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub max_effective_balance: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub ejection_balance: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub effective_balance_increment: u64,
    #[serde(with = "serde_utils::bytes_4_hex")]
    pub genesis_fork_version: [u8; 4],
    #[serde(with = "serde_utils::quoted_u64")]
    pub seconds_per_slot: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_attestation_inclusion_delay: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_seed_lookahead: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub max_seed_lookahead: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_epochs_to_inactivity_penalty: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_validator_withdrawability_delay: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub shard_committee_period: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub base_reward_factor: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub whistleblower_reward_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub proposer_reward_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub inactivity_penalty_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub min_slashing_penalty_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub domain_beacon_proposer: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub domain_beacon_attester: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub domain_randao: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub domain_deposit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub domain_voluntary_exit: u64,
    pub bls_verify: bool,
    pub bls_verify_proof_of_possession: bool,
    pub incremental_hasher: bool,
    #[serde(with = "serde_utils::quoted_u64")]
    pub cache_size_entries: u64,
}

impl Default for StandardConfig {
    fn default() -> Self {
        Self::from_chain_spec(&ChainSpec::mainnet())
    }
}

impl StandardConfig {
    pub fn from_chain_spec(spec: &ChainSpec) -> Self {
        Self {
            genesis_slot: spec.genesis_slot.as_u64(),
            genesis_epoch: spec.genesis_epoch.as_u64(),
            base_rewards_per_epoch: spec.base_rewards_per_epoch,
            deposit_contract_tree_depth: spec.deposit_contract_tree_depth,
            max_committees_per_slot: spec.max_committees_per_slot as u64,
            target_committee_size: spec.target_committee_size as u64,
            min_per_epoch_churn_limit: spec.min_per_epoch_churn_limit,
            churn_limit_quotient: spec.churn_limit_quotient,
            shuffle_round_count: spec.shuffle_round_count as u64,
            min_deposit_amount: spec.min_deposit_amount,
            max_effective_balance: spec.max_effective_balance,
            ejection_balance: spec.ejection_balance,
            effective_balance_increment: spec.effective_balance_increment,
            genesis_fork_version: spec.genesis_fork_version,
            seconds_per_slot: spec.seconds_per_slot,
            min_attestation_inclusion_delay: spec.min_attestation_inclusion_delay,
            min_seed_lookahead: spec.min_seed_lookahead.as_u64(),
            max_seed_lookahead: spec.max_seed_lookahead.as_u64(),
            min_epochs_to_inactivity_penalty: spec.min_epochs_to_inactivity_penalty,
            min_validator_withdrawability_delay: spec.min_validator_withdrawability_delay.as_u64(),
            shard_committee_period: spec.shard_committee_period,
            base_reward_factor: spec.base_reward_factor,
            whistleblower_reward_quotient: spec.whistleblower_reward_quotient,
            proposer_reward_quotient: spec.proposer_reward_quotient,
            inactivity_penalty_quotient: spec.inactivity_penalty_quotient,
            min_slashing_penalty_quotient: spec.min_slashing_penalty_quotient,
            domain_beacon_proposer: spec.domain_beacon_proposer as u64,
            domain_beacon_attester: spec.domain_beacon_attester as u64,
            domain_randao: spec.domain_randao as u64,
            domain_deposit: spec.domain_deposit as u64,
            domain_voluntary_exit: spec.domain_voluntary_exit as u64,
            bls_verify: spec.bls_verify,
            bls_verify_proof_of_possession: spec.bls_verify_proof_of_possession,
            incremental_hasher: spec.incremental_hasher,
            cache_size_entries: spec.cache_size_entries as u64,
        }
    }

    /// Apply every value in `self` over `spec`.
    pub fn apply_to_chain_spec(&self, spec: &ChainSpec) -> ChainSpec {
        ChainSpec {
            genesis_slot: Slot::new(self.genesis_slot),
            genesis_epoch: Epoch::new(self.genesis_epoch),
            base_rewards_per_epoch: self.base_rewards_per_epoch,
            deposit_contract_tree_depth: self.deposit_contract_tree_depth,
            max_committees_per_slot: self.max_committees_per_slot as usize,
            target_committee_size: self.target_committee_size as usize,
            min_per_epoch_churn_limit: self.min_per_epoch_churn_limit,
            churn_limit_quotient: self.churn_limit_quotient,
            shuffle_round_count: self.shuffle_round_count as u8,
            min_deposit_amount: self.min_deposit_amount,
            max_effective_balance: self.max_effective_balance,
            ejection_balance: self.ejection_balance,
            effective_balance_increment: self.effective_balance_increment,
            genesis_fork_version: self.genesis_fork_version,
            seconds_per_slot: self.seconds_per_slot,
            min_attestation_inclusion_delay: self.min_attestation_inclusion_delay,
            min_seed_lookahead: Epoch::new(self.min_seed_lookahead),
            max_seed_lookahead: Epoch::new(self.max_seed_lookahead),
            min_epochs_to_inactivity_penalty: self.min_epochs_to_inactivity_penalty,
            min_validator_withdrawability_delay: Epoch::new(
                self.min_validator_withdrawability_delay,
            ),
            shard_committee_period: self.shard_committee_period,
            base_reward_factor: self.base_reward_factor,
            whistleblower_reward_quotient: self.whistleblower_reward_quotient,
            proposer_reward_quotient: self.proposer_reward_quotient,
            inactivity_penalty_quotient: self.inactivity_penalty_quotient,
            min_slashing_penalty_quotient: self.min_slashing_penalty_quotient,
            domain_beacon_proposer: self.domain_beacon_proposer as u32,
            domain_beacon_attester: self.domain_beacon_attester as u32,
            domain_randao: self.domain_randao as u32,
            domain_deposit: self.domain_deposit as u32,
            domain_voluntary_exit: self.domain_voluntary_exit as u32,
            bls_verify: self.bls_verify,
            bls_verify_proof_of_possession: self.bls_verify_proof_of_possession,
            incremental_hasher: self.incremental_hasher,
            cache_size_entries: self.cache_size_entries as usize,
            ..spec.clone()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_spec_can_be_constructed() {
        let _ = ChainSpec::mainnet();
        let _ = ChainSpec::minimal();
    }

    fn test_domain(domain_type: Domain, raw_domain: u32, spec: &ChainSpec) {
        let fork = Fork::genesis(spec.genesis_fork_version);
        let epoch = Epoch::new(0);

        let domain = spec.get_domain(epoch, domain_type, &fork);

        let mut expected = raw_domain.to_le_bytes().to_vec();
        expected.append(&mut fork.get_fork_version(epoch).to_vec());

        assert_eq!(domain.to_le_bytes().to_vec(), expected);
    }

    #[test]
    fn test_get_domain() {
        let spec = ChainSpec::mainnet();

        test_domain(Domain::BeaconProposer, spec.domain_beacon_proposer, &spec);
        test_domain(Domain::BeaconAttester, spec.domain_beacon_attester, &spec);
        test_domain(Domain::Randao, spec.domain_randao, &spec);
        test_domain(Domain::Deposit, spec.domain_deposit, &spec);
        test_domain(Domain::VoluntaryExit, spec.domain_voluntary_exit, &spec);
    }

    #[test]
    fn yaml_round_trip_is_lossless() {
        let spec = ChainSpec::minimal();
        let config = StandardConfig::from_chain_spec(&spec);

        let yaml = config.to_yaml().unwrap();
        let from_yaml = StandardConfig::from_yaml(&yaml).unwrap();

        assert_eq!(config, from_yaml);
        assert_eq!(from_yaml.apply_to_chain_spec(&ChainSpec::mainnet()), spec);
    }

    #[test]
    fn partial_yaml_overrides_one_value() {
        let config = StandardConfig::from_yaml("SECONDS_PER_SLOT: 3").unwrap();
        let spec = config.apply_to_chain_spec(&ChainSpec::mainnet());

        assert_eq!(spec.seconds_per_slot, 3);
        assert_eq!(spec.target_committee_size, 128);
    }
}
