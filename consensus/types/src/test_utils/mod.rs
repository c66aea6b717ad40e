//! Tooling shared by the test suites of this crate and its consumers: deterministic randomness
//! for containers, deterministic keypairs, and a genesis-state builder.

#[macro_use]
mod macros;
mod test_random;
mod testing_beacon_state_builder;

pub use rand::rngs::StdRng;
pub use rand::{RngCore, SeedableRng};
pub use test_random::TestRandom;
pub use testing_beacon_state_builder::TestingBeaconStateBuilder;

use bls::{Keypair, SecretKey};

/// Generate `validator_count` keypairs derived deterministically from the validator index.
///
/// The same index always yields the same keypair.
pub fn generate_deterministic_keypairs(validator_count: usize) -> Vec<Keypair> {
    (0..validator_count)
        .map(generate_deterministic_keypair)
        .collect()
}

/// Generates a single deterministic keypair, where the secret key is derived from
/// `validator_index`.
pub fn generate_deterministic_keypair(validator_index: usize) -> Keypair {
    let mut ikm = [0; 32];
    ikm[0..8].copy_from_slice(&(validator_index as u64 + 1).to_le_bytes());

    let sk = SecretKey::key_gen(&ikm).expect("32 bytes of ikm is always sufficient");
    Keypair::from(sk)
}
