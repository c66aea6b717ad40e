use crate::{ChainSpec, Hash256, PublicKeyBytes, SecretKey, Signature, SignatureBytes};
use crate::signing_root::compute_signing_root;
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash::SignedRoot;
use tree_hash_derive::{SignedRoot, TreeHash};

/// The data supplied by the user to the deposit contract.
///
/// Spec v0.12.1
#[derive(
    Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash, SignedRoot,
)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
    #[signed_root(skip_hashing)]
    pub signature: SignatureBytes,
}

impl DepositData {
    /// Generate the proof-of-possession signature for this deposit.
    ///
    /// Deposits are valid across forks, so the signing domain is always derived from the genesis
    /// fork version.
    pub fn create_signature(&self, secret_key: &SecretKey, spec: &ChainSpec) -> SignatureBytes {
        let domain = spec.get_deposit_domain();
        let message = compute_signing_root(self.signed_root(), domain);

        SignatureBytes::from(secret_key.sign(message))
    }

    /// Verify the deposit's proof-of-possession signature.
    pub fn verify_signature(&self, spec: &ChainSpec) -> bool {
        let pubkey = match self.pubkey.decompress() {
            Ok(pubkey) => pubkey,
            Err(_) => return false,
        };
        let signature = match self.signature.decompress() {
            Ok(signature) => signature,
            Err(_) => return false,
        };

        let domain = spec.get_deposit_domain();
        let message = compute_signing_root(self.signed_root(), domain);

        signature.verify(&pubkey, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keypair;

    ssz_and_tree_hash_tests!(DepositData);

    #[test]
    fn signature_round_trip() {
        let spec = ChainSpec::minimal();
        let keypair = Keypair::random();

        let mut deposit = DepositData {
            pubkey: PublicKeyBytes::from(&keypair.pk),
            withdrawal_credentials: Hash256::repeat_byte(3),
            amount: 32_000_000_000,
            signature: SignatureBytes::empty(),
        };

        deposit.signature = deposit.create_signature(&keypair.sk, &spec);

        assert!(deposit.verify_signature(&spec));

        deposit.amount += 1;
        assert!(!deposit.verify_signature(&spec));
    }

    #[test]
    fn signed_root_ignores_signature() {
        let a = DepositData {
            pubkey: PublicKeyBytes::empty(),
            withdrawal_credentials: Hash256::zero(),
            amount: 1,
            signature: SignatureBytes::empty(),
        };
        let b = DepositData {
            signature: SignatureBytes::deserialize(&[0x99; 96]).unwrap(),
            ..a.clone()
        };

        assert_eq!(a.signed_root(), b.signed_root());
    }
}
