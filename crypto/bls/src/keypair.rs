use crate::{PublicKey, SecretKey};
use std::fmt;

/// A BLS keypair.
#[derive(Clone)]
pub struct Keypair {
    pub pk: PublicKey,
    pub sk: SecretKey,
}

impl Keypair {
    /// Instantiate a keypair from an existing secret key.
    pub fn from_components(pk: PublicKey, sk: SecretKey) -> Self {
        Self { pk, sk }
    }

    /// Generate a new keypair from the system RNG.
    pub fn random() -> Self {
        let sk = SecretKey::random();
        let pk = sk.public_key();
        Self { pk, sk }
    }
}

impl From<SecretKey> for Keypair {
    fn from(sk: SecretKey) -> Self {
        let pk = sk.public_key();
        Self { pk, sk }
    }
}

impl fmt::Debug for Keypair {
    /// Omits the secret key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair").field("pk", &self.pk).finish()
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.pk == other.pk
    }
}
