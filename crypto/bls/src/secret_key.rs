use crate::{Error, PublicKey, Signature, DST};
use ethereum_types::H256 as Hash256;
use rand::RngCore;

/// The byte-size of a BLS secret key.
pub const SECRET_KEY_BYTES_LEN: usize = 32;

/// A BLS secret key.
///
/// Care is taken to avoid implementing `Debug`, `Serialize` or SSZ encoding so key material
/// cannot leak into logs or wire messages by accident.
#[derive(Clone)]
pub struct SecretKey {
    point: blst::min_pk::SecretKey,
}

impl SecretKey {
    /// Generate a new key from the system RNG.
    pub fn random() -> Self {
        let mut ikm = [0; SECRET_KEY_BYTES_LEN];
        rand::thread_rng().fill_bytes(&mut ikm);

        Self {
            point: blst::min_pk::SecretKey::key_gen(&ikm, &[])
                .expect("key_gen only fails with ikm shorter than 32 bytes"),
        }
    }

    /// Derive a key from 32 bytes of input key material, per the EIP-2333 `KeyGen` procedure.
    pub fn key_gen(ikm: &[u8]) -> Result<Self, Error> {
        let point = blst::min_pk::SecretKey::key_gen(ikm, &[])?;
        Ok(Self { point })
    }

    /// Returns the public key that corresponds to this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(self.point.sk_to_pk())
    }

    /// Sign `msg` with the domain separation tag fixed by this crate.
    pub fn sign(&self, msg: Hash256) -> Signature {
        Signature::from_point(self.point.sign(msg.as_bytes(), DST, &[]))
    }

    pub fn serialize(&self) -> [u8; SECRET_KEY_BYTES_LEN] {
        self.point.to_bytes()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SECRET_KEY_BYTES_LEN {
            Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SECRET_KEY_BYTES_LEN,
            })
        } else {
            let point = blst::min_pk::SecretKey::from_bytes(bytes)?;
            Ok(Self { point })
        }
    }
}
