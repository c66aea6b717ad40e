use crate::{Error, PublicKey, PUBLIC_KEY_BYTES_LEN};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The compressed bytes of a BLS public key, without any validity guarantee.
///
/// This is the form in which public keys are carried inside `Validator` and `DepositData`
/// records: bytes from the deposit contract may be any 48 bytes at all, and only become a
/// `PublicKey` once decompression succeeds.
#[derive(Clone, Copy)]
pub struct PublicKeyBytes {
    bytes: [u8; PUBLIC_KEY_BYTES_LEN],
}

impl PublicKeyBytes {
    /// Instantiates `Self` with all-zero bytes.
    pub fn empty() -> Self {
        Self {
            bytes: [0; PUBLIC_KEY_BYTES_LEN],
        }
    }

    /// Attempt to decompress (and validate) the bytes into a usable public key.
    pub fn decompress(&self) -> Result<PublicKey, Error> {
        PublicKey::deserialize(&self.bytes)
    }

    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.bytes
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PUBLIC_KEY_BYTES_LEN {
            Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: PUBLIC_KEY_BYTES_LEN,
            })
        } else {
            let mut pk_bytes = [0; PUBLIC_KEY_BYTES_LEN];
            pk_bytes.copy_from_slice(bytes);
            Ok(Self { bytes: pk_bytes })
        }
    }
}

impl From<&PublicKey> for PublicKeyBytes {
    fn from(pk: &PublicKey) -> Self {
        Self {
            bytes: pk.serialize(),
        }
    }
}

impl From<PublicKey> for PublicKeyBytes {
    fn from(pk: PublicKey) -> Self {
        Self::from(&pk)
    }
}

impl Default for PublicKeyBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl_ssz!(PublicKeyBytes, PUBLIC_KEY_BYTES_LEN);
impl_tree_hash!(PublicKeyBytes, PUBLIC_KEY_BYTES_LEN);
impl_serde_hex!(PublicKeyBytes);

impl PartialEq for PublicKeyBytes {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..] == other.bytes[..]
    }
}

impl Eq for PublicKeyBytes {}

impl Hash for PublicKeyBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state)
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(&self.bytes[..]))
    }
}
