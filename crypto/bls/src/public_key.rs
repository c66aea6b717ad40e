use crate::Error;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The byte-size of a compressed BLS public key.
pub const PUBLIC_KEY_BYTES_LEN: usize = 48;

/// A BLS public key that has been checked to be a valid, non-infinity curve point.
#[derive(Clone)]
pub struct PublicKey {
    point: blst::min_pk::PublicKey,
}

impl PublicKey {
    pub(crate) fn from_point(point: blst::min_pk::PublicKey) -> Self {
        Self { point }
    }

    pub(crate) fn point(&self) -> &blst::min_pk::PublicKey {
        &self.point
    }

    /// Serialize to compressed form.
    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.point.to_bytes()
    }

    /// Deserialize from compressed form, checking that the point is on the curve and in the
    /// correct subgroup.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PUBLIC_KEY_BYTES_LEN {
            return Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: PUBLIC_KEY_BYTES_LEN,
            });
        }

        // The infinity public key is invalid for signing; reject it outright.
        if bytes[0] == 0xc0 && bytes[1..].iter().all(|b| *b == 0) {
            return Err(Error::InvalidInfinityPublicKey);
        }

        let point = blst::min_pk::PublicKey::key_validate(bytes)?;
        Ok(Self { point })
    }
}

impl_ssz!(PublicKey, PUBLIC_KEY_BYTES_LEN);
impl_tree_hash!(PublicKey, PUBLIC_KEY_BYTES_LEN);
impl_serde_hex!(PublicKey);

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.serialize()[..] == other.serialize()[..]
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(&self.serialize()[..]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(&self.serialize()[..]))
    }
}
