use crate::{bool_from_blst, Error, PublicKey, DST};
use ethereum_types::H256 as Hash256;
use std::fmt;

/// The byte-size of a compressed BLS signature.
pub const SIGNATURE_BYTES_LEN: usize = 96;

/// The compressed encoding of the point at infinity, used as the placeholder signature in
/// containers that have not yet been signed.
pub const INFINITY_SIGNATURE: [u8; SIGNATURE_BYTES_LEN] = {
    let mut bytes = [0; SIGNATURE_BYTES_LEN];
    bytes[0] = 0xc0;
    bytes
};

/// A BLS signature: either a valid curve point or the "empty" infinity placeholder.
#[derive(Clone)]
pub struct Signature {
    point: Option<blst::min_pk::Signature>,
}

impl Signature {
    /// Instantiate the empty (infinity) signature.
    pub fn empty() -> Self {
        Self { point: None }
    }

    pub(crate) fn from_point(point: blst::min_pk::Signature) -> Self {
        Self { point: Some(point) }
    }

    /// Returns `true` if `self` is the empty (infinity) signature.
    pub fn is_empty(&self) -> bool {
        self.point.is_none()
    }

    /// Verify `self` against the given public key and message.
    ///
    /// The empty signature never verifies.
    pub fn verify(&self, pubkey: &PublicKey, msg: Hash256) -> bool {
        match &self.point {
            Some(point) => bool_from_blst(point.verify(
                true,
                msg.as_bytes(),
                DST,
                &[],
                pubkey.point(),
                true,
            )),
            None => false,
        }
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        match &self.point {
            Some(point) => point.to_bytes(),
            None => INFINITY_SIGNATURE,
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            })
        } else if bytes[..] == INFINITY_SIGNATURE[..] {
            Ok(Self::empty())
        } else {
            let point = blst::min_pk::Signature::from_bytes(bytes)?;
            Ok(Self { point: Some(point) })
        }
    }

    pub(crate) fn point(&self) -> Option<&blst::min_pk::Signature> {
        self.point.as_ref()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::empty()
    }
}

impl_ssz!(Signature, SIGNATURE_BYTES_LEN);
impl_tree_hash!(Signature, SIGNATURE_BYTES_LEN);
impl_serde_hex!(Signature);

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize()[..] == other.serialize()[..]
    }
}

impl Eq for Signature {}

impl std::hash::Hash for Signature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(&self.serialize()[..]))
    }
}
