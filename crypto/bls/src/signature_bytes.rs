use crate::{Error, Signature, SIGNATURE_BYTES_LEN};
use std::fmt;

/// The compressed bytes of a BLS signature, without any validity guarantee.
///
/// Deposit data from the eth1 chain may carry arbitrary bytes where a signature belongs, so the
/// deposit pipeline stores this form and only attempts decompression when it must verify.
#[derive(Clone, Copy)]
pub struct SignatureBytes {
    bytes: [u8; SIGNATURE_BYTES_LEN],
}

impl SignatureBytes {
    /// Instantiates `Self` with the infinity encoding.
    pub fn empty() -> Self {
        Self {
            bytes: crate::INFINITY_SIGNATURE,
        }
    }

    /// Attempt to decompress the bytes into a usable signature.
    pub fn decompress(&self) -> Result<Signature, Error> {
        Signature::deserialize(&self.bytes)
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        self.bytes
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            })
        } else {
            let mut sig_bytes = [0; SIGNATURE_BYTES_LEN];
            sig_bytes.copy_from_slice(bytes);
            Ok(Self { bytes: sig_bytes })
        }
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(sig: &Signature) -> Self {
        Self {
            bytes: sig.serialize(),
        }
    }
}

impl From<Signature> for SignatureBytes {
    fn from(sig: Signature) -> Self {
        Self::from(&sig)
    }
}

impl Default for SignatureBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl_ssz!(SignatureBytes, SIGNATURE_BYTES_LEN);
impl_tree_hash!(SignatureBytes, SIGNATURE_BYTES_LEN);
impl_serde_hex!(SignatureBytes);

impl PartialEq for SignatureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..] == other.bytes[..]
    }
}

impl Eq for SignatureBytes {}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(&self.bytes[..]))
    }
}
