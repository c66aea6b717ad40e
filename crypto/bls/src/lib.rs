//! BLS12-381 point wrappers used for beacon chain signing and verification, backed by the
//! `blst` library (min-pk scheme: 48-byte public keys, 96-byte signatures).
//!
//! Points are wrapped so that:
//!
//! - The "empty" (infinity) signature used as a placeholder in unsigned containers is
//!   representable and serializes to the canonical infinity encoding.
//! - Compressed byte forms (`PublicKeyBytes`, `SignatureBytes`) can be carried in state and
//!   deposit containers without eagerly paying for decompression or validity checks.

#[macro_use]
mod macros;

mod aggregate_public_key;
mod aggregate_signature;
mod keypair;
mod public_key;
mod public_key_bytes;
mod secret_key;
mod signature;
mod signature_bytes;

pub use aggregate_public_key::AggregatePublicKey;
pub use aggregate_signature::AggregateSignature;
pub use keypair::Keypair;
pub use public_key::{PublicKey, PUBLIC_KEY_BYTES_LEN};
pub use public_key_bytes::PublicKeyBytes;
pub use secret_key::{SecretKey, SECRET_KEY_BYTES_LEN};
pub use signature::{Signature, INFINITY_SIGNATURE, SIGNATURE_BYTES_LEN};
pub use signature_bytes::SignatureBytes;

use blst::BLST_ERROR;

/// The domain separation tag for hash-to-curve, fixed by the IETF BLS signature suite the
/// beacon chain uses.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// An error was raised from the blst library.
    BlstError(BlstError),
    /// The provided bytes were an incorrect length.
    InvalidByteLength { got: usize, expected: usize },
    /// The point is the infinity point where it is not permitted.
    InvalidInfinityPublicKey,
}

/// Wrapper for `BLST_ERROR` so we can implement traits on it.
#[derive(Debug, PartialEq, Clone)]
pub struct BlstError(pub BLST_ERROR);

impl From<BLST_ERROR> for Error {
    fn from(e: BLST_ERROR) -> Error {
        Error::BlstError(BlstError(e))
    }
}

pub(crate) fn bool_from_blst(e: BLST_ERROR) -> bool {
    e == BLST_ERROR::BLST_SUCCESS
}
