use crate::{bool_from_blst, Error, PublicKey, Signature, DST, SIGNATURE_BYTES_LEN};
use ethereum_types::H256 as Hash256;
use std::fmt;

/// An aggregate of BLS signatures over a single message, or the empty (infinity) aggregate.
#[derive(Clone)]
pub struct AggregateSignature {
    point: Option<blst::min_pk::Signature>,
}

impl AggregateSignature {
    /// Instantiate the empty aggregate: no signatures have been added yet.
    pub fn empty() -> Self {
        Self { point: None }
    }

    /// Returns `true` if no signatures have been aggregated into `self`.
    pub fn is_empty(&self) -> bool {
        self.point.is_none()
    }

    /// Aggregates a signature into `self`.
    ///
    /// The empty signature is ignored; aggregating it is a no-op.
    pub fn add_assign(&mut self, other: &Signature) {
        let other_point = match other.point() {
            Some(point) => point,
            None => return,
        };

        match &self.point {
            Some(self_point) => {
                let mut agg = blst::min_pk::AggregateSignature::from_signature(self_point);
                let other_agg = blst::min_pk::AggregateSignature::from_signature(other_point);
                agg.add_aggregate(&other_agg);
                self.point = Some(agg.to_signature());
            }
            None => {
                self.point = Some(*other_point);
            }
        }
    }

    /// Verify that `self` is the signature over `msg` of every one of `pubkeys`.
    ///
    /// The empty aggregate never verifies.
    pub fn fast_aggregate_verify(&self, msg: Hash256, pubkeys: &[&PublicKey]) -> bool {
        if pubkeys.is_empty() {
            return false;
        }

        match &self.point {
            Some(point) => {
                let pubkey_points = pubkeys.iter().map(|pk| pk.point()).collect::<Vec<_>>();
                bool_from_blst(point.fast_aggregate_verify(
                    true,
                    msg.as_bytes(),
                    DST,
                    &pubkey_points,
                ))
            }
            None => false,
        }
    }

    /// Verify that `self` is an aggregate of one signature per `(pubkey, msg)` pair.
    pub fn aggregate_verify(&self, msgs: &[Hash256], pubkeys: &[&PublicKey]) -> bool {
        if msgs.is_empty() || msgs.len() != pubkeys.len() {
            return false;
        }

        match &self.point {
            Some(point) => {
                let msg_bytes = msgs.iter().map(|msg| msg.as_bytes()).collect::<Vec<_>>();
                let pubkey_points = pubkeys.iter().map(|pk| pk.point()).collect::<Vec<_>>();
                bool_from_blst(point.aggregate_verify(
                    true,
                    &msg_bytes,
                    DST,
                    &pubkey_points,
                    true,
                ))
            }
            None => false,
        }
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        match &self.point {
            Some(point) => point.to_bytes(),
            None => crate::INFINITY_SIGNATURE,
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            })
        } else if bytes[..] == crate::INFINITY_SIGNATURE[..] {
            Ok(Self::empty())
        } else {
            let point = blst::min_pk::Signature::from_bytes(bytes)?;
            Ok(Self { point: Some(point) })
        }
    }
}

impl Default for AggregateSignature {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&Signature> for AggregateSignature {
    fn from(sig: &Signature) -> Self {
        let mut agg = Self::empty();
        agg.add_assign(sig);
        agg
    }
}

impl_ssz!(AggregateSignature, SIGNATURE_BYTES_LEN);
impl_tree_hash!(AggregateSignature, SIGNATURE_BYTES_LEN);
impl_serde_hex!(AggregateSignature);

impl PartialEq for AggregateSignature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize()[..] == other.serialize()[..]
    }
}

impl Eq for AggregateSignature {}

impl std::hash::Hash for AggregateSignature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl fmt::Debug for AggregateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(&self.serialize()[..]))
    }
}
