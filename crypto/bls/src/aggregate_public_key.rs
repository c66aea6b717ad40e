use crate::{Error, PublicKey};

/// An aggregate of BLS public keys.
#[derive(Clone)]
pub struct AggregatePublicKey {
    point: blst::min_pk::AggregatePublicKey,
}

impl AggregatePublicKey {
    /// Aggregate the given public keys.
    ///
    /// Returns an error if `pubkeys` is empty.
    pub fn aggregate(pubkeys: &[&PublicKey]) -> Result<Self, Error> {
        let points = pubkeys.iter().map(|pk| pk.point()).collect::<Vec<_>>();

        // Points already went through subgroup checks at deserialization.
        let point = blst::min_pk::AggregatePublicKey::aggregate(&points, false)?;

        Ok(Self { point })
    }

    /// Convert back into an ordinary public key, e.g. for verification.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey::from_point(self.point.to_public_key())
    }
}
