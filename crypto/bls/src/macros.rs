/// Contains the functions required for a `ssz::Encode` and `ssz::Decode` implementation.
///
/// Does not include the `Encode` and `Decode` impls themselves so the byte length can be checked
/// against the type's `deserialize` function.
macro_rules! impl_ssz {
    ($type: ident, $byte_size: expr) => {
        impl ssz::Encode for $type {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $byte_size
            }

            fn ssz_bytes_len(&self) -> usize {
                $byte_size
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.serialize())
            }
        }

        impl ssz::Decode for $type {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $byte_size
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
                $type::deserialize(bytes)
                    .map_err(|e| ssz::DecodeError::BytesInvalid(format!("{:?}", e)))
            }
        }
    };
}

/// Contains the functions required for a `TreeHash` implementation.
macro_rules! impl_tree_hash {
    ($type: ident, $byte_size: expr) => {
        impl tree_hash::TreeHash for $type {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> Vec<u8> {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                tree_hash::merkle_root(&self.serialize(), 0)
            }
        }
    };
}

/// Contains the functions required for a `serde` hex string implementation.
macro_rules! impl_serde_hex {
    ($type: ident) => {
        impl serde::Serialize for $type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&serde_utils::hex::encode(&self.serialize()[..]))
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bytes = deserializer.deserialize_str(serde_utils::hex::PrefixedHexVisitor)?;
                Self::deserialize(&bytes).map_err(|e| {
                    serde::de::Error::custom(format!("invalid point: {:?}", e))
                })
            }
        }
    };
}
