//! Formats `Vec<u8>` as a 0x-prefixed, lowercase hex string.
//!
//! E.g., `vec![0, 1, 2, 3]` serializes as `"0x00010203"`.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

/// Encode `data` as a 0x-prefixed hex string.
pub fn encode<T: AsRef<[u8]>>(data: T) -> String {
    let hex = hex::encode(data);
    let mut s = "0x".to_string();
    s.push_str(hex.as_str());
    s
}

/// Decode `string` as a 0x-prefixed hex string.
pub fn decode(string: &str) -> Result<Vec<u8>, String> {
    if let Some(stripped) = string.strip_prefix("0x") {
        hex::decode(stripped).map_err(|e| format!("invalid hex: {:?}", e))
    } else {
        Err("hex must have 0x prefix".to_string())
    }
}

pub fn serialize<S, T>(data: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&encode(data))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(PrefixedHexVisitor)
}

pub struct PrefixedHexVisitor;

impl<'de> Visitor<'de> for PrefixedHexVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a hex string with 0x prefix")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        decode(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encoding() {
        let bytes = vec![0, 255];
        let hex = encode(&bytes);
        assert_eq!(hex.as_str(), "0x00ff");

        let bytes = vec![];
        let hex = encode(&bytes);
        assert_eq!(hex.as_str(), "0x");

        let bytes = vec![1, 2, 3];
        let hex = encode(&bytes);
        assert_eq!(hex.as_str(), "0x010203");
    }

    #[test]
    fn decoding() {
        assert_eq!(decode("0x00ff").unwrap(), vec![0, 255]);
        assert_eq!(decode("0x").unwrap(), Vec::<u8>::new());
        assert!(decode("0xgg").is_err());
        assert!(decode("00ff").is_err());
    }
}
