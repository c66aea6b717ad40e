use serde::{Deserializer, Serializer};
use std::marker::PhantomData;

/// Serde support for deserializing integers that may or may not be quoted.
struct QuotedIntVisitor<T> {
    _phantom: PhantomData<T>,
}

impl<'a, T> serde::de::Visitor<'a> for QuotedIntVisitor<T>
where
    T: From<u64> + Into<u64> + Copy,
{
    type Value = T;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "a quoted or unquoted integer")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        s.parse::<u64>()
            .map(T::from)
            .map_err(serde::de::Error::custom)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(T::from(v))
    }
}

/// Formats a `u64`-like value as a decimal string, accepting either a quoted or bare integer when
/// deserializing.
///
/// Usage: `#[serde(with = "serde_utils::quoted_u64")]`.
pub mod quoted_u64 {
    use super::*;

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: From<u64> + Into<u64> + Copy,
    {
        let v: u64 = (*value).into();
        serializer.serialize_str(&format!("{}", v))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<u64> + Into<u64> + Copy,
    {
        deserializer.deserialize_any(QuotedIntVisitor {
            _phantom: PhantomData,
        })
    }
}

#[cfg(test)]
mod test {
    use serde_derive::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    struct WrappedU64(#[serde(with = "super::quoted_u64")] u64);

    #[test]
    fn quoted_or_bare() {
        assert_eq!(serde_json::from_str::<WrappedU64>("\"8\"").unwrap().0, 8);
        assert_eq!(serde_json::from_str::<WrappedU64>("8").unwrap().0, 8);
        assert_eq!(
            serde_json::to_string(&WrappedU64(42)).unwrap(),
            "\"42\"".to_string()
        );
    }
}
