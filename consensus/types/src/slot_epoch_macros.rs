/// Implements the common conversion, arithmetic, formatting and codec traits for `Slot` and
/// `Epoch`.
///
/// All infix arithmetic is saturating; transition code that must observe overflow uses the
/// `SafeArith` impl instead.
macro_rules! impl_common {
    ($type: ident) => {
        impl From<u64> for $type {
            fn from(x: u64) -> $type {
                $type(x)
            }
        }

        impl From<usize> for $type {
            fn from(x: usize) -> $type {
                $type(x as u64)
            }
        }

        impl From<$type> for u64 {
            fn from(x: $type) -> u64 {
                x.0
            }
        }

        impl From<$type> for usize {
            fn from(x: $type) -> usize {
                x.0 as usize
            }
        }

        impl $type {
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            pub const fn as_usize(&self) -> usize {
                self.0 as usize
            }
        }

        impl std::ops::Add<$type> for $type {
            type Output = $type;

            fn add(self, other: $type) -> $type {
                $type(self.0.saturating_add(other.0))
            }
        }

        impl std::ops::Add<u64> for $type {
            type Output = $type;

            fn add(self, other: u64) -> $type {
                $type(self.0.saturating_add(other))
            }
        }

        impl std::ops::AddAssign<$type> for $type {
            fn add_assign(&mut self, other: $type) {
                self.0 = self.0.saturating_add(other.0);
            }
        }

        impl std::ops::AddAssign<u64> for $type {
            fn add_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_add(other);
            }
        }

        impl std::ops::Sub<$type> for $type {
            type Output = $type;

            fn sub(self, other: $type) -> $type {
                $type(self.0.saturating_sub(other.0))
            }
        }

        impl std::ops::Sub<u64> for $type {
            type Output = $type;

            fn sub(self, other: u64) -> $type {
                $type(self.0.saturating_sub(other))
            }
        }

        impl std::ops::SubAssign<$type> for $type {
            fn sub_assign(&mut self, other: $type) {
                self.0 = self.0.saturating_sub(other.0);
            }
        }

        impl std::ops::SubAssign<u64> for $type {
            fn sub_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_sub(other);
            }
        }

        impl std::ops::Mul<u64> for $type {
            type Output = $type;

            fn mul(self, rhs: u64) -> $type {
                $type(self.0.saturating_mul(rhs))
            }
        }

        impl std::ops::Div<$type> for $type {
            type Output = $type;

            fn div(self, rhs: $type) -> $type {
                debug_assert!(rhs.0 > 0, "division by zero");
                $type(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<u64> for $type {
            type Output = $type;

            fn div(self, rhs: u64) -> $type {
                debug_assert!(rhs > 0, "division by zero");
                $type(self.0 / rhs)
            }
        }

        impl std::ops::Rem<$type> for $type {
            type Output = $type;

            fn rem(self, modulus: $type) -> $type {
                debug_assert!(modulus.0 > 0, "remainder by zero");
                $type(self.0 % modulus.0)
            }
        }

        impl std::ops::Rem<u64> for $type {
            type Output = $type;

            fn rem(self, modulus: u64) -> $type {
                debug_assert!(modulus > 0, "remainder by zero");
                $type(self.0 % modulus)
            }
        }

        impl PartialEq<u64> for $type {
            fn eq(&self, other: &u64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<u64> for $type {
            fn partial_cmp(&self, other: &u64) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($type), self.0)
            }
        }

        impl safe_arith::SafeArith for $type {
            fn safe_add(&self, other: Self) -> safe_arith::Result<Self> {
                self.0.safe_add(other.0).map($type)
            }

            fn safe_sub(&self, other: Self) -> safe_arith::Result<Self> {
                self.0.safe_sub(other.0).map($type)
            }

            fn safe_mul(&self, other: Self) -> safe_arith::Result<Self> {
                self.0.safe_mul(other.0).map($type)
            }

            fn safe_div(&self, other: Self) -> safe_arith::Result<Self> {
                self.0.safe_div(other.0).map($type)
            }

            fn safe_rem(&self, other: Self) -> safe_arith::Result<Self> {
                self.0.safe_rem(other.0).map($type)
            }

            fn safe_shl(&self, other: u32) -> safe_arith::Result<Self> {
                self.0.safe_shl(other).map($type)
            }

            fn safe_shr(&self, other: u32) -> safe_arith::Result<Self> {
                self.0.safe_shr(other).map($type)
            }
        }

        impl safe_arith::SafeArith<u64> for $type {
            fn safe_add(&self, other: u64) -> safe_arith::Result<Self> {
                self.0.safe_add(other).map($type)
            }

            fn safe_sub(&self, other: u64) -> safe_arith::Result<Self> {
                self.0.safe_sub(other).map($type)
            }

            fn safe_mul(&self, other: u64) -> safe_arith::Result<Self> {
                self.0.safe_mul(other).map($type)
            }

            fn safe_div(&self, other: u64) -> safe_arith::Result<Self> {
                self.0.safe_div(other).map($type)
            }

            fn safe_rem(&self, other: u64) -> safe_arith::Result<Self> {
                self.0.safe_rem(other).map($type)
            }

            fn safe_shl(&self, other: u32) -> safe_arith::Result<Self> {
                self.0.safe_shl(other).map($type)
            }

            fn safe_shr(&self, other: u32) -> safe_arith::Result<Self> {
                self.0.safe_shr(other).map($type)
            }
        }

        impl ssz::Encode for $type {
            fn is_ssz_fixed_len() -> bool {
                <u64 as ssz::Encode>::is_ssz_fixed_len()
            }

            fn ssz_fixed_len() -> usize {
                <u64 as ssz::Encode>::ssz_fixed_len()
            }

            fn ssz_bytes_len(&self) -> usize {
                0_u64.ssz_bytes_len()
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                self.0.ssz_append(buf)
            }
        }

        impl ssz::Decode for $type {
            fn is_ssz_fixed_len() -> bool {
                <u64 as ssz::Decode>::is_ssz_fixed_len()
            }

            fn ssz_fixed_len() -> usize {
                <u64 as ssz::Decode>::ssz_fixed_len()
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
                Ok($type(u64::from_ssz_bytes(bytes)?))
            }
        }

        impl tree_hash::TreeHash for $type {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Basic
            }

            fn tree_hash_packed_encoding(&self) -> Vec<u8> {
                self.0.tree_hash_packed_encoding()
            }

            fn tree_hash_packing_factor() -> usize {
                u64::tree_hash_packing_factor()
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                tree_hash::Hash256::from_low_u64_le(self.0)
            }
        }

        impl crate::test_utils::TestRandom for $type {
            fn random_for_test(rng: &mut impl rand::RngCore) -> Self {
                $type::from(u64::random_for_test(rng))
            }
        }
    };
}
