use super::*;
use smallvec::SmallVec;

pub mod impls;

/// Returned when SSZ decoding fails.
#[derive(Debug, PartialEq, Clone)]
pub enum DecodeError {
    /// The bytes supplied were not the exact length the type requires.
    InvalidByteLength { len: usize, expected: usize },
    /// There were too few bytes left to read a length offset.
    InvalidLengthPrefix { len: usize, expected: usize },
    /// A byte index referred to outside the supplied bytes.
    OutOfBoundsByte { i: usize },
    /// A heap offset disagreed with the layout it claims to describe. See `OffsetViolation` for
    /// the specific rule that was broken.
    BadOffset {
        offset: usize,
        violation: OffsetViolation,
    },
    /// A variable-length list's fixed region is not a whole number of offsets.
    InvalidListFixedBytesLen(usize),
    /// Some item has a `ssz_fixed_len` of zero. This is illegal.
    ZeroLengthItem,
    /// The given bytes were invalid for some application-level reason.
    BytesInvalid(String),
    /// The given union selector is out of bounds.
    UnionSelectorInvalid(u8),
}

/// The rules a composite's heap offsets must satisfy, named by the way a malicious encoding
/// would break them.
///
/// Decoding enforces all four, so for any value there is exactly one byte string that decodes
/// to it.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum OffsetViolation {
    /// The offset points into the fixed region, making those bytes decode both as fixed content
    /// and as heap content.
    IntoFixedRegion,
    /// The first offset does not land exactly at the end of the fixed region, leaving bytes
    /// that no field accounts for.
    SkipsHeapBytes,
    /// The offset runs past the end of the buffer.
    OutOfBounds,
    /// The offset points before its predecessor, describing a negative-length item.
    Decreasing,
}

impl OffsetViolation {
    pub(crate) fn at(self, offset: usize) -> DecodeError {
        DecodeError::BadOffset {
            offset,
            violation: self,
        }
    }
}

/// Provides SSZ decoding (de-serialization) via the `from_ssz_bytes(&bytes)` method.
///
/// See the crate root for implementations using `#[derive(Decode)]`.
pub trait Decode: Sized {
    /// Returns `true` if this object has a fixed-length.
    ///
    /// I.e., there are no variable length items in this object or any of it's contained objects.
    fn is_ssz_fixed_len() -> bool;

    /// The number of bytes this object occupies in the fixed-length portion of the SSZ bytes.
    ///
    /// By default, this is set to `BYTES_PER_LENGTH_OFFSET` which is suitable for variable length
    /// objects, but not fixed-length objects. Fixed-length objects _must_ return a value which
    /// represents their length.
    fn ssz_fixed_len() -> usize {
        BYTES_PER_LENGTH_OFFSET
    }

    /// Attempts to decode `Self` from `bytes`, returning a `DecodeError` on failure.
    ///
    /// The supplied bytes must be the exact length required to decode `Self`, excess bytes will
    /// result in an error.
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Where one registered field's bytes live within a composite's encoding.
#[derive(Debug, Clone, Copy)]
enum Field {
    /// `len` bytes of the fixed region, starting at `start`.
    Fixed { start: usize, len: usize },
    /// The `i`'th variable-length item; its payload is delimited by the offsets.
    Variable { i: usize },
}

/// Splits the encoding of an SSZ composite into one slice per registered field, enforcing the
/// offset rules as the fixed region is walked.
///
/// Building converts into a [`SszDecoder`](struct.SszDecoder.html) which decodes each slice into
/// an object instance; see there for a usage example.
pub struct SszDecoderBuilder<'a> {
    bytes: &'a [u8],
    fields: SmallVec<[Field; 8]>,
    /// The heap offsets read so far. Checked to be monotonic and in-bounds on insertion.
    offsets: SmallVec<[usize; 4]>,
    /// The number of fixed-region bytes consumed by the fields registered so far.
    fixed_len: usize,
}

impl<'a> SszDecoderBuilder<'a> {
    /// Instantiate a new builder over `bytes`, assumed to be the SSZ encoding of some composite.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            fields: SmallVec::new(),
            offsets: SmallVec::new(),
            fixed_len: 0,
        }
    }

    /// Declares that some type `T` is the next field in `bytes`.
    pub fn register_type<T: Decode>(&mut self) -> Result<(), DecodeError> {
        if T::is_ssz_fixed_len() {
            let start = self.fixed_len;
            self.fixed_len = self
                .fixed_len
                .checked_add(T::ssz_fixed_len())
                .ok_or(DecodeError::OutOfBoundsByte {
                    i: usize::max_value(),
                })?;

            if self.bytes.len() < self.fixed_len {
                return Err(DecodeError::InvalidByteLength {
                    len: self.bytes.len(),
                    expected: self.fixed_len,
                });
            }

            self.fields.push(Field::Fixed {
                start,
                len: T::ssz_fixed_len(),
            });
        } else {
            let offset = read_offset(self.bytes.get(self.fixed_len..).unwrap_or(&[]))?;

            // Each offset must stay inside the buffer and never step backwards over its
            // predecessor.
            if offset > self.bytes.len() {
                return Err(OffsetViolation::OutOfBounds.at(offset));
            }
            if let Some(previous) = self.offsets.last() {
                if offset < *previous {
                    return Err(OffsetViolation::Decreasing.at(offset));
                }
            }

            self.fields.push(Field::Variable {
                i: self.offsets.len(),
            });
            self.offsets.push(offset);
            self.fixed_len += BYTES_PER_LENGTH_OFFSET;
        }

        Ok(())
    }

    /// Finalizes the builder, returning a `SszDecoder` that may be used to instantiate objects.
    pub fn build(self) -> Result<SszDecoder<'a>, DecodeError> {
        if let Some(first_offset) = self.offsets.first().copied() {
            // The first offset must land exactly at the end of the fixed region: in front of it
            // would decode fixed bytes a second time, beyond it would leave unreachable bytes
            // between the regions.
            if first_offset < self.fixed_len {
                return Err(OffsetViolation::IntoFixedRegion.at(first_offset));
            }
            if first_offset > self.fixed_len {
                return Err(OffsetViolation::SkipsHeapBytes.at(first_offset));
            }
        } else if self.fixed_len != self.bytes.len() {
            // A composite of only fixed fields must consume its bytes exactly.
            return Err(DecodeError::InvalidByteLength {
                len: self.bytes.len(),
                expected: self.fixed_len,
            });
        }

        Ok(SszDecoder {
            bytes: self.bytes,
            fields: self.fields,
            offsets: self.offsets,
            next: 0,
        })
    }
}

/// Decodes the fields registered with a [`SszDecoderBuilder`](struct.SszDecoderBuilder.html)
/// into object instances, resolving each field's slice on demand.
///
/// ## Example
///
/// ```rust
/// use ssz_derive::{Encode, Decode};
/// use ssz::{Decode, Encode, SszDecoder, SszDecoderBuilder};
///
/// #[derive(PartialEq, Debug, Encode, Decode)]
/// struct Foo {
///     a: u64,
///     b: Vec<u16>,
/// }
///
/// fn ssz_decoding_example() {
///     let foo = Foo {
///         a: 42,
///         b: vec![1, 3, 3, 7]
///     };
///
///     let bytes = foo.as_ssz_bytes();
///
///     let mut builder = SszDecoderBuilder::new(&bytes);
///
///     builder.register_type::<u64>().unwrap();
///     builder.register_type::<Vec<u16>>().unwrap();
///
///     let mut decoder = builder.build().unwrap();
///
///     let decoded_foo = Foo {
///         a: decoder.decode_next().unwrap(),
///         b: decoder.decode_next().unwrap(),
///     };
///
///     assert_eq!(foo, decoded_foo);
/// }
///
/// ```
pub struct SszDecoder<'a> {
    bytes: &'a [u8],
    fields: SmallVec<[Field; 8]>,
    offsets: SmallVec<[usize; 4]>,
    next: usize,
}

impl<'a> SszDecoder<'a> {
    /// Decodes the next field.
    ///
    /// # Panics
    ///
    /// Panics when called more times than fields were registered.
    pub fn decode_next<T: Decode>(&mut self) -> Result<T, DecodeError> {
        let field = self.fields[self.next];
        self.next += 1;

        // Bounds and monotonicity were enforced at registration, so plain slicing holds.
        let slice = match field {
            Field::Fixed { start, len } => &self.bytes[start..start + len],
            Field::Variable { i } => {
                let start = self.offsets[i];
                let end = self
                    .offsets
                    .get(i + 1)
                    .copied()
                    .unwrap_or_else(|| self.bytes.len());
                &self.bytes[start..end]
            }
        };

        T::from_ssz_bytes(slice)
    }
}

/// Takes `bytes`, assuming it is the encoding for a SSZ union, and returns the union-selector and
/// the body (trailing bytes).
///
/// ## Errors
///
/// Returns an error if `bytes` is empty or the selector is not a valid value (i.e., larger than
/// the maximum number of variants).
pub fn split_union_bytes(bytes: &[u8]) -> Result<(UnionSelector, &[u8]), DecodeError> {
    match bytes.split_first() {
        Some((selector, body)) => Ok((UnionSelector::new(*selector)?, body)),
        None => Err(DecodeError::OutOfBoundsByte { i: 0 }),
    }
}

/// Reads a `BYTES_PER_LENGTH_OFFSET`-byte little-endian length from the front of `bytes`.
pub fn read_offset(bytes: &[u8]) -> Result<usize, DecodeError> {
    let prefix = bytes
        .get(0..BYTES_PER_LENGTH_OFFSET)
        .ok_or(DecodeError::InvalidLengthPrefix {
            len: bytes.len(),
            expected: BYTES_PER_LENGTH_OFFSET,
        })?;

    let mut array = [0; BYTES_PER_LENGTH_OFFSET];
    array.copy_from_slice(prefix);

    Ok(u32::from_le_bytes(array) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_offset_is_little_endian() {
        assert_eq!(read_offset(&[4, 0, 0, 0]), Ok(4));
        assert_eq!(read_offset(&[0, 1, 0, 0]), Ok(256));
        assert_eq!(read_offset(&[1, 0, 0, 0, 99]), Ok(1));

        assert_eq!(
            read_offset(&[0, 0, 0]),
            Err(DecodeError::InvalidLengthPrefix {
                len: 3,
                expected: BYTES_PER_LENGTH_OFFSET,
            })
        );
    }

    #[test]
    fn fixed_only_composite_must_consume_exactly() {
        let bytes = [0_u8; 10];

        let mut builder = SszDecoderBuilder::new(&bytes);
        builder.register_type::<u64>().unwrap();

        assert_eq!(
            builder.build().err(),
            Some(DecodeError::InvalidByteLength {
                len: 10,
                expected: 8,
            })
        );
    }

    #[test]
    fn truncated_fixed_field_is_caught_at_registration() {
        let bytes = [0_u8; 6];

        let mut builder = SszDecoderBuilder::new(&bytes);
        assert_eq!(
            builder.register_type::<u64>().err(),
            Some(DecodeError::InvalidByteLength {
                len: 6,
                expected: 8,
            })
        );
    }

    #[test]
    fn offset_rules_are_enforced() {
        // A single variable field whose offset (8) overshoots the fixed region (4).
        let bytes = [8, 0, 0, 0, 0, 0, 0, 0];
        let mut builder = SszDecoderBuilder::new(&bytes);
        builder.register_type::<Vec<u8>>().unwrap();
        assert_eq!(
            builder.build().err(),
            Some(OffsetViolation::SkipsHeapBytes.at(8))
        );

        // An offset beyond the end of the buffer.
        let bytes = [9, 0, 0, 0];
        let mut builder = SszDecoderBuilder::new(&bytes);
        assert_eq!(
            builder.register_type::<Vec<u8>>().err(),
            Some(OffsetViolation::OutOfBounds.at(9))
        );

        // A second offset stepping backwards over the first.
        let bytes = [9, 0, 0, 0, 8, 0, 0, 0, 255, 255];
        let mut builder = SszDecoderBuilder::new(&bytes);
        builder.register_type::<Vec<u8>>().unwrap();
        assert_eq!(
            builder.register_type::<Vec<u8>>().err(),
            Some(OffsetViolation::Decreasing.at(8))
        );
    }

    #[test]
    fn split_union_bytes_rejects_bad_selectors() {
        assert!(split_union_bytes(&[0, 1, 2]).is_ok());
        assert_eq!(
            split_union_bytes(&[]).err(),
            Some(DecodeError::OutOfBoundsByte { i: 0 })
        );
        assert_eq!(
            split_union_bytes(&[128]).err(),
            Some(DecodeError::UnionSelectorInvalid(128))
        );
    }
}
